//! Resolves manifest entries into release relations.
//!
//! Each manifest entry names a dependency by numeric project id; the hosting
//! service wants slugs. [`resolve_relations`] asks a [`SlugLookup`] for every
//! entry in order, keeps the ones that resolve, and records a
//! [`LookupWarning`] for each one that does not. A failed lookup never aborts
//! the run.

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::LookupError;
use crate::manifest::ManifestFile;
use crate::metadata::{Project, RelationKind};

/// Body returned by the addon lookup endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AddonInfo {
    pub slug: String,
}

/// Maps a numeric project id to its slug.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SlugLookup: Send + Sync {
    async fn lookup_slug(&self, project_id: i64) -> Result<String, LookupError>;
}

/// A manifest entry that was skipped because its lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupWarning {
    pub project_id: i64,
    pub file_id: i64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub relations: Vec<Project>,
    pub warnings: Vec<LookupWarning>,
}

pub async fn resolve_relations<L>(lookup: &L, files: &[ManifestFile]) -> Resolution
where
    L: SlugLookup + ?Sized,
{
    let mut resolution = Resolution::default();

    for file in files {
        match lookup.lookup_slug(file.project_id).await {
            Ok(slug) => {
                let kind = RelationKind::from_required(file.required);
                info!(
                    project = file.project_id,
                    file = file.file_id,
                    slug = %slug,
                    kind = kind.as_str(),
                    "Resolved dependency"
                );
                resolution.relations.push(Project::new(slug, kind));
            }
            Err(e) => {
                warn!(
                    error = %e,
                    project = file.project_id,
                    file = file.file_id,
                    "Skipping dependency, lookup failed"
                );
                resolution.warnings.push(LookupWarning {
                    project_id: file.project_id,
                    file_id: file.file_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    resolution
}
