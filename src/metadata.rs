//! Assembles the release metadata payload sent alongside the artifact.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::dependency::{resolve_relations, LookupWarning, SlugLookup};
use crate::error::PublishError;
use crate::manifest::Manifest;
use crate::resolve::{read_bytes_or_file, read_string_or_file, FileSystem};
use crate::settings::Settings;

/// Relation types derived from manifest entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    RequiredDependency,
    OptionalDependency,
}

impl RelationKind {
    pub fn from_required(required: bool) -> Self {
        if required {
            RelationKind::RequiredDependency
        } else {
            RelationKind::OptionalDependency
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::RequiredDependency => "requiredDependency",
            RelationKind::OptionalDependency => "optionalDependency",
        }
    }
}

/// One relation to another project. `kind` stays a free string because
/// operator-supplied relations may use any type the service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Project {
    pub fn new(slug: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            slug: slug.into(),
            kind: kind.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relations {
    pub projects: Vec<Project>,
}

/// The release description the upload endpoint expects in its `metadata` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "displayName")]
    pub title: String,
    #[serde(rename = "releaseType")]
    pub release: String,
    #[serde(rename = "changelog")]
    pub note: String,
    #[serde(rename = "changelogType")]
    pub changelog_type: String,
    #[serde(rename = "gameVersions")]
    pub games: Vec<i64>,
    pub relations: Relations,
}

/// Serialized payload plus what happened while building it.
#[derive(Debug, Clone)]
pub struct BuiltMetadata {
    pub payload: Vec<u8>,
    pub warnings: Vec<LookupWarning>,
    /// `None` when a raw metadata override replaced the generated payload.
    pub relation_count: Option<usize>,
}

/// Builds the metadata payload for `settings`.
///
/// A configured metadata override wins outright: it is resolved and returned
/// byte for byte, and neither relations nor the manifest are consulted.
/// Otherwise relations from the raw override come first, followed by the ones
/// resolved from the manifest. Duplicates between the two are kept.
pub async fn build_metadata<F, L>(
    settings: &Settings,
    fs: &F,
    lookup: &L,
) -> Result<BuiltMetadata, PublishError>
where
    F: FileSystem + ?Sized,
    L: SlugLookup + ?Sized,
{
    if let Some(raw) = non_empty(&settings.metadata) {
        let rawdata = read_bytes_or_file(fs, raw).map_err(|e| {
            error!(error = %e, "Failed to read metadata override");
            PublishError::io("read metadata from file", e)
        })?;
        info!(bytes = rawdata.len(), "Using metadata override verbatim");
        return Ok(BuiltMetadata {
            payload: rawdata,
            warnings: Vec::new(),
            relation_count: None,
        });
    }

    let mut relations = Relations::default();
    let mut warnings = Vec::new();

    if let Some(raw) = non_empty(&settings.relations) {
        let rawdata = read_string_or_file(fs, raw)
            .map_err(|e| PublishError::io("read relations from file", e))?;
        relations.projects = serde_json::from_str(&rawdata).map_err(|e| {
            error!(error = %e, "Failed to parse relations");
            PublishError::parse("relations", e)
        })?;
        debug!(count = relations.projects.len(), "Parsed relations override");
    }

    if let Some(raw) = non_empty(&settings.manifest) {
        let rawdata = read_string_or_file(fs, raw)
            .map_err(|e| PublishError::io("read manifest from file", e))?;
        let manifest = Manifest::from_json(&rawdata).map_err(|e| {
            error!(error = %e, "Failed to parse manifest");
            PublishError::parse("manifest", e)
        })?;
        info!(entries = manifest.files.len(), "Resolving manifest dependencies");

        let resolution = resolve_relations(lookup, &manifest.files).await;
        relations.projects.extend(resolution.relations);
        warnings = resolution.warnings;
    }

    let release = read_string_or_file(fs, &settings.release)
        .map_err(|e| PublishError::io("read release from file", e))?;
    let note = read_string_or_file(fs, &settings.note)
        .map_err(|e| PublishError::io("read note from file", e))?;

    let relation_count = relations.projects.len();
    let metadata = Metadata {
        title: settings.title.clone(),
        release,
        note,
        changelog_type: settings.changelog_type.clone(),
        games: settings.games.clone(),
        relations,
    };

    let payload = serde_json::to_vec(&metadata).map_err(PublishError::Encode)?;
    info!(
        relations = relation_count,
        skipped = warnings.len(),
        bytes = payload.len(),
        "Built release metadata"
    );

    Ok(BuiltMetadata {
        payload,
        warnings,
        relation_count: Some(relation_count),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
