use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::PublishError;

pub const DEFAULT_UPLOAD_URL: &str = "https://minecraft.curseforge.com";
pub const DEFAULT_LOOKUP_URL: &str = "https://addons-ecs.forgesvc.net";

/// Everything one publish run needs to know. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api_key: String,
    /// Numeric CurseForge project id the file is uploaded to.
    pub project: i64,
    /// Path to the artifact that becomes the new file release.
    pub file: PathBuf,
    pub title: String,
    /// Release channel (`release`, `beta`, `alpha`); may also be a path to a file holding it.
    pub release: String,
    /// Changelog text, or a path to a file holding it.
    pub note: String,
    /// Changelog format (`markdown`, `text`, `html`).
    pub changelog_type: String,
    pub games: Vec<i64>,
    /// Raw relations JSON array, or a path to a file holding it.
    pub relations: Option<String>,
    /// Path to a build manifest whose entries are resolved into relations.
    pub manifest: Option<String>,
    /// Raw metadata payload that replaces the generated one entirely.
    pub metadata: Option<String>,
}

impl Settings {
    /// Checks the settings that must hold before anything touches the network.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.api_key.is_empty() {
            error!("No API key provided");
            return Err(PublishError::Config("no apikey provided".into()));
        }

        if self.project == 0 {
            error!("No project id provided");
            return Err(PublishError::Config("no project provided".into()));
        }

        if self.file.as_os_str().is_empty() {
            error!("No artifact file provided");
            return Err(PublishError::Config("no file provided".into()));
        }

        match std::fs::metadata(&self.file) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!(file = %self.file.display(), "Artifact file does not exist");
                return Err(PublishError::Config("file doesn't exist".into()));
            }
            // Opening the artifact later reports the real failure.
            Err(e) => {
                warn!(error = %e, file = %self.file.display(), "Could not stat artifact file");
            }
        }

        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            project = self.project,
            file = %self.file.display(),
            title = %self.title,
            games = self.games.len(),
            has_relations = self.relations.is_some(),
            has_manifest = self.manifest.is_some(),
            has_metadata_override = self.metadata.is_some(),
            "Loaded settings"
        );
        debug!(api_key_set = !self.api_key.is_empty(), "Settings loaded (secrets redacted)");
    }
}

/// Base URLs of the two remote services.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub upload_base: String,
    pub lookup_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            upload_base: DEFAULT_UPLOAD_URL.to_string(),
            lookup_base: DEFAULT_LOOKUP_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn upload_url(&self, project: i64) -> String {
        format!(
            "{}/api/projects/{project}/upload-file",
            self.upload_base.trim_end_matches('/')
        )
    }

    pub fn lookup_url(&self, project: i64) -> String {
        format!(
            "{}/api/v2/addon/{project}",
            self.lookup_base.trim_end_matches('/')
        )
    }
}

/// Base name of the artifact, as sent in the multipart `filename`.
pub fn artifact_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
