use serde::{Deserialize, Serialize};

/// A build manifest listing the project's own dependency references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

/// One dependency reference within a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    #[serde(rename = "projectID", default)]
    pub project_id: i64,
    #[serde(rename = "fileID", default)]
    pub file_id: i64,
    #[serde(default)]
    pub required: bool,
}

impl Manifest {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
