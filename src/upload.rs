//! Prepares and sends the upload request.
//!
//! Preparation (reading the artifact and naming the parts) is kept apart from
//! sending, which goes through [`UploadTransport`]. Tests can check the
//! prepared request without touching the network.

use async_trait::async_trait;
use mockall::automock;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{error, info};

use crate::error::PublishError;
use crate::settings::{artifact_name, Endpoints, Settings};

/// Everything the upload endpoint receives. The transport encodes `artifact`
/// as the `file` part and `metadata` as the `metadata` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub url: String,
    pub api_key: String,
    /// Base name of the artifact, sent as the `file` part's filename.
    pub filename: String,
    pub artifact: Vec<u8>,
    pub metadata: Vec<u8>,
}

/// Status code and body as received from the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// POSTs `request` as `multipart/form-data` with the API token header set.
    async fn send(&self, request: UploadRequest) -> Result<RawResponse, PublishError>;
}

/// Reads the artifact and builds the upload request for `settings`.
pub fn prepare_upload(
    endpoints: &Endpoints,
    settings: &Settings,
    metadata: &[u8],
) -> Result<UploadRequest, PublishError> {
    let artifact = read_artifact(&settings.file)?;
    let filename = artifact_name(&settings.file);

    info!(
        file = %filename,
        artifact_bytes = artifact.len(),
        metadata_bytes = metadata.len(),
        "Prepared upload request"
    );

    Ok(UploadRequest {
        url: endpoints.upload_url(settings.project),
        api_key: settings.api_key.clone(),
        filename,
        artifact,
        metadata: metadata.to_vec(),
    })
}

// The handle is dropped before this returns, on success and on failure.
fn read_artifact(path: &Path) -> Result<Vec<u8>, PublishError> {
    let mut file = File::open(path).map_err(|e| {
        error!(error = %e, file = %path.display(), "Failed to open artifact");
        PublishError::io("read and process file", e)
    })?;
    let mut content = Vec::new();
    file.read_to_end(&mut content).map_err(|e| {
        error!(error = %e, file = %path.display(), "Failed to read artifact");
        PublishError::io("copy form file", e)
    })?;
    Ok(content)
}
