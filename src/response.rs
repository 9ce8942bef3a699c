use serde::Deserialize;
use tracing::{error, info};

use crate::error::PublishError;

/// Body returned by the upload endpoint. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "errorCode", default)]
    pub code: i64,
    #[serde(rename = "errorMessage", default)]
    pub message: String,
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_id: i64,
}

/// Maps the upload endpoint's status and body to a receipt or an error.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<UploadReceipt, PublishError> {
    let result: UploadResponse = serde_json::from_slice(body).map_err(|e| {
        let body = String::from_utf8_lossy(body).into_owned();
        error!(status, error = %e, body = %body, "Failed to parse upload response");
        PublishError::MalformedResponse {
            status,
            body,
            source: e,
        }
    })?;

    if status != 200 {
        error!(
            status,
            code = result.code,
            message = %result.message,
            "Upload rejected"
        );
        return Err(PublishError::Rejected {
            status,
            code: result.code,
            message: result.message,
        });
    }

    info!(id = result.id, "Successfully uploaded release");
    Ok(UploadReceipt { file_id: result.id })
}
