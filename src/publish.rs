//! Top-level pipeline: validate, then build metadata, then upload, then
//! interpret the response.
//!
//! Every step runs after the previous one has finished. Each step's start and
//! outcome is logged. The first fatal error stops the run and is returned
//! unchanged. Dependency lookup failures are the only exception; they come
//! back as warnings on the report.

use tracing::{error, info, warn};

use crate::dependency::{LookupWarning, SlugLookup};
use crate::error::PublishError;
use crate::metadata::build_metadata;
use crate::resolve::FileSystem;
use crate::response::interpret_response;
use crate::settings::{Endpoints, Settings};
use crate::upload::{prepare_upload, UploadTransport};

#[derive(Debug)]
pub struct PublishReport {
    /// Id of the file created on the hosting service.
    pub file_id: i64,
    /// Relations sent, or `None` when a raw metadata override was used.
    pub relations: Option<usize>,
    pub skipped_dependencies: Vec<LookupWarning>,
}

pub async fn publish<F, L, T>(
    settings: &Settings,
    endpoints: &Endpoints,
    fs: &F,
    lookup: &L,
    transport: &T,
) -> Result<PublishReport, PublishError>
where
    F: FileSystem + ?Sized,
    L: SlugLookup + ?Sized,
    T: UploadTransport + ?Sized,
{
    info!(project = settings.project, "[PUBLISH] Starting release publish");
    settings.validate()?;

    let metadata = build_metadata(settings, fs, lookup).await?;
    for skipped in &metadata.warnings {
        warn!(
            project = skipped.project_id,
            file = skipped.file_id,
            reason = %skipped.reason,
            "[PUBLISH] Dependency omitted from relations"
        );
    }

    let request = prepare_upload(endpoints, settings, &metadata.payload)?;
    let response = transport.send(request).await.map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Upload request failed");
        e
    })?;

    let receipt = interpret_response(response.status, &response.body)?;
    info!(file_id = receipt.file_id, "[PUBLISH] Release published");

    Ok(PublishReport {
        file_id: receipt.file_id,
        relations: metadata.relation_count,
        skipped_dependencies: metadata.warnings,
    })
}
