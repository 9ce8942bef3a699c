//! HTTP client for both remote services.
//!
//! [`ForgeClient`] implements [`SlugLookup`] against the addon lookup API and
//! [`UploadTransport`] against the upload API. The two share one
//! `reqwest::Client`, so any timeout or TLS settings apply to both.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::dependency::{AddonInfo, SlugLookup};
use crate::error::{LookupError, PublishError};
use crate::settings::Endpoints;
use crate::upload::{RawResponse, UploadRequest, UploadTransport};

pub const API_TOKEN_HEADER: &str = "X-Api-Token";

/// Options for the underlying HTTP client.
#[derive(Debug, Clone, Default)]
pub struct NetworkOptions {
    pub timeout: Option<Duration>,
    pub skip_verify: bool,
}

pub struct ForgeClient {
    client: Client,
    endpoints: Endpoints,
}

impl ForgeClient {
    pub fn new(endpoints: Endpoints, options: &NetworkOptions) -> Result<Self, PublishError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if options.skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| PublishError::transport("build http client", e))?;

        info!(
            upload_base = %endpoints.upload_base,
            lookup_base = %endpoints.lookup_base,
            timeout_secs = options.timeout.map(|t| t.as_secs()),
            skip_verify = options.skip_verify,
            "Initialized ForgeClient"
        );
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl SlugLookup for ForgeClient {
    async fn lookup_slug(&self, project_id: i64) -> Result<String, LookupError> {
        let url = self.endpoints.lookup_url(project_id);
        debug!(%url, project = project_id, "Looking up dependency slug");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let addon: AddonInfo = serde_json::from_slice(&body)?;
        Ok(addon.slug)
    }
}

#[async_trait]
impl UploadTransport for ForgeClient {
    async fn send(&self, request: UploadRequest) -> Result<RawResponse, PublishError> {
        info!(
            url = %request.url,
            file = %request.filename,
            bytes = request.artifact.len(),
            "Submitting upload"
        );

        let form = Form::new()
            .part(
                "file",
                Part::bytes(request.artifact).file_name(request.filename),
            )
            .part("metadata", Part::bytes(request.metadata));

        let response = self
            .client
            .post(&request.url)
            .header(API_TOKEN_HEADER, &request.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::transport("submit request", e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| PublishError::transport("read response", e))?;

        debug!(status, bytes = body.len(), "Received upload response");
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
