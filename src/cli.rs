//! Command-line interface for curseforge-publish.
//!
//! Every flag can also be supplied through the `PLUGIN_*` environment variables
//! a CI runner sets, so the binary works as a pipeline step with no arguments.
//! All publishing logic lives in [`crate::publish`]; this module only maps
//! flags to [`Settings`], sets up logging and runs the pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::client::{ForgeClient, NetworkOptions};
use crate::publish::{publish, PublishReport};
use crate::resolve::LocalFs;
use crate::settings::{Endpoints, Settings, DEFAULT_LOOKUP_URL, DEFAULT_UPLOAD_URL};

/// Env var consulted when `--api-key` / `PLUGIN_API_KEY` is unset.
pub const API_KEY_FALLBACK_ENV: &str = "CURSEFORGE_API_KEY";
/// Env var consulted when `--note` / `PLUGIN_NOTE` is unset.
pub const NOTE_FALLBACK_ENV: &str = "PLUGIN_CHANGELOG";

/// Publish files to CurseForge.
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "curseforge-publish",
    version,
    about = "Publish a build artifact as a new CurseForge file release"
)]
pub struct Cli {
    /// API key used to access CurseForge
    #[clap(long, env = "PLUGIN_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Project id on CurseForge
    #[clap(long, env = "PLUGIN_PROJECT", default_value_t = 0)]
    pub project: i64,

    /// Path to the file to release
    #[clap(long, env = "PLUGIN_FILE")]
    pub file: Option<PathBuf>,

    /// Title of the release
    #[clap(long, env = "PLUGIN_TITLE", default_value = "")]
    pub title: String,

    /// Type of the release, or a file containing it
    #[clap(long, env = "PLUGIN_RELEASE", default_value = "release")]
    pub release: String,

    /// Changelog of the release, or a file containing it
    #[clap(long, env = "PLUGIN_NOTE", default_value = "")]
    pub note: String,

    /// Format of the changelog
    #[clap(long = "changelog-type", env = "PLUGIN_TYPE", default_value = "markdown")]
    pub changelog_type: String,

    /// Comma-separated game version ids
    #[clap(long, env = "PLUGIN_GAMES", value_delimiter = ',')]
    pub games: Vec<i64>,

    /// Relations to other projects as a JSON array, or a file containing it
    #[clap(long, env = "PLUGIN_RELATIONS")]
    pub relations: Option<String>,

    /// Path to a manifest whose dependencies become relations
    #[clap(long, env = "PLUGIN_MANIFEST")]
    pub manifest: Option<String>,

    /// Replace the generated metadata payload entirely
    #[clap(long, env = "PLUGIN_METADATA")]
    pub metadata: Option<String>,

    /// Base URL of the upload API
    #[clap(long = "upload-url", env = "PLUGIN_UPLOAD_URL", default_value = DEFAULT_UPLOAD_URL)]
    pub upload_url: String,

    /// Base URL of the dependency lookup API
    #[clap(long = "lookup-url", env = "PLUGIN_LOOKUP_URL", default_value = DEFAULT_LOOKUP_URL)]
    pub lookup_url: String,

    /// HTTP timeout in seconds
    #[clap(long, env = "PLUGIN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[clap(long = "skip-verify", env = "PLUGIN_SKIP_VERIFY")]
    pub skip_verify: bool,

    /// Log level used when RUST_LOG is not set
    #[clap(long = "log-level", env = "PLUGIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            api_key: with_fallback(&self.api_key, API_KEY_FALLBACK_ENV),
            project: self.project,
            file: self.file.clone().unwrap_or_default(),
            title: self.title.clone(),
            release: self.release.clone(),
            note: with_fallback(&self.note, NOTE_FALLBACK_ENV),
            changelog_type: self.changelog_type.clone(),
            games: self.games.clone(),
            relations: self.relations.clone(),
            manifest: self.manifest.clone(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            upload_base: self.upload_url.clone(),
            lookup_base: self.lookup_url.clone(),
        }
    }

    pub fn network_options(&self) -> NetworkOptions {
        NetworkOptions {
            timeout: self.timeout.map(Duration::from_secs),
            skip_verify: self.skip_verify,
        }
    }
}

fn with_fallback(value: &str, fallback_env: &str) -> String {
    if !value.is_empty() {
        return value.to_string();
    }
    std::env::var(fallback_env).unwrap_or_default()
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Async entrypoint shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<PublishReport> {
    tracing::info!("trace_initialised");

    let settings = cli.settings();
    settings.trace_loaded();
    let endpoints = cli.endpoints();

    let client = ForgeClient::new(endpoints.clone(), &cli.network_options())
        .context("Failed to construct CurseForge client")?;

    match publish(&settings, &endpoints, &LocalFs, &client, &client).await {
        Ok(report) => {
            tracing::info!(command = "publish", ?report, "Publish complete");
            Ok(report)
        }
        Err(e) => {
            tracing::error!(command = "publish", error = %e, "Publish failed");
            Err(anyhow::Error::new(e))
        }
    }
}
