//! Error taxonomy for the publish pipeline.
//!
//! Every fatal failure surfaces as a [`PublishError`]. Per-entry dependency
//! lookup failures use [`LookupError`] and never escape the dependency
//! resolver; they are logged and recorded as warnings instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    /// Missing or invalid settings, detected before any network activity.
    #[error("{0}")]
    Config(String),

    #[error("failed to {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {context}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode metadata")]
    Encode(#[source] serde_json::Error),

    #[error("failed to {context}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse response (status {status}): {body}")]
    MalformedResponse {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to upload release (status {status}): error {code}: {message}")]
    Rejected {
        status: u16,
        code: i64,
        message: String,
    },
}

impl PublishError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PublishError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        PublishError::Parse {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        PublishError::Transport {
            context: context.into(),
            source,
        }
    }
}

/// Why a single dependency slug lookup failed.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("failed to gather dependency slug: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("dependency lookup returned status {0}")]
    Status(u16),

    #[error("failed to parse dependency body: {0}")]
    Body(#[from] serde_json::Error),
}
