#![doc = "curseforge-publish: publish a build artifact as a new CurseForge file release."]

//! The crate turns CI settings into an upload. It builds the release metadata
//! (resolving manifest dependencies into relations on the way), encodes the
//! artifact and metadata as multipart, posts it, and interprets the reply.
//!
//! Entry point for programmatic use is [`publish::publish`]; the binary wraps
//! it with [`cli::run`].

pub mod cli;
pub mod client;
pub mod dependency;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod publish;
pub mod resolve;
pub mod response;
pub mod settings;
pub mod upload;

pub use error::{LookupError, PublishError};
pub use publish::{publish, PublishReport};
pub use settings::{Endpoints, Settings};
