//! # Remote Sources
//!
//! The engine talks to two remote collaborators, both treated as opaque
//! blocking calls that run off the interactive thread:
//!
//! - [`ManifestSource`]: returns the comma-separated manifest payload.
//! - [`ArtifactSource`]: returns the raw bytes of one document, keyed by its
//!   storage identifier.
//!
//! Implementations:
//!
//! - [`http::HttpRemote`]: production, a blocking `reqwest` client
//! - [`memory::StaticRemote`]: canned payloads for tests

use crate::error::Result;

pub mod http;
pub mod memory;

pub trait ManifestSource: Send + Sync {
    /// Fetch the full manifest text. Any transport, timeout, or HTTP status
    /// failure is reported as an error.
    fn fetch_manifest(&self) -> Result<String>;
}

pub trait ArtifactSource: Send + Sync {
    /// Fetch the artifact stored under `remote_id`.
    fn fetch_artifact(&self, remote_id: &str) -> Result<Vec<u8>>;
}

/// Everything the sync engine needs from the remote side.
pub trait RemoteSource: ManifestSource + ArtifactSource + 'static {}

impl<T: ManifestSource + ArtifactSource + 'static> RemoteSource for T {}
