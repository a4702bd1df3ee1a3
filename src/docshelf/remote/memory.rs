use super::{ArtifactSource, ManifestSource};
use crate::error::{Result, ShelfError};
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::Mutex;

/// Canned remote for tests and offline development.
///
/// Serves a fixed manifest (or a fixed failure) and a map of artifacts;
/// identifiers without an artifact fail to download. Every artifact request
/// is recorded so tests can assert what was fetched.
#[derive(Default)]
pub struct StaticRemote {
    manifest: Option<String>,
    artifacts: HashMap<String, Vec<u8>>,
    gate: Option<Mutex<Receiver<()>>>,
    requests: Mutex<Vec<String>>,
}

impl StaticRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote whose manifest fetch always fails, like a dropped connection.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, text: impl Into<String>) -> Self {
        self.manifest = Some(text.into());
        self
    }

    pub fn with_artifact(mut self, remote_id: &str, bytes: &[u8]) -> Self {
        self.artifacts.insert(remote_id.to_string(), bytes.to_vec());
        self
    }

    /// The manifest fetch blocks until a message arrives on `gate`, which
    /// lets tests hold a session in `FetchingManifest`.
    pub fn with_gate(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(Mutex::new(gate));
        self
    }

    /// Identifiers requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ManifestSource for StaticRemote {
    fn fetch_manifest(&self) -> Result<String> {
        if let Some(gate) = &self.gate {
            if let Ok(rx) = gate.lock() {
                let _ = rx.recv();
            }
        }
        self.manifest
            .clone()
            .ok_or_else(|| ShelfError::ManifestFetch("connection refused".to_string()))
    }
}

impl ArtifactSource for StaticRemote {
    fn fetch_artifact(&self, remote_id: &str) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(remote_id.to_string());
        }
        self.artifacts
            .get(remote_id)
            .cloned()
            .ok_or_else(|| ShelfError::ArtifactDownload {
                remote_id: remote_id.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }
}
