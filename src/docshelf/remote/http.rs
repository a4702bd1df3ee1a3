use super::{ArtifactSource, ManifestSource};
use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("docshelf/", env!("CARGO_PKG_VERSION"));

pub struct HttpRemote {
    client: Client,
    manifest_url: Option<String>,
    download_endpoint: String,
}

impl HttpRemote {
    pub fn from_config(config: &ShelfConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ShelfError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            manifest_url: config.manifest_url.clone(),
            download_endpoint: config.download_endpoint.clone(),
        })
    }
}

impl ManifestSource for HttpRemote {
    fn fetch_manifest(&self) -> Result<String> {
        let url = self.manifest_url.as_deref().ok_or_else(|| {
            ShelfError::ManifestFetch(
                "no manifest URL configured (docshelf config manifest-url <url>)".to_string(),
            )
        })?;

        debug!(url, "fetching manifest");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ShelfError::ManifestFetch(describe(&e)))?;

        response
            .text()
            .map_err(|e| ShelfError::ManifestFetch(describe(&e)))
    }
}

impl ArtifactSource for HttpRemote {
    fn fetch_artifact(&self, remote_id: &str) -> Result<Vec<u8>> {
        let download_error = |reason: String| ShelfError::ArtifactDownload {
            remote_id: remote_id.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&self.download_endpoint)
            .query(&[("id", remote_id)])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(describe(&e)))?;

        reject_html(response.headers()).map_err(download_error)?;

        let bytes = response.bytes().map_err(|e| download_error(describe(&e)))?;
        Ok(bytes.to_vec())
    }
}

/// Share hosts answer some requests (quota, virus-scan warnings) with an HTML
/// page and a 200 status; that page is not the document.
fn reject_html(headers: &HeaderMap) -> std::result::Result<(), String> {
    let is_html = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"));
    if is_html {
        Err("server returned an HTML page".to_string())
    } else {
        Ok(())
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if let Some(status) = e.status() {
        format!("HTTP {}", status)
    } else {
        e.to_string()
    }
}
