use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Manifest fetch failed: {0}")]
    ManifestFetch(String),

    #[error("Manifest could not be parsed: {0}")]
    ManifestParse(String),

    #[error("Download of {remote_id} failed: {reason}")]
    ArtifactDownload { remote_id: String, reason: String },

    #[error("Snapshot error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document is not cached yet: {0}")]
    NotCached(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl ShelfError {
    /// Errors that end the fetch phase of a session and send it down the
    /// offline fallback path.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ShelfError::ManifestFetch(_) | ShelfError::ManifestParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_and_parse_errors_trigger_fallback() {
        assert!(ShelfError::ManifestFetch("timeout".into()).is_fetch_failure());
        assert!(ShelfError::ManifestParse("html".into()).is_fetch_failure());
        assert!(!ShelfError::Persistence("disk full".into()).is_fetch_failure());
    }

    #[test]
    fn download_error_names_the_identifier() {
        let err = ShelfError::ArtifactDownload {
            remote_id: "AbC123".into(),
            reason: "404".into(),
        };
        assert_eq!(err.to_string(), "Download of AbC123 failed: 404");
    }
}
