use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_AREA: &str = "General";
pub const DEFAULT_TYPE: &str = "Doc";

/// One manifest entry after parsing and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Storage identifier used to fetch the artifact. Never empty.
    pub remote_id: String,
    pub title: String,
    /// Canonical file token from the manifest; the cache key.
    pub file_name: String,
    #[serde(default = "default_area")]
    pub area: String,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    // Written for readers of the snapshot, never trusted on load: the cache
    // root can differ between machines.
    #[serde(default, skip_deserializing)]
    pub local_path: PathBuf,
}

fn default_area() -> String {
    DEFAULT_AREA.to_string()
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

impl DocumentRecord {
    pub fn new(
        remote_id: impl Into<String>,
        title: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            remote_id: remote_id.into(),
            title: title.into(),
            file_name: file_name.into(),
            area: default_area(),
            kind: default_type(),
            local_path: PathBuf::new(),
        }
    }

    pub fn with_classification(mut self, area: impl Into<String>, kind: impl Into<String>) -> Self {
        self.area = area.into();
        self.kind = kind.into();
        self
    }

    pub fn with_local_path(mut self, path: PathBuf) -> Self {
        self.local_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_json_ignores_stored_local_path() {
        let json = r#"{
            "remote_id": "AbC123",
            "title": "Planta general",
            "file_name": "PROY-2044_DW_01",
            "area": "Área 2044",
            "type": "Plano",
            "local_path": "/somewhere/else/PROY-2044_DW_01.pdf"
        }"#;

        let doc: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(doc.kind, "Plano");
        assert_eq!(doc.local_path, PathBuf::new());
    }

    #[test]
    fn missing_classification_uses_defaults() {
        let json = r#"{"remote_id": "x", "title": "t", "file_name": "f"}"#;
        let doc: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(doc.area, DEFAULT_AREA);
        assert_eq!(doc.kind, DEFAULT_TYPE);
    }
}
