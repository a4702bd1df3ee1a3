use crate::error::{Result, ShelfError};
use crate::manifest::DEFAULT_HEADER_SENTINEL;
use crate::store::cache::normalize_file_ext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_FILE_EXT: &str = ".pdf";
const DEFAULT_DOWNLOAD_ENDPOINT: &str = "https://drive.google.com/uc?export=download";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for docshelf, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Published comma-separated manifest
    #[serde(default)]
    pub manifest_url: Option<String>,

    /// Artifacts are fetched from `<download_endpoint>?id=<remote id>`
    #[serde(default = "default_download_endpoint")]
    pub download_endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept certificates that cannot be validated
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    /// Extension appended to cached file names (e.g. ".pdf")
    #[serde(default = "default_file_ext")]
    pub file_ext: String,

    /// Substring marking the manifest's caption row
    #[serde(default = "default_header_sentinel")]
    pub header_sentinel: String,

    /// Concurrent downloads during reconciliation
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_download_endpoint() -> String {
    DEFAULT_DOWNLOAD_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_file_ext() -> String {
    DEFAULT_FILE_EXT.to_string()
}

fn default_header_sentinel() -> String {
    DEFAULT_HEADER_SENTINEL.to_string()
}

fn default_workers() -> usize {
    1
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            manifest_url: None,
            download_endpoint: default_download_endpoint(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: true,
            file_ext: default_file_ext(),
            header_sentinel: default_header_sentinel(),
            workers: default_workers(),
        }
    }
}

/// Keys accepted by `docshelf config <key> [value]`.
pub const CONFIG_KEYS: &[&str] = &[
    "manifest-url",
    "download-endpoint",
    "timeout-secs",
    "accept-invalid-certs",
    "file-ext",
    "header-sentinel",
    "workers",
];

impl ShelfConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ShelfError::Io)?;
        let config: ShelfConfig =
            serde_json::from_str(&content).map_err(ShelfError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ShelfError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ShelfError::Serialization)?;
        fs::write(config_path, content).map_err(ShelfError::Io)?;
        Ok(())
    }

    /// Set the file extension (normalizes to start with a dot)
    pub fn set_file_ext(&mut self, ext: &str) -> Result<()> {
        self.file_ext = normalize_file_ext(ext)
            .ok_or_else(|| ShelfError::Config("file-ext cannot be empty".to_string()))?;
        Ok(())
    }

    /// Current value of a config key, rendered for display.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "manifest-url" => self.manifest_url.clone().unwrap_or_default(),
            "download-endpoint" => self.download_endpoint.clone(),
            "timeout-secs" => self.timeout_secs.to_string(),
            "accept-invalid-certs" => self.accept_invalid_certs.to_string(),
            "file-ext" => self.file_ext.clone(),
            "header-sentinel" => self.header_sentinel.clone(),
            "workers" => self.workers.to_string(),
            other => return Err(unknown_key(other)),
        };
        Ok(value)
    }

    /// Parse and store a value for a config key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "manifest-url" => {
                self.manifest_url = (!value.trim().is_empty()).then(|| value.trim().to_string())
            }
            "download-endpoint" => self.download_endpoint = value.trim().to_string(),
            "timeout-secs" => self.timeout_secs = parse_value(key, value)?,
            "accept-invalid-certs" => self.accept_invalid_certs = parse_value(key, value)?,
            "file-ext" => self.set_file_ext(value)?,
            "header-sentinel" => self.header_sentinel = value.trim().to_lowercase(),
            "workers" => {
                let workers: usize = parse_value(key, value)?;
                if workers == 0 {
                    return Err(ShelfError::Config("workers must be at least 1".to_string()));
                }
                self.workers = workers;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ShelfError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn unknown_key(key: &str) -> ShelfError {
    ShelfError::Config(format!(
        "Unknown config key: {} (known keys: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}
