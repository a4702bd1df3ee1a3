use crate::catalog::Catalog;
use crate::config::ShelfConfig;
use crate::model::DocumentRecord;
use crate::session::SessionReport;
use crate::store::snapshot::SNAPSHOT_FILENAME;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

pub mod browse;
pub mod config;
pub mod init;
pub mod path;
pub mod status;
pub mod sync;

const CACHE_DIRNAME: &str = "files";

/// Locations of everything docshelf keeps on disk.
#[derive(Debug, Clone)]
pub struct ShelfPaths {
    pub data_dir: PathBuf,
}

impl ShelfPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join(CACHE_DIRNAME)
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILENAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A document as shown in a listing, with its cache state.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    pub document: DocumentRecord,
    pub cached: bool,
}

/// One level of the catalog, ready for display.
#[derive(Debug, Clone)]
pub enum Listing {
    Areas(Vec<(String, usize)>),
    Types {
        area: String,
        types: Vec<(String, usize)>,
    },
    Documents {
        area: String,
        kind: String,
        documents: Vec<DocumentEntry>,
    },
}

#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub status: crate::session::SyncStatus,
    pub documents: usize,
    pub cached: usize,
    pub areas: usize,
    pub snapshot_saved_at: Option<DateTime<Utc>>,
    pub cache_dir: PathBuf,
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub listing: Option<Listing>,
    pub status: Option<StatusInfo>,
    pub report: Option<SessionReport>,
    pub paths: Vec<PathBuf>,
    pub config: Option<ShelfConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listing(mut self, listing: Listing) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn with_status(mut self, status: StatusInfo) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_report(mut self, report: SessionReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: ShelfConfig) -> Self {
        self.config = Some(config);
        self
    }
}

pub(crate) fn empty_catalog_hint(catalog: &Catalog) -> Option<CmdMessage> {
    catalog
        .is_empty()
        .then(|| CmdMessage::info("No documents yet. Run `docshelf sync`."))
}
