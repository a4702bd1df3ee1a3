//! # Storage Layer
//!
//! Two pieces of local state back the shelf:
//!
//! - The **snapshot**: the last successfully fetched document list, serialized
//!   as JSON. It is the only recovery path when the remote manifest is
//!   unreachable, and it is loaded eagerly at startup so the catalog is
//!   browsable before any network activity.
//! - The **artifact cache** ([`cache::CacheDir`]): one file per manifest entry,
//!   written only by the reconciler.
//!
//! The snapshot is abstracted behind [`SnapshotStore`] so the engine can be
//! exercised without touching the filesystem:
//!
//! - [`snapshot::FileSnapshotStore`]: production, `catalog.json` written atomically
//! - [`memory::InMemorySnapshotStore`]: tests
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── catalog.json   # {"saved_at": ..., "documents": [...]}
//! ├── config.json    # ShelfConfig
//! └── files/         # cached artifacts, <sanitized file token>.pdf
//! ```
//!
//! The hierarchy is never stored; it is rebuilt from the document list.

use crate::error::Result;
use crate::model::DocumentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod memory;
pub mod snapshot;

/// The persisted form of a document list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    pub documents: Vec<DocumentRecord>,
}

impl Snapshot {
    pub fn new(documents: Vec<DocumentRecord>) -> Self {
        Self {
            saved_at: Utc::now(),
            documents,
        }
    }
}

/// Abstract interface for snapshot persistence.
pub trait SnapshotStore: Send + Sync {
    /// Load the last snapshot. `Ok(None)` when none has been written yet.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot. Must be atomic: readers see either the
    /// previous snapshot or the new one, never a torn write.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
