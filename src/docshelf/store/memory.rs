use super::{Snapshot, SnapshotStore};
use crate::error::{Result, ShelfError};
use std::sync::Mutex;

/// In-memory snapshot storage for testing. Does NOT persist data.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshot: Mutex<Option<Snapshot>>,
    fail_writes: bool,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            fail_writes: false,
        }
    }

    /// Every `save` fails, simulating a read-only or full disk.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn current(&self) -> Option<Snapshot> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| ShelfError::Persistence("snapshot lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_writes {
            return Err(ShelfError::Persistence("writes disabled".to_string()));
        }
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| ShelfError::Persistence("snapshot lock poisoned".to_string()))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}
