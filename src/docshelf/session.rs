//! # Session State Machine
//!
//! ```text
//! Idle ──trigger──▶ FetchingManifest ──fetched──▶ Reconciling ──reconciled──▶ Done
//!                        │                                                     │
//!                        ├──fetch failed, snapshot──▶ Offline ──acknowledge──▶ Idle
//!                        └──fetch failed, nothing───▶ Failed  ──acknowledge──▶ Idle
//!
//! Done ──trigger──▶ FetchingManifest
//! ```
//!
//! No automatic retry: leaving `Offline` or `Failed` takes an explicit
//! acknowledge (the engine applies one when a new sync is triggered).

use crate::reconcile::ReconcileReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    FetchingManifest,
    Reconciling,
    Done,
    Offline,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Trigger,
    ManifestFetched,
    Reconciled,
    FetchFailed { snapshot_available: bool },
    Acknowledge,
}

impl SyncStatus {
    /// The state reached by applying `transition`, or `None` if the
    /// transition is not allowed from here.
    pub fn next(self, transition: Transition) -> Option<SyncStatus> {
        use SyncStatus::*;
        use Transition::*;
        match (self, transition) {
            (Idle | Done, Trigger) => Some(FetchingManifest),
            (FetchingManifest, ManifestFetched) => Some(Reconciling),
            (
                FetchingManifest,
                FetchFailed {
                    snapshot_available: true,
                },
            ) => Some(Offline),
            (
                FetchingManifest,
                FetchFailed {
                    snapshot_available: false,
                },
            ) => Some(Failed),
            (Reconciling, Reconciled) => Some(Done),
            (Offline | Failed, Acknowledge) => Some(Idle),
            _ => None,
        }
    }

    /// A session is running.
    pub fn is_active(self) -> bool {
        matches!(self, SyncStatus::FetchingManifest | SyncStatus::Reconciling)
    }

    pub fn label(self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::FetchingManifest => "fetching manifest",
            SyncStatus::Reconciling => "downloading",
            SyncStatus::Done => "synchronized",
            SyncStatus::Offline => "offline",
            SyncStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one session, handed to the presentation layer at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Terminal status: `Done`, `Offline` or `Failed`.
    pub status: SyncStatus,
    /// Documents in the catalog after the session.
    pub documents: usize,
    pub reconcile: Option<ReconcileReport>,
    /// The fetch failure that ended the session early, if any.
    pub error: Option<String>,
    pub snapshot_saved: bool,
}

impl SessionReport {
    pub fn message(&self) -> String {
        let error = self.error.as_deref().unwrap_or("unknown error");
        match self.status {
            SyncStatus::Done => {
                let summary = self
                    .reconcile
                    .as_ref()
                    .map(|r| r.summary())
                    .unwrap_or_default();
                match &self.reconcile {
                    Some(r) if r.cancelled => format!("Sync cancelled: {}", summary),
                    _ => format!("Synchronized {} documents: {}", self.documents, summary),
                }
            }
            SyncStatus::Offline => format!(
                "Offline, showing {} saved documents ({})",
                self.documents, error
            ),
            SyncStatus::Failed => format!("Sync failed: {}", error),
            other => other.label().to_string(),
        }
    }
}
