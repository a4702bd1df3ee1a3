//! # Synchronization Engine
//!
//! [`SyncEngine`] owns the document list, the catalog built from it, and the
//! session status. A session runs fetch → parse → persist → rebuild →
//! reconcile; on a fetch or parse failure it falls back to the last snapshot.
//!
//! ## Hand-off to the presentation layer
//!
//! The engine never touches UI state. It publishes:
//!
//! - an immutable [`ShelfView`] that readers clone out with [`SyncEngine::view`];
//!   documents and catalog sit behind `Arc`s and are swapped whole, so a reader
//!   never sees a half-built catalog;
//! - [`SyncEvent`]s on every channel handed out by [`SyncEngine::subscribe`].
//!
//! ## Single flight
//!
//! At most one session runs at a time. A trigger that arrives while one is
//! active returns `None` and changes nothing; it is not queued.

use crate::catalog::Catalog;
use crate::error::{Result, ShelfError};
use crate::manifest::{parse_manifest, ParseOptions};
use crate::model::DocumentRecord;
use crate::reconcile::{reconcile, CancelToken, Progress, ReconcileOptions};
use crate::remote::RemoteSource;
use crate::session::{SessionReport, SyncStatus, Transition};
use crate::store::cache::CacheDir;
use crate::store::{Snapshot, SnapshotStore};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub parse: ParseOptions,
    pub workers: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            workers: 1,
        }
    }
}

/// Read-only picture of the engine, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ShelfView {
    pub status: SyncStatus,
    pub progress: Progress,
    /// Human-readable outcome of the last session.
    pub message: Option<String>,
    pub documents: Arc<Vec<DocumentRecord>>,
    pub catalog: Arc<Catalog>,
    pub snapshot_saved_at: Option<DateTime<Utc>>,
    pub last_report: Option<SessionReport>,
}

#[derive(Debug, Clone)]
pub enum SyncEvent {
    Status(SyncStatus),
    Progress(Progress),
    CatalogUpdated(Arc<Catalog>),
    Finished(SessionReport),
}

struct Inner<R, S> {
    remote: R,
    snapshots: S,
    cache: CacheDir,
    options: EngineOptions,
    state: RwLock<ShelfView>,
    active: AtomicBool,
    cancel: CancelToken,
    subscribers: Mutex<Vec<Sender<SyncEvent>>>,
}

pub struct SyncEngine<R, S> {
    inner: Arc<Inner<R, S>>,
}

impl<R, S> Clone for SyncEngine<R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the single-flight flag when a session ends, however it ends.
struct SessionGuard<'a>(&'a AtomicBool);

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<R, S> SyncEngine<R, S>
where
    R: RemoteSource,
    S: SnapshotStore + 'static,
{
    /// Builds the engine and loads the last snapshot, if any, so the catalog
    /// is browsable before any network activity.
    pub fn open(remote: R, snapshots: S, cache: CacheDir, options: EngineOptions) -> Self {
        if let Err(e) = cache.ensure() {
            warn!(path = %cache.root().display(), error = %e, "could not create cache folder");
        }

        let mut view = ShelfView::default();
        match snapshots.load() {
            Ok(Some(snapshot)) => {
                let documents = resolve_paths(&cache, snapshot.documents);
                info!(documents = documents.len(), "loaded catalog snapshot");
                view.catalog = Arc::new(Catalog::build(&documents));
                view.documents = Arc::new(documents);
                view.snapshot_saved_at = Some(snapshot.saved_at);
            }
            Ok(None) => debug!("no catalog snapshot yet"),
            Err(e) => warn!(error = %e, "catalog snapshot unreadable, starting empty"),
        }

        Self {
            inner: Arc::new(Inner {
                remote,
                snapshots,
                cache,
                options,
                state: RwLock::new(view),
                active: AtomicBool::new(false),
                cancel: CancelToken::new(),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn view(&self) -> ShelfView {
        self.read_state().clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.read_state().status
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.read_state().catalog)
    }

    pub fn documents(&self) -> Arc<Vec<DocumentRecord>> {
        Arc::clone(&self.read_state().documents)
    }

    pub fn cache(&self) -> &CacheDir {
        &self.inner.cache
    }

    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    pub fn is_syncing(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// A channel receiving every event published from now on.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    pub fn is_cached(&self, doc: &DocumentRecord) -> bool {
        let cache = &self.inner.cache;
        cache.is_cached(&cache.local_path(&doc.file_name))
    }

    /// Absolute path of a cached document, for handing to a viewer.
    pub fn open_path(&self, doc: &DocumentRecord) -> Result<PathBuf> {
        let path = self.inner.cache.local_path(&doc.file_name);
        if !self.inner.cache.is_cached(&path) {
            return Err(ShelfError::NotCached(doc.file_name.clone()));
        }
        fs::canonicalize(&path).map_err(ShelfError::Io)
    }

    /// Starts a session on a background thread. Returns `None` without side
    /// effects if a session is already running.
    pub fn trigger(&self) -> Option<JoinHandle<SessionReport>> {
        if !self.begin() {
            return None;
        }
        let engine = self.clone();
        let spawned = thread::Builder::new()
            .name("docshelf-sync".to_string())
            .spawn(move || {
                let _guard = SessionGuard(&engine.inner.active);
                engine.run_session()
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "could not spawn sync thread");
                self.inner.active.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    /// Runs a session on the calling thread. Returns `None` without side
    /// effects if a session is already running.
    pub fn sync_now(&self) -> Option<SessionReport> {
        if !self.begin() {
            return None;
        }
        let _guard = SessionGuard(&self.inner.active);
        Some(self.run_session())
    }

    /// Asks a running session to stop before its next download.
    pub fn cancel(&self) {
        if self.is_syncing() {
            self.inner.cancel.cancel();
        }
    }

    /// Moves `Offline`/`Failed` back to `Idle`. Returns whether it did.
    pub fn acknowledge(&self) -> bool {
        let moved = {
            let mut state = self.write_state();
            match state.status.next(Transition::Acknowledge) {
                Some(next) => {
                    state.status = next;
                    true
                }
                None => false,
            }
        };
        if moved {
            self.publish(SyncEvent::Status(SyncStatus::Idle));
        }
        moved
    }

    fn begin(&self) -> bool {
        let started = self
            .inner
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if started {
            // Cleared on claim, so a cancel issued right after `trigger` sticks.
            self.inner.cancel.reset();
        } else {
            debug!("sync already running, trigger ignored");
        }
        started
    }

    fn run_session(&self) -> SessionReport {
        self.acknowledge();
        self.apply(Transition::Trigger);
        info!("sync session started");

        let inner = &self.inner;
        let fetched = inner
            .remote
            .fetch_manifest()
            .and_then(|text| parse_manifest(&text, &inner.options.parse, &inner.cache))
            .map_err(|e| {
                if e.is_fetch_failure() {
                    e
                } else {
                    ShelfError::ManifestFetch(e.to_string())
                }
            });

        let report = match fetched {
            Ok(documents) => self.on_manifest(documents),
            Err(e) => self.on_fetch_failure(e),
        };

        {
            let mut state = self.write_state();
            state.message = Some(report.message());
            state.last_report = Some(report.clone());
        }
        info!(status = %report.status, "{}", report.message());
        self.publish(SyncEvent::Finished(report.clone()));
        report
    }

    fn on_manifest(&self, documents: Vec<DocumentRecord>) -> SessionReport {
        let inner = &self.inner;

        let snapshot = Snapshot::new(documents.clone());
        let snapshot_saved = match inner.snapshots.save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save catalog snapshot");
                false
            }
        };

        let documents = Arc::new(documents);
        let catalog = Arc::new(Catalog::build(&documents));
        {
            let mut state = self.write_state();
            state.documents = Arc::clone(&documents);
            state.catalog = Arc::clone(&catalog);
            state.progress = Progress {
                completed: 0,
                total: documents.len(),
            };
            if snapshot_saved {
                state.snapshot_saved_at = Some(snapshot.saved_at);
            }
        }
        self.publish(SyncEvent::CatalogUpdated(catalog));
        self.apply(Transition::ManifestFetched);

        let options = ReconcileOptions {
            workers: inner.options.workers,
            cancel: inner.cancel.clone(),
        };
        let reconciled = reconcile(
            &documents,
            &inner.cache,
            &inner.remote,
            &options,
            &|progress: Progress| self.set_progress(progress),
        );
        self.apply(Transition::Reconciled);

        SessionReport {
            status: SyncStatus::Done,
            documents: documents.len(),
            reconcile: Some(reconciled),
            error: None,
            snapshot_saved,
        }
    }

    fn on_fetch_failure(&self, error: ShelfError) -> SessionReport {
        warn!(error = %error, "manifest unavailable, falling back to snapshot");

        let snapshot = match self.inner.snapshots.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "catalog snapshot unreadable");
                None
            }
        };
        let snapshot_available = snapshot.is_some();

        let (documents, saved_at) = match snapshot {
            Some(s) => (resolve_paths(&self.inner.cache, s.documents), Some(s.saved_at)),
            None => (Vec::new(), None),
        };
        let documents = Arc::new(documents);
        let catalog = Arc::new(Catalog::build(&documents));
        {
            let mut state = self.write_state();
            state.documents = Arc::clone(&documents);
            state.catalog = Arc::clone(&catalog);
            state.snapshot_saved_at = saved_at;
            state.progress = Progress::default();
        }
        self.publish(SyncEvent::CatalogUpdated(catalog));
        let status = self.apply(Transition::FetchFailed { snapshot_available });

        SessionReport {
            status,
            documents: documents.len(),
            reconcile: None,
            error: Some(error.to_string()),
            snapshot_saved: false,
        }
    }

    fn apply(&self, transition: Transition) -> SyncStatus {
        let status = {
            let mut state = self.write_state();
            match state.status.next(transition) {
                Some(next) => {
                    debug!(from = %state.status, to = %next, "status change");
                    state.status = next;
                    next
                }
                None => {
                    warn!(from = %state.status, ?transition, "ignoring invalid transition");
                    state.status
                }
            }
        };
        self.publish(SyncEvent::Status(status));
        status
    }

    fn set_progress(&self, progress: Progress) {
        self.write_state().progress = progress;
        self.publish(SyncEvent::Progress(progress));
    }

    fn publish(&self, event: SyncEvent) {
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ShelfView> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ShelfView> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cache paths are recomputed, never taken from a snapshot.
fn resolve_paths(cache: &CacheDir, documents: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    documents
        .into_iter()
        .map(|doc| {
            let path = cache.local_path(&doc.file_name);
            doc.with_local_path(path)
        })
        .collect()
}
