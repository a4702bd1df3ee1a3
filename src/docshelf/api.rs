//! # API Facade
//!
//! A thin facade over the command layer and the sync engine, and the single
//! entry point for every docshelf operation regardless of the UI driving it.
//!
//! The facade dispatches to `commands/*.rs` and returns `Result<CmdResult>`.
//! It does no printing and holds no business logic.
//!
//! `ShelfApi<R, S>` is generic over the remote and the snapshot store:
//! - Production: `ShelfApi<HttpRemote, FileSnapshotStore>`
//! - Testing: `ShelfApi<StaticRemote, InMemorySnapshotStore>`

use crate::commands;
use crate::config::ShelfConfig;
use crate::engine::{EngineOptions, SyncEngine, SyncEvent};
use crate::error::Result;
use crate::manifest::ParseOptions;
use crate::remote::http::HttpRemote;
use crate::remote::RemoteSource;
use crate::session::SessionReport;
use crate::store::cache::CacheDir;
use crate::store::snapshot::FileSnapshotStore;
use crate::store::SnapshotStore;
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{
    CmdMessage, CmdResult, DocumentEntry, Listing, MessageLevel, ShelfPaths, StatusInfo,
};

pub struct ShelfApi<R, S> {
    engine: SyncEngine<R, S>,
    paths: ShelfPaths,
}

impl ShelfApi<HttpRemote, FileSnapshotStore> {
    /// Wires the production remote and on-disk stores under `paths`.
    pub fn from_config(paths: ShelfPaths, config: &ShelfConfig) -> Result<Self> {
        let remote = HttpRemote::from_config(config)?;
        let snapshots = FileSnapshotStore::new(paths.snapshot_file());
        let cache = CacheDir::new(paths.cache_dir()).with_file_ext(&config.file_ext);
        let options = EngineOptions {
            parse: ParseOptions {
                header_sentinel: config.header_sentinel.clone(),
            },
            workers: config.workers,
        };
        Ok(Self::new(
            SyncEngine::open(remote, snapshots, cache, options),
            paths,
        ))
    }
}

impl<R, S> ShelfApi<R, S>
where
    R: RemoteSource,
    S: SnapshotStore + 'static,
{
    pub fn new(engine: SyncEngine<R, S>, paths: ShelfPaths) -> Self {
        Self { engine, paths }
    }

    /// Runs a full session and waits for it.
    pub fn sync(&self) -> Result<CmdResult> {
        commands::sync::run(&self.engine)
    }

    /// Starts a session in the background; `None` if one is already running.
    pub fn start_sync(&self) -> Option<JoinHandle<SessionReport>> {
        self.engine.trigger()
    }

    pub fn sync_summary(&self, report: SessionReport) -> CmdResult {
        commands::sync::summarize(report)
    }

    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.engine.subscribe()
    }

    pub fn cancel_sync(&self) {
        self.engine.cancel();
    }

    pub fn browse(&self, area: Option<&str>, kind: Option<&str>) -> Result<CmdResult> {
        let catalog = self.engine.catalog();
        commands::browse::run(&catalog, self.engine.cache(), area, kind)
    }

    pub fn status(&self) -> Result<CmdResult> {
        commands::status::run(&self.engine.view(), self.engine.cache())
    }

    pub fn document_path(&self, query: &str) -> Result<CmdResult> {
        commands::path::run(&self.engine, query)
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn init(&self) -> Result<CmdResult> {
        commands::init::run(&self.paths)
    }

    pub fn engine(&self) -> &SyncEngine<R, S> {
        &self.engine
    }

    pub fn paths(&self) -> &ShelfPaths {
        &self.paths
    }
}
