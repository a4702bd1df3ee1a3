//! # Cache Reconciliation
//!
//! Brings the artifact cache into agreement with the manifest. For each
//! document, in manifest order:
//!
//! - if its cache file exists it is left alone (no integrity check, no refresh),
//! - otherwise the artifact is fetched by storage identifier and written
//!   atomically to the cache path.
//!
//! Failures are per item. A failed download is recorded as
//! [`ItemOutcome::Failed`] and the loop moves on; nothing here aborts the run.
//! Files removed from the manifest are never deleted from the cache.
//!
//! With `workers > 1` downloads run on a bounded rayon pool.
//! Documents sharing a cache path are handed to the same worker as one unit
//! so no two threads ever write the same file. Progress is published under a
//! lock and only ever increases.
//!
//! The cache is keyed by file name, not content: when a manifest revision
//! points an existing file name at a new identifier, the stale local copy is
//! kept. Two manifest rows with the same file name share one cache entry, and
//! which row's artifact ends up there is not guaranteed.

use crate::model::DocumentRecord;
use crate::remote::ArtifactSource;
use crate::store::cache::CacheDir;
use std::collections::HashMap;
use std::path::PathBuf;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Cooperative cancellation flag, checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub workers: usize,
    pub cancel: CancelToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    AlreadyCached,
    Downloaded { bytes: usize },
    Failed { reason: String },
    /// Not attempted because the run was cancelled.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub file_name: String,
    pub remote_id: String,
    pub local_path: PathBuf,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub total: usize,
    pub downloaded: usize,
    pub already_cached: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    /// One entry per document, in manifest order.
    pub items: Vec<ItemResult>,
}

impl ReconcileReport {
    fn from_items(items: Vec<ItemResult>) -> Self {
        let mut report = ReconcileReport {
            total: items.len(),
            ..Default::default()
        };
        for item in &items {
            match item.outcome {
                ItemOutcome::AlreadyCached => report.already_cached += 1,
                ItemOutcome::Downloaded { .. } => report.downloaded += 1,
                ItemOutcome::Failed { .. } => report.failed += 1,
                ItemOutcome::Skipped => report.skipped += 1,
            }
        }
        report.cancelled = report.skipped > 0;
        report.items = items;
        report
    }

    /// `(downloaded, failed)`
    pub fn counts(&self) -> (usize, usize) {
        (self.downloaded, self.failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed { .. }))
    }

    pub fn summary(&self) -> String {
        format!("{} downloaded, {} failed", self.downloaded, self.failed)
    }
}

/// Downloads every document whose cache file is missing.
pub fn reconcile<A>(
    documents: &[DocumentRecord],
    cache: &CacheDir,
    source: &A,
    options: &ReconcileOptions,
    on_progress: &(dyn Fn(Progress) + Sync),
) -> ReconcileReport
where
    A: ArtifactSource,
{
    let total = documents.len();
    let slots: Mutex<Vec<Option<ItemResult>>> = Mutex::new(vec![None; total]);
    let completed = Mutex::new(0usize);

    let process = |index: usize| {
        let doc = &documents[index];
        let result = reconcile_one(doc, cache, source, &options.cancel);
        let counts = !matches!(result.outcome, ItemOutcome::Skipped);
        if let Ok(mut slots) = slots.lock() {
            slots[index] = Some(result);
        }
        if counts {
            if let Ok(mut done) = completed.lock() {
                *done += 1;
                on_progress(Progress {
                    completed: *done,
                    total,
                });
            }
        }
    };

    let units = group_by_path(documents, cache);
    let workers = options.workers.max(1).min(units.len().max(1));

    if workers == 1 {
        (0..total).for_each(process);
    } else {
        debug!(workers, units = units.len(), "reconciling with worker pool");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("docshelf-download-{}", i))
            .build();
        match pool {
            Ok(pool) => pool.install(|| {
                units
                    .par_iter()
                    .for_each(|unit| unit.iter().copied().for_each(&process))
            }),
            Err(e) => {
                warn!(error = %e, "could not start download pool, continuing sequentially");
                (0..total).for_each(&process);
            }
        }
    }

    let items: Vec<ItemResult> = slots
        .into_inner()
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();
    let report = ReconcileReport::from_items(items);
    info!(
        total = report.total,
        downloaded = report.downloaded,
        already_cached = report.already_cached,
        failed = report.failed,
        cancelled = report.cancelled,
        "reconciliation finished"
    );
    report
}

fn reconcile_one<A: ArtifactSource>(
    doc: &DocumentRecord,
    cache: &CacheDir,
    source: &A,
    cancel: &CancelToken,
) -> ItemResult {
    let local_path = cache.local_path(&doc.file_name);
    let outcome = if cancel.is_cancelled() {
        ItemOutcome::Skipped
    } else if cache.is_cached(&local_path) {
        debug!(file = %doc.file_name, "already cached");
        ItemOutcome::AlreadyCached
    } else {
        let fetched = source
            .fetch_artifact(&doc.remote_id)
            .and_then(|bytes| cache.write_atomic(&local_path, &bytes).map(|_| bytes.len()));
        match fetched {
            Ok(bytes) => {
                debug!(file = %doc.file_name, bytes, "downloaded");
                ItemOutcome::Downloaded { bytes }
            }
            Err(e) => {
                warn!(file = %doc.file_name, remote_id = %doc.remote_id, error = %e, "download failed");
                ItemOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    };

    ItemResult {
        file_name: doc.file_name.clone(),
        remote_id: doc.remote_id.clone(),
        local_path,
        outcome,
    }
}

/// Document indexes grouped by cache path, groups in first-appearance order.
fn group_by_path(documents: &[DocumentRecord], cache: &CacheDir) -> Vec<Vec<usize>> {
    let mut position: HashMap<PathBuf, usize> = HashMap::new();
    let mut units: Vec<Vec<usize>> = Vec::new();
    for (index, doc) in documents.iter().enumerate() {
        let path = cache.local_path(&doc.file_name);
        match position.get(&path) {
            Some(&unit) => units[unit].push(index),
            None => {
                position.insert(path, units.len());
                units.push(vec![index]);
            }
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::StaticRemote;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CacheDir) {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().join("files"));
        cache.ensure().unwrap();
        (dir, cache)
    }

    fn docs(n: usize) -> Vec<DocumentRecord> {
        (0..n)
            .map(|i| DocumentRecord::new(format!("id{}", i), format!("Doc {}", i), format!("DOC_{}", i)))
            .collect()
    }

    fn remote_for(docs: &[DocumentRecord]) -> StaticRemote {
        docs.iter().fold(StaticRemote::new(), |r, d| {
            r.with_artifact(&d.remote_id, d.file_name.as_bytes())
        })
    }

    fn no_progress(_: Progress) {}

    #[test]
    fn downloads_missing_documents_in_manifest_order() {
        let (_dir, cache) = setup();
        let docs = docs(3);
        let remote = remote_for(&docs);

        let report = reconcile(&docs, &cache, &remote, &ReconcileOptions::default(), &no_progress);

        assert_eq!(report.counts(), (3, 0));
        assert_eq!(remote.requests(), vec!["id0", "id1", "id2"]);
        assert_eq!(
            fs::read(cache.local_path("DOC_1")).unwrap(),
            b"DOC_1".to_vec()
        );
    }

    #[test]
    fn fully_cached_list_downloads_nothing() {
        let (_dir, cache) = setup();
        let docs = docs(4);
        for d in &docs {
            fs::write(cache.local_path(&d.file_name), b"old").unwrap();
        }
        let remote = StaticRemote::new();

        let report = reconcile(&docs, &cache, &remote, &ReconcileOptions::default(), &no_progress);

        assert_eq!(report.counts(), (0, 0));
        assert_eq!(report.already_cached, 4);
        assert!(remote.requests().is_empty());
        assert_eq!(fs::read(cache.local_path("DOC_0")).unwrap(), b"old");
    }

    #[test]
    fn failures_are_counted_and_do_not_stop_the_run() {
        let (_dir, cache) = setup();
        let docs = docs(3);
        let remote = StaticRemote::new()
            .with_artifact("id0", b"a")
            .with_artifact("id2", b"c");

        let report = reconcile(&docs, &cache, &remote, &ReconcileOptions::default(), &no_progress);

        assert_eq!(report.counts(), (2, 1));
        let failed: Vec<_> = report.failures().map(|i| i.file_name.as_str()).collect();
        assert_eq!(failed, vec!["DOC_1"]);
        assert!(!cache.local_path("DOC_1").exists());
        assert_eq!(report.summary(), "2 downloaded, 1 failed");
    }

    #[test]
    fn write_failure_is_a_failed_item_not_a_cached_one() {
        let (_dir, cache) = setup();
        let docs = docs(2);
        let remote = remote_for(&docs);
        let blocked = cache.local_path("DOC_0");
        fs::create_dir_all(blocked.join("occupied")).unwrap();

        let report = reconcile(&docs, &cache, &remote, &ReconcileOptions::default(), &no_progress);

        assert_eq!(report.counts(), (1, 1));
        assert!(matches!(report.items[0].outcome, ItemOutcome::Failed { .. }));
        assert!(!cache.is_cached(&blocked));

        let report = reconcile(&docs, &cache, &remote, &ReconcileOptions::default(), &no_progress);
        assert!(matches!(report.items[0].outcome, ItemOutcome::Failed { .. }));
        assert_eq!(report.already_cached, 1);
    }

    #[test]
    fn progress_is_monotonic_and_final_count_exact() {
        let (_dir, cache) = setup();
        let docs = docs(5);
        let remote = remote_for(&docs);
        let seen = Mutex::new(Vec::new());

        reconcile(&docs, &cache, &remote, &ReconcileOptions::default(), &|p: Progress| {
            seen.lock().unwrap().push(p)
        });

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.windows(2).all(|w| w[0].completed < w[1].completed));
        assert_eq!(seen.last().copied(), Some(Progress { completed: 5, total: 5 }));
    }

    #[test]
    fn worker_pool_keeps_counts_exact() {
        let (_dir, cache) = setup();
        let docs = docs(20);
        let remote = StaticRemote::new();
        let remote = docs
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 4 != 0)
            .fold(remote, |r, (_, d)| r.with_artifact(&d.remote_id, b"x"));
        let seen = Mutex::new(Vec::new());
        let options = ReconcileOptions {
            workers: 4,
            ..Default::default()
        };

        let report = reconcile(&docs, &cache, &remote, &options, &|p: Progress| {
            seen.lock().unwrap().push(p.completed)
        });

        assert_eq!(report.counts(), (15, 5));
        assert_eq!(report.items.len(), 20);
        assert_eq!(report.items[3].file_name, "DOC_3");
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_file_names_share_one_cache_entry() {
        let (_dir, cache) = setup();
        let docs = vec![
            DocumentRecord::new("first", "A", "SAME"),
            DocumentRecord::new("other", "B", "OTHER"),
            DocumentRecord::new("second", "C", "SAME"),
        ];
        let remote = StaticRemote::new()
            .with_artifact("first", b"1")
            .with_artifact("second", b"2")
            .with_artifact("other", b"o");
        let options = ReconcileOptions {
            workers: 2,
            ..Default::default()
        };

        let report = reconcile(&docs, &cache, &remote, &options, &no_progress);

        assert_eq!(report.downloaded + report.already_cached, 3);
        assert_eq!(report.downloaded, 2);
        assert!(cache.local_path("SAME").is_file());
    }

    #[test]
    fn cancelled_run_skips_remaining_documents() {
        let (_dir, cache) = setup();
        let docs = docs(3);
        let remote = remote_for(&docs);
        let options = ReconcileOptions::default();
        let cancel = options.cancel.clone();

        let report = reconcile(&docs, &cache, &remote, &options, &|p: Progress| {
            if p.completed == 1 {
                cancel.cancel();
            }
        });

        assert!(report.cancelled);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.skipped, 2);
        assert!(!cache.local_path("DOC_1").exists());
    }

    #[test]
    fn group_by_path_merges_duplicates() {
        let cache = CacheDir::new(PathBuf::from("files"));
        let docs = vec![
            DocumentRecord::new("a", "a", "X"),
            DocumentRecord::new("b", "b", "Y"),
            DocumentRecord::new("c", "c", "X.pdf"),
        ];
        assert_eq!(group_by_path(&docs, &cache), vec![vec![0, 2], vec![1]]);
    }
}
