use crate::commands::{CmdResult, StatusInfo};
use crate::engine::ShelfView;
use crate::error::Result;
use crate::store::cache::CacheDir;

pub fn run(view: &ShelfView, cache: &CacheDir) -> Result<CmdResult> {
    let cached = view
        .documents
        .iter()
        .filter(|doc| cache.is_cached(&cache.local_path(&doc.file_name)))
        .count();

    let info = StatusInfo {
        status: view.status,
        documents: view.documents.len(),
        cached,
        areas: view.catalog.areas.len(),
        snapshot_saved_at: view.snapshot_saved_at,
        cache_dir: cache.root().to_path_buf(),
        message: view.message.clone(),
    };
    Ok(CmdResult::default().with_status(info))
}
