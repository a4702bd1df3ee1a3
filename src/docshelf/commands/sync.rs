use crate::commands::{CmdMessage, CmdResult};
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::reconcile::ItemOutcome;
use crate::remote::RemoteSource;
use crate::session::{SessionReport, SyncStatus};
use crate::store::SnapshotStore;

/// Runs a full session on the calling thread.
pub fn run<R, S>(engine: &SyncEngine<R, S>) -> Result<CmdResult>
where
    R: RemoteSource,
    S: SnapshotStore + 'static,
{
    match engine.sync_now() {
        Some(report) => Ok(summarize(report)),
        None => {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info("A sync is already running."));
            Ok(result)
        }
    }
}

/// Turns a finished session into user-facing messages.
pub fn summarize(report: SessionReport) -> CmdResult {
    let mut result = CmdResult::default();

    if let Some(reconciled) = &report.reconcile {
        for item in &reconciled.items {
            if let ItemOutcome::Failed { reason } = &item.outcome {
                result.add_message(CmdMessage::warning(format!(
                    "Could not download {}: {}",
                    item.file_name, reason
                )));
            }
        }
    }

    let headline = report.message();
    let message = match report.status {
        SyncStatus::Done => match &report.reconcile {
            Some(r) if r.failed > 0 || r.cancelled => CmdMessage::warning(headline),
            _ => CmdMessage::success(headline),
        },
        SyncStatus::Offline => CmdMessage::warning(headline),
        _ => CmdMessage::error(headline),
    };
    result.add_message(message);

    if report.status == SyncStatus::Done && !report.snapshot_saved {
        result.add_message(CmdMessage::warning(
            "Catalog snapshot could not be saved; offline fallback will use an older copy.",
        ));
    }

    result.with_report(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::engine::EngineOptions;
    use crate::remote::memory::StaticRemote;
    use crate::store::cache::CacheDir;
    use crate::store::memory::InMemorySnapshotStore;
    use tempfile::TempDir;

    fn engine(dir: &TempDir, remote: StaticRemote) -> SyncEngine<StaticRemote, InMemorySnapshotStore> {
        SyncEngine::open(
            remote,
            InMemorySnapshotStore::new(),
            CacheDir::new(dir.path().join("files")),
            EngineOptions::default(),
        )
    }

    #[test]
    fn clean_sync_is_a_success_message() {
        let dir = TempDir::new().unwrap();
        let remote = StaticRemote::new()
            .with_manifest("A,id-a,Alpha")
            .with_artifact("id-a", b"a");

        let result = run(&engine(&dir, remote)).unwrap();

        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert_eq!(
            result.messages[0].content,
            "Synchronized 1 documents: 1 downloaded, 0 failed"
        );
    }

    #[test]
    fn failed_downloads_are_listed_as_warnings() {
        let dir = TempDir::new().unwrap();
        let remote = StaticRemote::new().with_manifest("A,id-a,Alpha\nB,id-b,Beta");

        let result = run(&engine(&dir, remote)).unwrap();

        let warnings: Vec<_> = result
            .messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
            .collect();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].content.starts_with("Could not download A:"));
        assert!(result.report.unwrap().reconcile.is_some());
    }

    #[test]
    fn unreachable_remote_without_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();

        let result = run(&engine(&dir, StaticRemote::unreachable())).unwrap();

        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(result.messages[0].content.starts_with("Sync failed"));
    }
}
