use super::print::{print_listing, print_messages, print_paths, print_status, print_text_list};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use docshelf::api::{ConfigAction, ShelfApi, ShelfPaths};
use docshelf::config::{ShelfConfig, CONFIG_KEYS};
use docshelf::engine::SyncEvent;
use docshelf::error::{Result, ShelfError};
use docshelf::remote::http::HttpRemote;
use docshelf::store::snapshot::FileSnapshotStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const HOME_ENV: &str = "DOCSHELF_HOME";
const LOG_ENV: &str = "DOCSHELF_LOG";
const EVENT_POLL: Duration = Duration::from_millis(200);

struct AppContext {
    api: ShelfApi<HttpRemote, FileSnapshotStore>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ctx = init_context()?;

    match cli.command {
        Some(Commands::Sync { quiet }) => handle_sync(&ctx, quiet),
        Some(Commands::List { area, kind }) => handle_list(&ctx, area, kind),
        Some(Commands::Status) => handle_status(&ctx),
        Some(Commands::Path { query, url }) => handle_path(&ctx, query, url),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        Some(Commands::Init) => handle_init(&ctx),
        None => handle_list(&ctx, None, None),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be set when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "docshelf", "docshelf")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ShelfError::Config("Could not determine a data directory".to_string()))
}

fn init_context() -> Result<AppContext> {
    let paths = ShelfPaths::new(data_dir()?);
    debug!(data_dir = %paths.data_dir.display(), "using data directory");
    let config = ShelfConfig::load(&paths.data_dir)?;
    let api = ShelfApi::from_config(paths, &config)?;
    Ok(AppContext { api })
}

fn handle_sync(ctx: &AppContext, quiet: bool) -> Result<()> {
    let events = ctx.api.subscribe();
    let Some(handle) = ctx.api.start_sync() else {
        let result = ctx.api.sync()?;
        print_messages(&result.messages);
        return Ok(());
    };

    let mut bar: Option<ProgressBar> = None;
    loop {
        match events.recv_timeout(EVENT_POLL) {
            Ok(SyncEvent::Progress(p)) if !quiet && p.total > 0 => {
                bar.get_or_insert_with(|| download_bar(p.total as u64))
                    .set_position(p.completed as u64);
            }
            Ok(SyncEvent::Finished(_)) => break,
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) if handle.is_finished() => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let report = handle
        .join()
        .map_err(|_| ShelfError::Api("sync thread panicked".to_string()))?;
    let result = ctx.api.sync_summary(report);
    print_messages(&result.messages);
    Ok(())
}

fn download_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} Downloading [{bar:40.cyan/blue}] {pos}/{len}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

fn handle_list(ctx: &AppContext, area: Option<String>, kind: Option<String>) -> Result<()> {
    let result = ctx.api.browse(area.as_deref(), kind.as_deref())?;
    if let Some(listing) = &result.listing {
        print_listing(listing);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_status(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.status()?;
    if let Some(info) = &result.status {
        print_status(info);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_path(ctx: &AppContext, query: Vec<String>, url: bool) -> Result<()> {
    let result = ctx.api.document_path(&query.join(" "))?;
    print_paths(&result.paths, url);
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            let lines: Vec<String> = CONFIG_KEYS
                .iter()
                .filter_map(|k| config.get(k).ok().map(|v| format!("{} = {}", k, v)))
                .collect();
            print_text_list(&lines, "No configuration values.");
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.init()?;
    print_messages(&result.messages);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_bar_is_sized_to_the_manifest() {
        let bar = download_bar(12);
        bar.set_position(5);
        assert_eq!(bar.length(), Some(12));
        assert_eq!(bar.position(), 5);
    }
}
