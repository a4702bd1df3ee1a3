use crate::commands::{CmdMessage, CmdResult, ShelfPaths};
use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError};
use std::fs;

/// Creates the data and cache folders and writes a default config if none
/// exists yet.
pub fn run(paths: &ShelfPaths) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    fs::create_dir_all(paths.cache_dir()).map_err(ShelfError::Io)?;

    let config_exists = paths.data_dir.join("config.json").exists();
    if !config_exists {
        ShelfConfig::default().save(&paths.data_dir)?;
    }

    result.add_message(CmdMessage::success(format!(
        "Initialized docshelf at {}",
        paths.data_dir.display()
    )));
    if ShelfConfig::load(&paths.data_dir)?.manifest_url.is_none() {
        result.add_message(CmdMessage::info(
            "Set the manifest with: docshelf config manifest-url <url>",
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_layout_and_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let paths = ShelfPaths::new(dir.path().join("shelf"));
        let mut config = ShelfConfig::default();
        config.workers = 3;
        config.save(&paths.data_dir).unwrap();

        run(&paths).unwrap();

        assert!(paths.cache_dir().is_dir());
        assert_eq!(ShelfConfig::load(&paths.data_dir).unwrap().workers, 3);
    }

    #[test]
    fn fresh_init_asks_for_manifest_url() {
        let dir = TempDir::new().unwrap();
        let paths = ShelfPaths::new(dir.path().to_path_buf());
        let result = run(&paths).unwrap();
        assert_eq!(result.messages.len(), 2);
    }
}
