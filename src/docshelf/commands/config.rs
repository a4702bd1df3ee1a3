use crate::commands::{CmdMessage, CmdResult, ShelfPaths};
use crate::config::ShelfConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(paths: &ShelfPaths, action: ConfigAction) -> Result<CmdResult> {
    let mut config = ShelfConfig::load(&paths.data_dir)?;
    let mut result = CmdResult::default();

    match action {
        ConfigAction::ShowAll => {}
        ConfigAction::ShowKey(key) => {
            let value = config.get(&key)?;
            result.add_message(CmdMessage::info(format!("{} = {}", key, value)));
            return Ok(result);
        }
        ConfigAction::Set(key, value) => {
            config.set(&key, &value)?;
            config.save(&paths.data_dir)?;
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key,
                config.get(&key)?
            )));
        }
    }

    Ok(result.with_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_persists_value() {
        let dir = TempDir::new().unwrap();
        let paths = ShelfPaths::new(dir.path().to_path_buf());

        run(
            &paths,
            ConfigAction::Set("manifest-url".into(), "https://example.com/m.csv".into()),
        )
        .unwrap();

        let result = run(&paths, ConfigAction::ShowAll).unwrap();
        assert_eq!(
            result.config.unwrap().manifest_url.as_deref(),
            Some("https://example.com/m.csv")
        );
    }

    #[test]
    fn show_key_reports_value() {
        let dir = TempDir::new().unwrap();
        let paths = ShelfPaths::new(dir.path().to_path_buf());
        let result = run(&paths, ConfigAction::ShowKey("file-ext".into())).unwrap();
        assert_eq!(result.messages[0].content, "file-ext = .pdf");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let paths = ShelfPaths::new(dir.path().to_path_buf());
        assert!(run(&paths, ConfigAction::Set("nope".into(), "1".into())).is_err());
    }
}
