use crate::error::{ShelfError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const EMPTY_NAME: &str = "_";
const PARTIAL_PREFIX: &str = ".part-";
const PARTIAL_SUFFIX: &str = ".tmp";

/// The local artifact cache: a single folder holding one file per manifest
/// file token.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
    file_ext: String,
}

impl CacheDir {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            file_ext: ".pdf".to_string(),
        }
    }

    /// Sets the cache file extension. A blank extension keeps the current one.
    pub fn with_file_ext(mut self, ext: &str) -> Self {
        if let Some(ext) = normalize_file_ext(ext) {
            self.file_ext = ext;
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    /// Creates the cache folder if it does not exist yet and clears partial
    /// downloads left behind by an interrupted run.
    pub fn ensure(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(ShelfError::Io)?;
            return Ok(());
        }
        self.sweep_partials();
        Ok(())
    }

    fn sweep_partials(&self) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            if !is_partial_name(&name.to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed stale partial download"),
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove partial download"),
            }
        }
    }

    /// Where the artifact for `file_name` lives. Pure function of the file
    /// token and the cache configuration, so lookups are stable across runs.
    pub fn local_path(&self, file_name: &str) -> PathBuf {
        self.root.join(self.cache_file_name(file_name))
    }

    fn cache_file_name(&self, file_name: &str) -> String {
        let mut name = sanitize_file_name(file_name);
        let has_ext = name
            .to_lowercase()
            .ends_with(&self.file_ext.to_lowercase());
        if !has_ext {
            name.push_str(&self.file_ext);
        }
        name
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Writes `bytes` to `path` through a temporary sibling and a rename, so
    /// an interrupted write never leaves a file that looks cached.
    pub fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path.parent().unwrap_or(&self.root);
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(ShelfError::Io)?;
        }

        let tmp = dir.join(format!("{}{}{}", PARTIAL_PREFIX, Uuid::new_v4(), PARTIAL_SUFFIX));
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&tmp, path));

        if let Err(e) = written {
            debug!(path = %tmp.display(), "removing partial download");
            let _ = fs::remove_file(&tmp);
            return Err(ShelfError::Io(e));
        }
        Ok(())
    }
}

/// `".pdf"` for `"pdf"`, `".pdf"` or `"..pdf"`; `None` when nothing is left.
pub fn normalize_file_ext(ext: &str) -> Option<String> {
    let bare = ext.trim().trim_start_matches('.');
    if bare.is_empty() {
        None
    } else {
        Some(format!(".{}", bare))
    }
}

fn is_partial_name(name: &str) -> bool {
    name.starts_with(PARTIAL_PREFIX) && name.ends_with(PARTIAL_SUFFIX)
}

/// Strips characters that are illegal in file names on common platforms.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').to_string();
    if cleaned.is_empty() {
        EMPTY_NAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn local_path_appends_extension() {
        let cache = CacheDir::new(PathBuf::from("files"));
        assert_eq!(
            cache.local_path("PROY-2044_DW_01"),
            PathBuf::from("files/PROY-2044_DW_01.pdf")
        );
    }

    #[test]
    fn local_path_keeps_existing_extension_any_case() {
        let cache = CacheDir::new(PathBuf::from("files"));
        assert_eq!(
            cache.local_path("plan.PDF"),
            PathBuf::from("files/plan.PDF")
        );
    }

    #[test]
    fn local_path_is_idempotent() {
        let cache = CacheDir::new(PathBuf::from("files"));
        let name = "A:B/C*D?.pdf";
        assert_eq!(cache.local_path(name), cache.local_path(name));
        assert_eq!(cache.local_path(name), PathBuf::from("files/ABCD.pdf"));
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_file_name("???"), "_");
        assert_eq!(sanitize_file_name(" name. "), "name");
    }

    #[test]
    fn custom_extension_is_normalized() {
        let cache = CacheDir::new(PathBuf::from("files")).with_file_ext("dwg");
        assert_eq!(cache.file_ext(), ".dwg");
        assert_eq!(cache.local_path("x"), PathBuf::from("files/x.dwg"));
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().join("files"));
        let path = cache.local_path("doc");

        cache.write_atomic(&path, b"%PDF-1.4").unwrap();

        assert!(cache.is_cached(&path));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");
        for entry in fs::read_dir(cache.root()).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(!name.to_string_lossy().ends_with(".tmp"));
        }
    }

    #[test]
    fn blank_extension_keeps_default() {
        let cache = CacheDir::new(PathBuf::from("files")).with_file_ext(" ");
        assert_eq!(cache.file_ext(), ".pdf");
        assert_eq!(cache.local_path("DOC"), PathBuf::from("files/DOC.pdf"));
        assert_eq!(normalize_file_ext("."), None);
        assert_eq!(normalize_file_ext("..dwg").as_deref(), Some(".dwg"));
    }

    #[test]
    fn failed_rename_leaves_nothing_that_looks_cached() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().join("files"));
        cache.ensure().unwrap();
        let path = cache.local_path("doc");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let result = cache.write_atomic(&path, b"%PDF-1.4");

        assert!(result.is_err());
        assert!(!cache.is_cached(&path));
        let partials = fs::read_dir(cache.root())
            .unwrap()
            .filter(|e| is_partial_name(&e.as_ref().unwrap().file_name().to_string_lossy()))
            .count();
        assert_eq!(partials, 0);
    }

    #[test]
    fn ensure_sweeps_stale_partial_downloads() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().join("files"));
        cache.ensure().unwrap();
        let stale = cache.root().join(".part-1234.tmp");
        let kept = cache.local_path("doc");
        fs::write(&stale, b"half").unwrap();
        fs::write(&kept, b"%PDF").unwrap();

        cache.ensure().unwrap();

        assert!(!stale.exists());
        assert!(kept.is_file());
    }

    #[test]
    fn ensure_creates_missing_folder() {
        let dir = TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path().join("nested").join("files"));
        cache.ensure().unwrap();
        assert!(cache.root().is_dir());
    }
}
