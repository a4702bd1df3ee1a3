//! # Manifest Parsing
//!
//! The manifest is a published spreadsheet exported as comma-separated text
//! with three positional columns:
//!
//! ```text
//! file token , link or bare identifier , display title
//! ```
//!
//! There are no reliable column names. The sheet's own caption row is
//! recognised by a sentinel substring in the first column and skipped
//! wherever it appears. Row-level problems never fail the parse: short rows
//! read as empty fields, rows without a usable token or identifier are
//! dropped. Only a payload that is not a manifest at all (an HTML page served
//! in its place) is an error.

use crate::classify::classify;
use crate::error::{Result, ShelfError};
use crate::ident::extract_remote_id;
use crate::model::DocumentRecord;
use crate::store::cache::CacheDir;
use tracing::{debug, warn};

pub const DEFAULT_HEADER_SENTINEL: &str = "nombre";

const NOT_AVAILABLE_MARKERS: &[&str] = &["#N/A", "N/A"];

/// A raw manifest row, addressed positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRow {
    pub file_token: String,
    pub link: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Lower-case substring identifying the caption row.
    pub header_sentinel: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_sentinel: DEFAULT_HEADER_SENTINEL.to_string(),
        }
    }
}

/// Splits the payload into positional rows, preserving order.
pub fn read_rows(text: &str) -> Result<Vec<ManifestRow>> {
    let text = text.trim_start_matches('\u{feff}');
    if looks_like_html(text) {
        return Err(ShelfError::ManifestParse(
            "received an HTML page instead of a comma-separated manifest".to_string(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 1, error = %e, "unreadable manifest row, treating as empty");
                rows.push(ManifestRow::default());
                continue;
            }
        };
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push(ManifestRow {
            file_token: field(0),
            link: field(1),
            title: field(2),
        });
    }
    Ok(rows)
}

/// Parses a manifest payload into classified document records, in manifest
/// order, with cache paths resolved against `cache`.
pub fn parse_manifest(
    text: &str,
    options: &ParseOptions,
    cache: &CacheDir,
) -> Result<Vec<DocumentRecord>> {
    let rows = read_rows(text)?;
    let sentinel = options.header_sentinel.to_lowercase();

    let documents: Vec<DocumentRecord> = rows
        .into_iter()
        .filter_map(|row| row_to_record(row, &sentinel, cache))
        .collect();

    debug!(documents = documents.len(), "manifest parsed");
    Ok(documents)
}

fn row_to_record(row: ManifestRow, sentinel: &str, cache: &CacheDir) -> Option<DocumentRecord> {
    let file_name = row.file_token.trim();
    if file_name.is_empty() {
        return None;
    }
    if !sentinel.is_empty() && file_name.to_lowercase().contains(sentinel) {
        return None;
    }

    let remote_id = extract_remote_id(&row.link);
    if remote_id.is_empty() {
        debug!(file_name, "dropping row without a storage identifier");
        return None;
    }

    let title = display_title(&row.title, file_name);
    let (area, kind) = classify(file_name);
    Some(
        DocumentRecord::new(remote_id, title, file_name)
            .with_classification(area, kind)
            .with_local_path(cache.local_path(file_name)),
    )
}

fn display_title(raw: &str, file_name: &str) -> String {
    let title = raw.trim();
    let unavailable = NOT_AVAILABLE_MARKERS
        .iter()
        .any(|m| title.eq_ignore_ascii_case(m));
    if title.is_empty() || unavailable {
        file_name.to_string()
    } else {
        title.to_string()
    }
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.trim_start().chars().take(15).collect();
    let head = head.to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
