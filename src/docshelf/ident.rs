//! Storage identifier extraction.
//!
//! Manifest links come in two shapes: full share links such as
//! `https://drive.google.com/file/d/<id>/view?usp=sharing`, or a bare identifier
//! typed straight into the sheet. Both resolve to the identifier the download
//! endpoint expects.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("link id pattern is valid"));

/// Extracts the storage identifier from a raw link string.
///
/// Returns an empty string for an empty link; callers drop such rows.
pub fn extract_remote_id(link: &str) -> String {
    let link = link.trim();
    match LINK_ID.captures(link) {
        Some(caps) => caps[1].to_string(),
        None => link.to_string(),
    }
}
