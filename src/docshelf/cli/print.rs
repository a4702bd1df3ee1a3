use chrono::{DateTime, Utc};
use colored::Colorize;
use docshelf::api::{CmdMessage, DocumentEntry, Listing, MessageLevel, StatusInfo};
use docshelf::session::SyncStatus;
use std::path::PathBuf;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const COUNT_WIDTH: usize = 6;
const CACHED_MARKER: &str = "●";
const MISSING_MARKER: &str = "○";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_text_list(lines: &[String], empty_message: &str) {
    if lines.is_empty() {
        println!("{}", empty_message.dimmed());
        return;
    }
    for line in lines {
        println!("{}", line);
    }
}

pub(super) fn print_listing(listing: &Listing) {
    match listing {
        Listing::Areas(areas) => print_counts(areas),
        Listing::Types { area, types } => {
            println!("{}", area.bold());
            print_counts(types);
        }
        Listing::Documents {
            area,
            kind,
            documents,
        } => {
            println!("{} / {}", area.bold(), kind.bold());
            for entry in documents {
                println!("{}", format_document(entry));
            }
        }
    }
}

fn print_counts(rows: &[(String, usize)]) {
    let available = LINE_WIDTH.saturating_sub(COUNT_WIDTH + 2);
    for (name, count) in rows {
        let label = truncate_to_width(name, available);
        let padding = available.saturating_sub(label.width());
        let count = format!("{:>width$}", count, width = COUNT_WIDTH);
        println!("  {}{}{}", label, " ".repeat(padding), count.dimmed());
    }
}

fn format_document(entry: &DocumentEntry) -> String {
    let marker = if entry.cached {
        CACHED_MARKER.green()
    } else {
        MISSING_MARKER.dimmed()
    };
    let name = &entry.document.file_name;
    let fixed = 4 + name.width() + 2;
    let title = truncate_to_width(&entry.document.title, LINE_WIDTH.saturating_sub(fixed));
    format!("  {} {}  {}", marker, title, name.dimmed())
}

pub(super) fn print_status(info: &StatusInfo) {
    let status = match info.status {
        SyncStatus::Done => info.status.label().green(),
        SyncStatus::Offline => info.status.label().yellow(),
        SyncStatus::Failed => info.status.label().red(),
        _ => info.status.label().normal(),
    };
    println!("Status:    {}", status);
    println!(
        "Documents: {} in {} areas, {} cached",
        info.documents, info.areas, info.cached
    );
    let saved = info
        .snapshot_saved_at
        .map(format_time_ago)
        .unwrap_or_else(|| "never".to_string());
    println!("Snapshot:  {}", saved);
    println!("Cache:     {}", info.cache_dir.display());
    if let Some(message) = &info.message {
        println!("{}", message.dimmed());
    }
}

pub(super) fn print_paths(paths: &[PathBuf], as_url: bool) {
    for path in paths {
        if as_url {
            println!("file://{}", path.display());
        } else {
            println!("{}", path.display());
        }
    }
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(timestamp);
    match elapsed.to_std() {
        Ok(duration) => Formatter::new().convert(duration),
        Err(_) => "just now".to_string(),
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    let limit = max_width.saturating_sub(1);
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > limit {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_wide_text() {
        let out = truncate_to_width("Área general de planos", 8);
        assert_eq!(out, "Área ge…");
        assert!(out.width() <= 8);
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Plano", 10), "Plano");
    }
}
