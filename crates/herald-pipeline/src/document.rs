//! Document paths and discovery.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{NaiveDate, NaiveDateTime};

/// Canonical path of the document for `date`: `root/YYYY/MM/YYYYMMDD.md`.
pub fn today_path(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(date.format("%Y").to_string())
        .join(date.format("%m").to_string())
        .join(format!("{}.md", date.format("%Y%m%d")))
}

/// Most recently modified Markdown file under `root`.
///
/// Searches recursively, skipping hidden files and directories. Returns
/// `None` if the root does not exist or holds no Markdown.
pub fn latest_markdown(root: &Path) -> Option<PathBuf> {
    let mut latest = None;
    if root.is_dir() {
        scan_directory(root, &mut latest);
    }
    latest.map(|(_, path)| path)
}

fn scan_directory(dir: &Path, latest: &mut Option<(SystemTime, PathBuf)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            scan_directory(&path, latest);
        } else if path.extension().is_some_and(|e| e == "md") {
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if latest.as_ref().is_none_or(|(best, _)| modified > *best) {
                *latest = Some((modified, path));
            }
        }
    }
}

/// Hosted document title: `{prefix}_{file stem}_{YYYYmmdd_HHMMSS}`.
pub fn document_title(prefix: &str, path: &Path, now: NaiveDateTime) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{prefix}_{stem}_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Path shown to users and used in commit messages: relative to `base` when
/// possible, with forward slashes.
pub fn display_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}
