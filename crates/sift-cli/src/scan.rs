//! Discovery of recently modified text files.

use crate::error::{CliError, Result};
use sift_domain::ExtractedDocument;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Extensions treated as plain text.
pub const TEXT_EXTENSIONS: [&str; 9] = [
    "txt", "md", "markdown", "rst", "text", "log", "org", "adoc", "csv",
];

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Discovery filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Only files modified within this many days
    pub days: u64,
    /// Larger files are skipped
    pub max_file_bytes: u64,
    /// Keep at most this many documents, newest first
    pub limit: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            days: 7,
            max_file_bytes: 1_048_576,
            limit: None,
        }
    }
}

/// Scan `root` for recent text files.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<Vec<ExtractedDocument>> {
    scan_directory_at(root, options, SystemTime::now())
}

/// Scan `root` as if the current time were `now`.
///
/// Unreadable or non-UTF-8 files are skipped with a warning. Results are
/// sorted newest first, ties broken by path.
pub fn scan_directory_at(
    root: &Path,
    options: &ScanOptions,
    now: SystemTime,
) -> Result<Vec<ExtractedDocument>> {
    if !root.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let cutoff = now
        .checked_sub(Duration::from_secs(options.days.saturating_mul(SECONDS_PER_DAY)))
        .unwrap_or(UNIX_EPOCH);

    let mut documents = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_text_extension(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %rel_str, error = %e, "Skipping file without metadata");
                continue;
            }
        };
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        if modified < cutoff {
            continue;
        }
        if metadata.len() > options.max_file_bytes {
            debug!(path = %rel_str, bytes = metadata.len(), "Skipping large file");
            continue;
        }

        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %rel_str, error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let modified_secs = modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        documents.push(ExtractedDocument::new(rel_str, content).with_modified_at(modified_secs));
    }

    documents.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.path.cmp(&b.path))
    });
    if let Some(limit) = options.limit {
        documents.truncate(limit);
    }

    info!(root = %root.display(), documents = documents.len(), "Scanned directory");
    Ok(documents)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(SECONDS_PER_DAY);

    fn write(dir: &TempDir, rel: &str, content: &[u8], age: Duration) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    fn paths(docs: &[ExtractedDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_finds_recent_text_files_newest_first() {
        let dir = TempDir::new().unwrap();
        write(&dir, "old.md", b"old", DAY * 30);
        write(&dir, "notes/today.md", b"today", Duration::from_secs(60));
        write(&dir, "yesterday.txt", b"yesterday", DAY);
        write(&dir, "image.png", b"binary", Duration::from_secs(60));

        let docs = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(paths(&docs), vec!["notes/today.md", "yesterday.txt"]);
        assert_eq!(docs[0].content, "today");
        assert_eq!(docs[0].doc_type, "md");
    }

    #[test]
    fn test_skips_hidden_large_and_non_utf8() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".hidden.md", b"secret", Duration::ZERO);
        write(&dir, ".git/notes.md", b"internal", Duration::ZERO);
        write(&dir, "big.txt", &[b'x'; 64], Duration::ZERO);
        write(&dir, "latin1.txt", &[0xff, 0xfe, 0x41], Duration::ZERO);
        write(&dir, "ok.txt", b"fine", Duration::ZERO);

        let options = ScanOptions {
            max_file_bytes: 32,
            ..ScanOptions::default()
        };
        let docs = scan_directory(dir.path(), &options).unwrap();
        assert_eq!(paths(&docs), vec!["ok.txt"]);
    }

    #[test]
    fn test_limit_and_time_window() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.md", b"a", DAY);
        write(&dir, "b.md", b"b", DAY * 2);
        write(&dir, "c.md", b"c", DAY * 3);

        let limited = ScanOptions {
            limit: Some(2),
            ..ScanOptions::default()
        };
        assert_eq!(paths(&scan_directory(dir.path(), &limited).unwrap()), vec!["a.md", "b.md"]);

        let future = SystemTime::now() + DAY * 30;
        assert!(scan_directory_at(dir.path(), &ScanOptions::default(), future)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            scan_directory(&missing, &ScanOptions::default()),
            Err(CliError::InvalidInput(_))
        ));
    }
}
