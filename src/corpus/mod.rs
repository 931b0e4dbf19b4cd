//! Corpus files: discovery, repair, parsing and the document model.

pub mod document;
pub mod fields;
pub mod parse;
pub mod repair;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

pub use document::Document;
pub use fields::{Fragments, Noise, QueryField, QUERYABLE_FIELDS};
pub use parse::{parse_file, ParsedFile};
pub use repair::{repair_file, repaired_path, RepairOutcome};

/// Raw corpus files: names starting with `prefix` and not ending in `suffix`.
pub fn raw_files(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Vec<PathBuf>> {
    list_sorted(dir, |name| name.starts_with(prefix) && !name.ends_with(suffix))
}

/// Repaired corpus files: names starting with `prefix` and ending in `suffix`.
pub fn repaired_files(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Vec<PathBuf>> {
    list_sorted(dir, |name| name.starts_with(prefix) && name.ends_with(suffix))
}

fn list_sorted(dir: &Path, keep: impl Fn(&str) -> bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(&keep) {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read a stopword list, one word per line. Blank lines are ignored.
///
/// A missing or unreadable list is not fatal: indexing continues without
/// custom stopwords.
pub fn read_stopwords(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            warn!("Failed to read stopword list {:?}: {}", path, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_raw_and_repaired_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ap890102", "ap890101", "ap890101.xml", "readme", "stoplist.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("ap89_subdir")).unwrap();

        let raw = raw_files(dir.path(), "ap89", ".xml").unwrap();
        let names: Vec<_> = raw.iter().map(|p| p.file_name().unwrap()).collect();
        assert_eq!(names, ["ap890101", "ap890102"]);

        let repaired = repaired_files(dir.path(), "ap89", ".xml").unwrap();
        assert_eq!(repaired, vec![dir.path().join("ap890101.xml")]);
    }

    #[test]
    fn stopwords_skip_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stoplist.txt");
        fs::write(&path, "a\nabout \n\n  the\n").unwrap();
        assert_eq!(read_stopwords(&path), vec!["a", "about", "the"]);
    }

    #[test]
    fn missing_stopword_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_stopwords(&dir.path().join("nope.txt")).is_empty());
    }
}
