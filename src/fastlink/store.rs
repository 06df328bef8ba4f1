//! Document ownership and persistence.
//!
//! [`RecordStore`] owns one canonical document and keeps its aggregates
//! honest across add/remove/merge. Persistence is plain pretty-printed
//! JSON; loading always runs the document through shape normalization.

use crate::error::{FastLinkError, Result};
use crate::model::{new_document_filename, FileRecord, RecordSet};
use crate::schema;
use crate::sorter;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Owns one document. Not internally synchronized: callers must serialize
/// mutations (single-owner thread or an external mutex).
#[derive(Debug, Default)]
pub struct RecordStore {
    set: Option<RecordSet>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            set: Some(load_set(path)?),
        })
    }

    pub fn from_set(set: RecordSet) -> Self {
        Self { set: Some(set) }
    }

    /// Start an empty document; returns the suggested filename.
    pub fn create_new(&mut self) -> String {
        let mut set = RecordSet::new();
        set.update_totals();
        self.set = Some(set);
        new_document_filename()
    }

    pub fn set(&self) -> Option<&RecordSet> {
        self.set.as_ref()
    }

    pub fn into_set(self) -> Option<RecordSet> {
        self.set
    }

    pub fn records(&self) -> &[FileRecord] {
        self.set
            .as_ref()
            .map(|s| s.files.as_slice())
            .unwrap_or_default()
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        let set = self
            .set
            .as_mut()
            .ok_or_else(|| FastLinkError::Store("no data to save".into()))?;
        set.update_totals();
        save_set(path, set)
    }

    /// Append records whose path is not yet present (first-seen wins),
    /// then re-sort by path and recompute aggregates. Returns the count
    /// actually added.
    pub fn add_files(&mut self, new_files: Vec<FileRecord>) -> usize {
        let Some(set) = self.set.as_mut() else {
            return 0;
        };
        let mut existing: HashSet<String> =
            set.files.iter().map(|f| f.path.clone()).collect();
        let mut added = 0;
        for file in new_files {
            if existing.insert(file.path.clone()) {
                set.files.push(file);
                added += 1;
            }
        }
        sorter::sort_by_path(&mut set.files);
        set.update_totals();
        added
    }

    /// Remove every record whose path is in `paths`. Returns the number of
    /// distinct requested paths, whether or not each one was present.
    pub fn remove_files(&mut self, paths: &[String]) -> usize {
        let Some(set) = self.set.as_mut() else {
            return 0;
        };
        if paths.is_empty() {
            return 0;
        }
        let requested: HashSet<&str> = paths.iter().map(String::as_str).collect();
        set.files.retain(|f| !requested.contains(f.path.as_str()));
        set.update_totals();
        requested.len()
    }

    pub fn get_file_by_path(&self, path: &str) -> Option<&FileRecord> {
        self.records().iter().find(|f| f.path == path)
    }
}

/// Read one document and normalize it to canonical shape.
pub fn load_set(path: &Path) -> Result<RecordSet> {
    if !path.exists() {
        return Err(FastLinkError::Store(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    let doc: serde_json::Value = serde_json::from_str(&content)?;
    schema::normalize(doc)
}

/// Write pretty-printed UTF-8 JSON, creating parent directories as needed.
pub fn save_set(path: &Path, set: &RecordSet) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let content = serde_json::to_string_pretty(set)?;
    fs::write(path, content)?;
    Ok(())
}

/// Merge record sets, first occurrence of a path winning across the whole
/// merge. The result is path-sorted with fresh aggregates; `None` when the
/// merge yields zero files.
pub fn merge_sets(sets: &[RecordSet]) -> (Option<RecordSet>, usize) {
    let mut merged = RecordSet::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut added = 0;
    for set in sets {
        for file in &set.files {
            if seen.insert(file.path.as_str()) {
                merged.files.push(file.clone());
                added += 1;
            }
        }
    }
    if merged.files.is_empty() {
        return (None, 0);
    }
    sorter::sort_by_path(&mut merged.files);
    merged.update_totals();
    (Some(merged), added)
}

/// Merge documents from disk. Inputs that fail to load or validate are
/// skipped, not fatal to the merge.
pub fn merge_paths(paths: &[PathBuf]) -> (Option<RecordSet>, usize) {
    let sets: Vec<RecordSet> = paths.iter().filter_map(|p| load_set(p).ok()).collect();
    merge_sets(&sets)
}

/// Copy a document to `{path}.bak`; returns the backup path.
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(FastLinkError::Store(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let backup = PathBuf::from(format!("{}.bak", path.display()));
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Cheap check that a path names a syntactically valid JSON document.
pub fn is_valid_json_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(FastLinkError::Store(format!(
            "file not found: {}",
            path.display()
        )));
    }
    let is_json_ext = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json_ext {
        return Err(FastLinkError::Format("not a JSON file".into()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str::<serde_json::Value>(&content)?;
    Ok(())
}

/// Non-recursive listing of the JSON documents in a directory.
pub fn json_files_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(path: &str, size: u64) -> FileRecord {
        FileRecord::new(path, size, "e")
    }

    fn store_with(files: Vec<FileRecord>) -> RecordStore {
        let mut set = RecordSet::new();
        set.files = files;
        set.update_totals();
        RecordStore::from_set(set)
    }

    #[test]
    fn add_files_dedups_by_path() {
        let mut store = store_with(vec![]);
        let added = store.add_files(vec![rec("p", 1), rec("p", 2)]);
        assert_eq!(added, 1);
        assert_eq!(store.records().len(), 1);
        // First-seen wins.
        assert_eq!(store.records()[0].size, 1);
    }

    #[test]
    fn add_files_sorts_and_recomputes_totals() {
        let mut store = store_with(vec![rec("b.txt", 5)]);
        store.add_files(vec![rec("a.txt", 3)]);
        assert_eq!(store.records()[0].path, "a.txt");
        let set = store.set().unwrap();
        assert_eq!(set.total_files_count, 2);
        assert_eq!(set.total_size, 8);
    }

    #[test]
    fn remove_files_returns_requested_count() {
        let mut store = store_with(vec![rec("a", 1), rec("b", 2)]);
        // "missing" is absent but still counted.
        let removed = store.remove_files(&["a".into(), "missing".into()]);
        assert_eq!(removed, 2);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.set().unwrap().total_size, 2);
    }

    #[test]
    fn save_requires_data() {
        let mut store = RecordStore::new();
        let err = store.save(Path::new("unused.json")).unwrap_err();
        assert!(err.to_string().contains("no data to save"));
    }

    #[test]
    fn load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/doc.json");
        let mut store = store_with(vec![rec("a.txt", 10)]);
        store.save(&path).unwrap();

        let loaded = RecordStore::load(&path).unwrap();
        assert_eq!(loaded.records(), store.records());
    }

    #[test]
    fn load_missing_file_is_store_error() {
        let err = load_set(Path::new("/nonexistent/doc.json")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn merge_first_occurrence_wins_across_sets() {
        let mut a = RecordSet::new();
        a.files = vec![rec("shared", 1), rec("only-a", 2)];
        let mut b = RecordSet::new();
        b.files = vec![rec("shared", 99), rec("only-b", 3)];

        let (merged, added) = merge_sets(&[a, b]);
        let merged = merged.unwrap();
        assert_eq!(added, 3);
        let shared = merged.files.iter().find(|f| f.path == "shared").unwrap();
        assert_eq!(shared.size, 1);
        assert_eq!(merged.total_files_count, 3);
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert_eq!(merge_sets(&[]).0, None);
        let (merged, added) = merge_paths(&[PathBuf::from("/no/such/file.json")]);
        assert_eq!(merged, None);
        assert_eq!(added, 0);
    }

    #[test]
    fn merge_paths_skips_invalid_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        let mut set = RecordSet::new();
        set.files = vec![rec("a.txt", 4)];
        set.update_totals();
        save_set(&good, &set).unwrap();
        fs::write(&bad, "{ not json").unwrap();

        let (merged, added) = merge_paths(&[bad, good]);
        assert_eq!(added, 1);
        assert_eq!(merged.unwrap().files.len(), 1);
    }

    #[test]
    fn backup_copies_next_to_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "{}").unwrap();
        let bak = backup_file(&path).unwrap();
        assert_eq!(bak, dir.path().join("doc.json.bak"));
        assert!(bak.exists());
    }

    #[test]
    fn json_file_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"{"ok":true}"#).unwrap();
        assert!(is_valid_json_file(&path).is_ok());

        let txt = dir.path().join("doc.txt");
        fs::write(&txt, "{}").unwrap();
        assert!(is_valid_json_file(&txt).is_err());
    }
}
