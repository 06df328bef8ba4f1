//! Two-level directory index for interactive narrowing.
//!
//! Built from record paths only; nothing here is persisted. First-level
//! directories keep first-seen order, children within a directory are
//! sorted.

use crate::model::FileRecord;
use std::collections::BTreeSet;

/// Selector matching every record.
pub const ALL: &str = "ALL";

#[derive(Debug, Default)]
pub struct DirectoryIndex {
    tree: Vec<(String, BTreeSet<String>)>,
}

/// One entry of the filter menu. `value` is the selector to pass to
/// [`filter_records`]; children carry `first/second` selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub value: String,
    pub children: Vec<MenuOption>,
}

impl MenuOption {
    fn leaf(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }
}

impl DirectoryIndex {
    /// Index the first two path segments of every record. A path without a
    /// `/` contributes no entry.
    pub fn build(files: &[FileRecord]) -> Self {
        let mut tree: Vec<(String, BTreeSet<String>)> = Vec::new();
        for file in files {
            let parts: Vec<&str> = file.path.split('/').collect();
            if parts.len() < 2 {
                continue;
            }
            let first = parts[0];
            let idx = match tree.iter().position(|(name, _)| name == first) {
                Some(i) => i,
                None => {
                    tree.push((first.to_string(), BTreeSet::new()));
                    tree.len() - 1
                }
            };
            // A second-level child needs at least three segments.
            if parts.len() > 2 {
                tree[idx].1.insert(parts[1].to_string());
            }
        }
        Self { tree }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Menu options: the ALL entry first, then one option per first-level
    /// directory with its sorted children.
    pub fn menu_options(&self) -> Vec<MenuOption> {
        let mut options = vec![MenuOption::leaf(ALL, ALL)];
        for (first, seconds) in &self.tree {
            let children = seconds
                .iter()
                .map(|second| MenuOption::leaf(second, format!("{}/{}", first, second)))
                .collect();
            options.push(MenuOption {
                label: first.clone(),
                value: first.clone(),
                children,
            });
        }
        options
    }
}

/// Filter records by a menu selector: [`ALL`], a first-level directory, or
/// `first/second`. Two-segment selectors also match a record whose whole
/// path equals the selector.
pub fn filter_records(files: &[FileRecord], selector: &str) -> Vec<FileRecord> {
    if selector == ALL {
        return files.to_vec();
    }
    let prefix = format!("{}/", selector);
    if selector.contains('/') {
        files
            .iter()
            .filter(|f| f.path.starts_with(&prefix) || f.path == selector)
            .cloned()
            .collect()
    } else {
        files
            .iter()
            .filter(|f| f.path.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(path: &str) -> FileRecord {
        FileRecord::new(path, 1, "e")
    }

    #[test]
    fn build_keeps_first_seen_order_and_sorts_children() {
        let files = vec![
            rec("video/b/x.mp4"),
            rec("music/z/a.mp3"),
            rec("video/a/y.mp4"),
            rec("flat.txt"),
        ];
        let index = DirectoryIndex::build(&files);
        let options = index.menu_options();
        assert_eq!(options[0].value, ALL);
        assert_eq!(options[1].value, "video");
        assert_eq!(options[2].value, "music");
        let children: Vec<&str> = options[1]
            .children
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(children, ["video/a", "video/b"]);
    }

    #[test]
    fn two_segment_paths_have_no_children() {
        let index = DirectoryIndex::build(&[rec("dir/file.txt")]);
        let options = index.menu_options();
        assert_eq!(options[1].value, "dir");
        assert!(options[1].children.is_empty());
    }

    #[test]
    fn flat_paths_produce_only_the_all_option() {
        let index = DirectoryIndex::build(&[rec("a.txt"), rec("b.txt")]);
        assert!(index.is_empty());
        assert_eq!(index.menu_options().len(), 1);
    }

    #[test]
    fn filter_all_passes_everything() {
        let files = vec![rec("a/x"), rec("b/y")];
        assert_eq!(filter_records(&files, ALL).len(), 2);
    }

    #[test]
    fn filter_by_first_level_matches_prefix_only() {
        let files = vec![rec("a/x"), rec("ab/y"), rec("a")];
        let out = filter_records(&files, "a");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "a/x");
    }

    #[test]
    fn filter_by_two_levels_includes_exact_match() {
        let files = vec![rec("a/b/x"), rec("a/b"), rec("a/bc/y")];
        let out = filter_records(&files, "a/b");
        let paths: Vec<&str> = out.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a/b/x", "a/b"]);
    }
}
