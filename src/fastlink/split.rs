//! Partitioning a document into bounded chunks for export, plus the
//! structure analysis backing the `info` command.
//!
//! Both split strategies guarantee that recombining every chunk's records
//! (with their respective `commonPath`) reconstructs the original
//! full-path set exactly: nothing dropped, nothing duplicated.

use crate::error::{FastLinkError, Result};
use crate::model::{FileRecord, RecordSet};
use std::collections::HashMap;

/// Group key for records whose directory depth is shorter than the
/// requested folder level.
pub const ROOT_GROUP: &str = "_root_";

/// Drop every record whose final dot-suffix (case-insensitive, given
/// without the dot) is in `excluded`. Records without a `.` always pass.
pub fn filter_by_extension(set: &RecordSet, excluded: &[String]) -> RecordSet {
    if excluded.is_empty() {
        return set.clone();
    }
    let excluded: Vec<String> = excluded.iter().map(|e| e.to_lowercase()).collect();
    let mut out = set.clone();
    out.files.retain(|f| match f.path.rsplit_once('.') {
        Some((_, ext)) => !excluded.contains(&ext.to_lowercase()),
        None => true,
    });
    out.update_totals();
    out
}

/// Split into chunks of at most `chunk_size` files, in original order.
/// Each chunk carries the document's top-level metadata and fresh
/// aggregates for its slice.
pub fn split_by_count(set: &RecordSet, chunk_size: usize) -> Result<Vec<RecordSet>> {
    if chunk_size == 0 {
        return Err(FastLinkError::InvalidInput(
            "chunk size must be a positive integer".into(),
        ));
    }
    let mut chunks = Vec::new();
    for slice in set.files.chunks(chunk_size) {
        let mut chunk = set.metadata_clone();
        chunk.files = slice.to_vec();
        chunk.update_totals();
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Split by the first `level` segments of each record's full directory
/// path (`commonPath` + `path`, filename excluded). Records too shallow
/// for the level land in the reserved [`ROOT_GROUP`] chunk, which keeps
/// the original `commonPath`; every other chunk gets the group key as its
/// new `commonPath` and member paths rewritten relative to it. Chunk order
/// is first-encounter order.
pub fn split_by_folder(set: &RecordSet, level: usize) -> Result<Vec<RecordSet>> {
    if level == 0 {
        return Err(FastLinkError::InvalidInput(
            "folder level must be a positive integer".into(),
        ));
    }
    let prefix = set.common_path_prefix();

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<FileRecord>> = HashMap::new();
    for file in &set.files {
        let full_path = format!("{}{}", prefix, file.path);
        let parts: Vec<&str> = full_path.split('/').filter(|p| !p.is_empty()).collect();
        let dir_parts = &parts[..parts.len().saturating_sub(1)];
        let key = if dir_parts.len() >= level {
            dir_parts[..level].join("/")
        } else {
            ROOT_GROUP.to_string()
        };
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(file.clone());
    }

    let mut chunks = Vec::new();
    for key in order {
        let group = groups.remove(&key).unwrap_or_default();
        let mut chunk = set.metadata_clone();
        if key == ROOT_GROUP {
            chunk.common_path = Some(prefix.clone());
            chunk.files = group;
        } else {
            chunk.common_path = Some(format!("{}/", key));
            chunk.files = group
                .into_iter()
                .map(|mut f| {
                    let full_path = format!("{}{}", prefix, f.path);
                    f.path = full_path
                        .get(key.len()..)
                        .unwrap_or("")
                        .trim_start_matches('/')
                        .to_string();
                    f
                })
                .collect();
        }
        chunk.update_totals();
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Summary of a document's directory layout.
#[derive(Debug)]
pub struct StructureReport {
    pub file_count: usize,
    pub total_size: u64,
    pub max_depth: usize,
    pub tree: String,
}

/// Walk every full path and render an insertion-ordered directory tree
/// with per-entry depth annotations.
pub fn analyze_structure(set: &RecordSet) -> StructureReport {
    #[derive(Default)]
    struct Node {
        children: Vec<(String, Node)>,
        is_file: bool,
    }

    fn child_mut<'a>(node: &'a mut Node, name: &str) -> &'a mut Node {
        if let Some(i) = node.children.iter().position(|(n, _)| n == name) {
            &mut node.children[i].1
        } else {
            node.children.push((name.to_string(), Node::default()));
            let last = node.children.len() - 1;
            &mut node.children[last].1
        }
    }

    fn render(node: &Node, prefix: &str, depth: usize, out: &mut String) {
        let count = node.children.len();
        for (i, (name, child)) in node.children.iter().enumerate() {
            let is_last = i == count - 1;
            let connector = if is_last { "└── " } else { "├── " };
            let icon = if child.is_file { "📄 " } else { "📁 " };
            out.push_str(prefix);
            out.push_str(connector);
            out.push_str(icon);
            out.push_str(name);
            out.push_str(&format!("  (Lv. {})\n", depth));
            if !child.is_file {
                let next = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                render(child, &next, depth + 1, out);
            }
        }
    }

    let prefix = set.common_path_prefix();
    let mut root = Node::default();
    let mut max_depth = 0;
    for file in &set.files {
        let full_path = format!("{}{}", prefix, file.path);
        let parts: Vec<&str> = full_path.split('/').filter(|p| !p.is_empty()).collect();
        max_depth = max_depth.max(parts.len());
        let mut current = &mut root;
        for (i, part) in parts.iter().enumerate() {
            current = child_mut(current, part);
            if i == parts.len() - 1 {
                current.is_file = true;
            }
        }
    }

    let mut tree = String::new();
    render(&root, "", 1, &mut tree);

    StructureReport {
        file_count: set.files.len(),
        total_size: set.files.iter().map(|f| f.size).sum(),
        max_depth,
        tree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(path: &str, size: u64) -> FileRecord {
        FileRecord::new(path, size, "e")
    }

    fn set_with(common_path: Option<&str>, files: Vec<FileRecord>) -> RecordSet {
        let mut set = RecordSet::new();
        set.common_path = common_path.map(String::from);
        set.files = files;
        set.update_totals();
        set
    }

    // Every chunk's commonPath + path, for reconstruction checks.
    fn full_paths(chunks: &[RecordSet]) -> Vec<String> {
        let mut paths: Vec<String> = chunks
            .iter()
            .flat_map(|c| {
                let prefix = c.common_path_prefix();
                c.files
                    .iter()
                    .map(move |f| format!("{}{}", prefix, f.path))
            })
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn filter_drops_matching_extensions() {
        let set = set_with(
            None,
            vec![rec("a.TXT", 1), rec("b.jpg", 2), rec("noext", 3)],
        );
        let filtered = filter_by_extension(&set, &["txt".into()]);
        let paths: Vec<&str> = filtered.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["b.jpg", "noext"]);
        assert_eq!(filtered.total_size, 5);
    }

    #[test]
    fn split_by_count_rejects_zero() {
        let set = set_with(None, vec![rec("a", 1)]);
        assert!(split_by_count(&set, 0).is_err());
    }

    #[test]
    fn split_by_count_reconstructs_original_order() {
        let files: Vec<FileRecord> =
            (0..7).map(|i| rec(&format!("f{}", i), i as u64)).collect();
        let set = set_with(None, files.clone());
        let chunks = split_by_count(&set, 3).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].files.len(), 3);
        assert_eq!(chunks[2].files.len(), 1);
        let rejoined: Vec<FileRecord> =
            chunks.iter().flat_map(|c| c.files.clone()).collect();
        assert_eq!(rejoined, files);
        for chunk in &chunks {
            assert_eq!(chunk.total_files_count, chunk.files.len());
        }
    }

    #[test]
    fn split_by_count_carries_metadata_without_derived_fields() {
        let mut set = set_with(Some("base"), vec![rec("a", 1)]);
        set.script_version = Some("1.0.1".into());
        set.extra
            .insert("formattedTotalSize".into(), "1 B".into());
        let chunks = split_by_count(&set, 1).unwrap();
        assert_eq!(chunks[0].script_version.as_deref(), Some("1.0.1"));
        assert_eq!(chunks[0].common_path.as_deref(), Some("base"));
        assert!(!chunks[0].extra.contains_key("formattedTotalSize"));
    }

    #[test]
    fn split_by_folder_groups_and_rewrites_paths() {
        let set = set_with(
            None,
            vec![
                rec("music/rock/a.mp3", 1),
                rec("music/jazz/b.mp3", 2),
                rec("video/c.mp4", 3),
                rec("top.txt", 4),
            ],
        );
        let chunks = split_by_folder(&set, 1).unwrap();
        // First-encounter order: music, video, _root_.
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].common_path.as_deref(), Some("music/"));
        let paths: Vec<&str> = chunks[0].files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["rock/a.mp3", "jazz/b.mp3"]);
        assert_eq!(chunks[1].common_path.as_deref(), Some("video/"));
        // Too shallow for level 1: the root group keeps the original prefix.
        assert_eq!(chunks[2].common_path.as_deref(), Some(""));
        assert_eq!(chunks[2].files[0].path, "top.txt");
    }

    #[test]
    fn split_by_folder_respects_existing_common_path() {
        let set = set_with(
            Some("base"),
            vec![rec("sub/a.txt", 1), rec("b.txt", 2)],
        );
        let chunks = split_by_folder(&set, 2).unwrap();
        // Full paths are base/sub/a.txt (dir depth 2) and base/b.txt
        // (dir depth 1 -> root group).
        assert_eq!(chunks[0].common_path.as_deref(), Some("base/sub/"));
        assert_eq!(chunks[0].files[0].path, "a.txt");
        assert_eq!(chunks[1].common_path.as_deref(), Some("base/"));
        assert_eq!(chunks[1].files[0].path, "b.txt");
    }

    #[test]
    fn split_by_folder_reconstructs_full_path_multiset() {
        let set = set_with(
            Some("base"),
            vec![
                rec("x/a.txt", 1),
                rec("x/deep/b.txt", 2),
                rec("y/c.txt", 3),
                rec("d.txt", 4),
            ],
        );
        let original = full_paths(std::slice::from_ref(&set));
        for level in 1..=3 {
            let chunks = split_by_folder(&set, level).unwrap();
            assert_eq!(full_paths(&chunks), original, "level {}", level);
            let total: usize = chunks.iter().map(|c| c.files.len()).sum();
            assert_eq!(total, set.files.len());
        }
    }

    #[test]
    fn split_by_folder_rejects_zero() {
        let set = set_with(None, vec![rec("a", 1)]);
        assert!(split_by_folder(&set, 0).is_err());
    }

    #[test]
    fn analyze_reports_depth_and_tree() {
        let set = set_with(None, vec![rec("dir/sub/a.txt", 5), rec("b.txt", 1)]);
        let report = analyze_structure(&set);
        assert_eq!(report.file_count, 2);
        assert_eq!(report.total_size, 6);
        assert_eq!(report.max_depth, 3);
        assert!(report.tree.contains("📁 dir  (Lv. 1)"));
        assert!(report.tree.contains("📄 a.txt  (Lv. 3)"));
        assert!(report.tree.contains("📄 b.txt  (Lv. 1)"));
    }
}
