//! Collaborator surface.
//!
//! Everything an interactive front end (desktop window, file dialogs,
//! list widgets) needs lives here; those callers pass in-memory data and
//! file paths and never reach around this module. The functions delegate
//! to the focused modules and add nothing of their own.

use crate::dirindex::DirectoryIndex;
use crate::error::Result;
use crate::model::RecordSet;
use crate::store;
use std::path::{Path, PathBuf};

pub use crate::dirindex::{filter_records, MenuOption, ALL};
pub use crate::link::{generate_link, parse_link, validate_link_format, ParsedLink};
pub use crate::model::FileRecord;
pub use crate::split::{filter_by_extension, split_by_count, split_by_folder};

/// Load and normalize a document from disk.
pub fn load(path: &Path) -> Result<RecordSet> {
    store::load_set(path)
}

/// Persist a document, refreshing its aggregates first.
pub fn save(path: &Path, set: &mut RecordSet) -> Result<()> {
    set.update_totals();
    store::save_set(path, set)
}

/// Merge documents from disk; invalid inputs are skipped. Returns the
/// merged set (or `None` when nothing merged) and the count added.
pub fn merge(paths: &[PathBuf]) -> (Option<RecordSet>, usize) {
    store::merge_paths(paths)
}

/// Build the two-level directory filter index for a document.
pub fn directory_index(set: &RecordSet) -> DirectoryIndex {
    DirectoryIndex::build(&set.files)
}
