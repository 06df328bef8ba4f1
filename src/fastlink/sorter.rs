//! Record ordering: the case-insensitive path order applied after every
//! mutation, and the natural display order used for listings.

use crate::error::Result;
use crate::model::FileRecord;
use crate::store;
use std::path::Path;

/// Stable, case-insensitive path sort.
pub fn sort_by_path(files: &mut [FileRecord]) {
    files.sort_by(|a, b| a.path.to_lowercase().cmp(&b.path.to_lowercase()));
}

pub fn is_sorted_by_path(files: &[FileRecord]) -> bool {
    files
        .windows(2)
        .all(|w| w[0].path.to_lowercase() <= w[1].path.to_lowercase())
}

/// Sort a document on disk, rewriting it only when the order actually
/// changed. Returns whether a rewrite happened.
pub fn sort_file_in_place(path: &Path) -> Result<bool> {
    let mut set = store::load_set(path)?;
    if is_sorted_by_path(&set.files) {
        return Ok(false);
    }
    sort_by_path(&mut set.files);
    set.update_totals();
    store::save_set(path, &set)?;
    Ok(true)
}

/// Display order: records without a subdirectory first, then records with
/// one, each group in natural order of the display name.
pub fn sort_natural(files: &mut [FileRecord]) {
    files.sort_by_cached_key(|f| (f.path.contains('/'), natural_key(f.display_name())));
}

// One comparable piece of a natural-order key. Digit runs compare as
// integers, so "file2" sorts before "file10".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Number(u128),
    Text(String),
}

fn natural_key(s: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut in_digits = false;
    for c in s.chars() {
        let d = c.is_ascii_digit();
        if d != in_digits && !buf.is_empty() {
            chunks.push(make_chunk(std::mem::take(&mut buf), in_digits));
        }
        in_digits = d;
        buf.push(c);
    }
    if !buf.is_empty() {
        chunks.push(make_chunk(buf, in_digits));
    }
    chunks
}

fn make_chunk(s: String, digits: bool) -> Chunk {
    if digits {
        Chunk::Number(s.parse().unwrap_or(u128::MAX))
    } else {
        Chunk::Text(s.to_lowercase())
    }
}
