//! Document-shape detection and normalization.
//!
//! Three JSON shapes are accepted, probed in order: the current FastLink
//! export (`files` plus a version marker), the legacy `list` export, and
//! the strict canonical document. The order is meaning-bearing: a document
//! matching more than one shape takes the first.

use crate::error::{FastLinkError, Result};
use crate::model::{FileRecord, RecordSet};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// `files` list plus `scriptVersion`/`exportVersion`; tolerant, fields
    /// are defaulted and coerced.
    FastLinkNew,
    /// Legacy `{ "list": [...] }` export; converted to a fresh canonical
    /// document, other top-level fields discarded.
    LegacyList,
    /// Strict canonical: `files`/`totalFilesCount`/`totalSize` required,
    /// every entry must carry `path`/`size`/`etag`.
    Canonical,
}

/// Shape a decoded document would be normalized as. `None` for non-objects.
pub fn detect_shape(doc: &Value) -> Option<DocumentShape> {
    doc.as_object().map(shape_of)
}

fn shape_of(obj: &Map<String, Value>) -> DocumentShape {
    let has_files_list = obj.get("files").map(Value::is_array).unwrap_or(false);
    if has_files_list
        && (obj.contains_key("scriptVersion") || obj.contains_key("exportVersion"))
    {
        return DocumentShape::FastLinkNew;
    }
    if obj.get("list").map(Value::is_array).unwrap_or(false) {
        return DocumentShape::LegacyList;
    }
    DocumentShape::Canonical
}

/// Normalize a raw decoded document into the canonical [`RecordSet`], or
/// reject it with a field-specific message.
pub fn normalize(doc: Value) -> Result<RecordSet> {
    let obj = match doc {
        Value::Object(map) => map,
        _ => return Err(FastLinkError::MissingField("files".into())),
    };
    match shape_of(&obj) {
        DocumentShape::FastLinkNew => Ok(normalize_fastlink(obj)),
        DocumentShape::LegacyList => Ok(normalize_legacy(obj)),
        DocumentShape::Canonical => normalize_canonical(obj),
    }
}

fn normalize_fastlink(mut obj: Map<String, Value>) -> RecordSet {
    let raw_files = match obj.remove("files") {
        Some(Value::Array(a)) => a,
        _ => Vec::new(),
    };

    let mut files = Vec::with_capacity(raw_files.len());
    let mut computed_size = 0u64;
    for (i, item) in raw_files.into_iter().enumerate() {
        let Value::Object(mut entry) = item else {
            continue;
        };
        let size = entry.remove("size").map(|v| coerce_size(&v)).unwrap_or(0);
        computed_size += size;
        let name = entry.remove("name").and_then(into_string);
        let path = entry
            .remove("path")
            .and_then(into_string)
            .or_else(|| name.clone())
            .unwrap_or_else(|| format!("未命名文件{}", i + 1));
        let etag = entry
            .remove("etag")
            .and_then(into_string)
            .or_else(|| entry.remove("hash").and_then(into_string))
            .or_else(|| entry.remove("sha1").and_then(into_string))
            .unwrap_or_default();
        files.push(FileRecord {
            path,
            size,
            etag,
            name,
            extra: entry,
        });
    }

    // Aggregates present in the input are kept here; every later mutation
    // recomputes them.
    let total_files_count = obj
        .remove("totalFilesCount")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(files.len());
    let total_size = obj
        .remove("totalSize")
        .map(|v| coerce_size(&v))
        .unwrap_or(computed_size);

    RecordSet {
        script_version: obj.remove("scriptVersion").and_then(into_string),
        export_version: obj.remove("exportVersion").and_then(into_string),
        uses_base62_etags_in_export: obj
            .remove("usesBase62EtagsInExport")
            .and_then(|v| v.as_bool()),
        common_path: obj.remove("commonPath").and_then(into_string),
        total_files_count,
        total_size,
        files,
        extra: obj,
    }
}

fn normalize_legacy(mut obj: Map<String, Value>) -> RecordSet {
    let raw_list = match obj.remove("list") {
        Some(Value::Array(a)) => a,
        _ => Vec::new(),
    };

    let mut files = Vec::with_capacity(raw_list.len());
    for item in raw_list {
        let Value::Object(mut entry) = item else {
            continue;
        };
        // `name` takes precedence; entries with neither name nor path are
        // skipped silently, no placeholder.
        let path = entry
            .remove("name")
            .and_then(into_string)
            .or_else(|| entry.remove("path").and_then(into_string));
        let Some(path) = path else {
            continue;
        };
        let size = entry.remove("size").map(|v| coerce_size(&v)).unwrap_or(0);
        let etag = entry
            .remove("hash")
            .and_then(into_string)
            .or_else(|| entry.remove("sha1").and_then(into_string))
            .unwrap_or_default();
        files.push(FileRecord::new(path, size, etag));
    }

    let mut set = RecordSet {
        files,
        ..RecordSet::default()
    };
    set.update_totals();
    set
}

fn normalize_canonical(obj: Map<String, Value>) -> Result<RecordSet> {
    for field in ["files", "totalFilesCount", "totalSize"] {
        if !obj.contains_key(field) {
            return Err(FastLinkError::MissingField(field.into()));
        }
    }
    let files = &obj["files"];
    let Some(entries) = files.as_array() else {
        return Err(FastLinkError::Format("files must be a list".into()));
    };
    for (i, item) in entries.iter().enumerate() {
        let Some(entry) = item.as_object() else {
            return Err(FastLinkError::FileEntry {
                index: i + 1,
                problem: "must be an object".into(),
            });
        };
        for field in ["path", "size", "etag"] {
            if !entry.contains_key(field) {
                return Err(FastLinkError::FileEntry {
                    index: i + 1,
                    problem: format!("missing required field: {}", field),
                });
            }
        }
    }
    Ok(serde_json::from_value(Value::Object(obj))?)
}

fn coerce_size(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn into_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        _ => None,
    }
}
