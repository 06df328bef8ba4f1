use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One file entry: relative path, byte size and content hash (etag).
///
/// Identity within a document is the exact `path` string, case-sensitive.
/// The etag is opaque; it is never checked against actual content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(deserialize_with = "size_from_int_or_string", default)]
    pub size: u64,
    #[serde(default)]
    pub etag: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, size: u64, etag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            etag: etag.into(),
            name: None,
            extra: Map::new(),
        }
    }

    /// Name shown in listings; falls back to the path.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}

// Exported documents sometimes carry sizes as strings. Coercion failure
// maps to zero rather than rejecting the whole document.
fn size_from_int_or_string<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::Int(n) => n.max(0) as u64,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

/// The canonical document: an ordered record list plus derived aggregates.
///
/// `totalFilesCount` and `totalSize` must be re-derived via
/// [`RecordSet::update_totals`] whenever `files` changes; they are never
/// trusted once records have been mutated. Unknown top-level fields are
/// carried through `extra` so merge/split do not drop caller metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub script_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub export_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub uses_base62_etags_in_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub common_path: Option<String>,
    #[serde(default)]
    pub total_files_count: usize,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derive `totalFilesCount`/`totalSize` from the record list.
    pub fn update_totals(&mut self) {
        self.total_files_count = self.files.len();
        self.total_size = self.files.iter().map(|f| f.size).sum();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Common path with exactly one trailing slash, or empty when unset.
    pub fn common_path_prefix(&self) -> String {
        match self.common_path.as_deref() {
            Some(p) if !p.is_empty() => format!("{}/", p.trim_end_matches('/')),
            _ => String::new(),
        }
    }

    /// Copy of every top-level field except the record list and its
    /// aggregates. Derived display fields are not carried either.
    pub fn metadata_clone(&self) -> RecordSet {
        let mut extra = self.extra.clone();
        extra.remove("formattedTotalSize");
        RecordSet {
            script_version: self.script_version.clone(),
            export_version: self.export_version.clone(),
            uses_base62_etags_in_export: self.uses_base62_etags_in_export,
            common_path: self.common_path.clone(),
            total_files_count: 0,
            total_size: 0,
            files: Vec::new(),
            extra,
        }
    }
}

/// Suggested filename for a freshly created document.
pub fn new_document_filename() -> String {
    format!("123FastLink_{}.json", Local::now().format("%Y%m%d%H%M%S"))
}
