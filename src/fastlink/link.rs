//! Instant-link codec for the two 123 cloud-drive text formats.
//!
//! `123FSLinkV2` carries one full relative path per entry. `123FLCPV2`
//! factors a shared directory prefix out of the entries to shorten the
//! link. Both use `$` between entries and `#` between an entry's fields,
//! with at most two `#` splits so paths may themselves contain `#`.

use crate::error::{FastLinkError, Result};
use crate::model::FileRecord;
use percent_encoding::percent_decode_str;

pub const FSLINK_TAG: &str = "123FSLinkV2";
pub const FLCP_TAG: &str = "123FLCPV2";

/// Accepts the V2 tag and older `123FSLink` revisions alike.
pub const FSLINK_PREFIX: &str = "123FSLink";

/// Successful parse plus the number of malformed segments dropped along
/// the way. Malformed entries never abort the whole parse.
#[derive(Debug, Default)]
pub struct ParsedLink {
    pub records: Vec<FileRecord>,
    pub skipped: usize,
}

/// Parse a link, dispatching on its tag.
pub fn parse_link(link: &str) -> Result<ParsedLink> {
    if link.is_empty() {
        return Err(FastLinkError::Format("link cannot be empty".into()));
    }
    let parsed = if link.starts_with(FSLINK_PREFIX) {
        parse_fslink(link)
    } else if link.starts_with(FLCP_TAG) {
        parse_flcp(link)?
    } else {
        return Err(FastLinkError::Format(
            "must start with 123FSLink or 123FLCPV2".into(),
        ));
    };
    if parsed.records.is_empty() {
        return Err(FastLinkError::Empty("no valid file info parsed".into()));
    }
    Ok(parsed)
}

fn parse_fslink(link: &str) -> ParsedLink {
    let mut out = ParsedLink::default();
    for part in link.split('$').skip(1) {
        if part.trim().is_empty() {
            continue;
        }
        match extract_file_info(part) {
            Some(mut rec) => {
                rec.path = rec.path.replace('\\', "/").trim().to_string();
                out.records.push(rec);
            }
            None => out.skipped += 1,
        }
    }
    out
}

fn parse_flcp(link: &str) -> Result<ParsedLink> {
    let parts: Vec<&str> = link.split('$').collect();
    if parts.len() < 3 {
        return Err(FastLinkError::Format(
            "invalid FLCPV2 link: missing required parts".into(),
        ));
    }
    // The embedded base path is normalized but not re-joined below: entry
    // names are used as whole record paths. Full paths are reconstructed
    // by callers through generate()'s own common-prefix logic.
    let _base_path = parts[1].replace('\\', "/").trim_matches('/').to_string();

    let mut out = ParsedLink::default();
    for part in &parts[2..] {
        if part.trim().is_empty() {
            continue;
        }
        match extract_file_info(part) {
            Some(mut rec) => {
                // Only the substring after the last `#` survives as the name.
                let name = rec.path.rsplit('#').next().unwrap_or_default().trim();
                let name = percent_decode_str(name).decode_utf8_lossy().into_owned();
                rec.path = name.replace('\\', "/");
                out.records.push(rec);
            }
            None => out.skipped += 1,
        }
    }
    Ok(out)
}

/// Split one `etag#size#path` segment. At most two splits, so the path
/// component may contain `#`. Returns `None` for malformed segments.
pub fn extract_file_info(segment: &str) -> Option<FileRecord> {
    let mut fields = segment.splitn(3, '#');
    let etag = fields.next()?;
    let size = fields.next()?;
    let path = fields.next()?;
    let size: u64 = size.trim().parse().ok()?;
    Some(FileRecord::new(path, size, etag.trim()))
}

/// Generate a link, picking the shorter encoding automatically: FLCP when
/// the records share a directory prefix, FSLink otherwise. Record order in
/// the output follows the input.
pub fn generate_link(records: &[FileRecord]) -> String {
    if records.is_empty() {
        return FSLINK_TAG.to_string();
    }
    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    let common = find_common_dir(&paths);
    if common.is_empty() {
        generate_fslink(records)
    } else {
        generate_flcp(records, &common)
    }
}

fn generate_fslink(records: &[FileRecord]) -> String {
    let mut link = String::from(FSLINK_TAG);
    for rec in records {
        let path = rec.path.replace('\\', "/");
        link.push('$');
        link.push_str(&format!("{}#{}#{}", rec.etag, rec.size, path.trim()));
    }
    link
}

fn generate_flcp(records: &[FileRecord], base: &str) -> String {
    let base = base.replace('\\', "/");
    let base = base.trim_matches('/');
    let mut link = format!("{}${}", FLCP_TAG, base);
    for rec in records {
        let path = rec.path.replace('\\', "/");
        let path = path.trim_matches('/');
        let name = match path.strip_prefix(base) {
            Some(rest) => rest.trim_start_matches('/'),
            None => path,
        };
        link.push('$');
        link.push_str(&format!("{}#{}#{}", rec.etag, rec.size, name));
    }
    link
}

/// Longest shared directory prefix of the given paths. The raw character
/// prefix is trimmed back to the last `/` so only whole segments count;
/// empty when the paths share no directory.
pub fn find_common_dir(paths: &[&str]) -> String {
    if paths.is_empty() {
        return String::new();
    }
    let normalized: Vec<String> = paths
        .iter()
        .map(|p| p.replace('\\', "/").trim_matches('/').to_string())
        .collect();
    let mut common = normalized[0].clone();
    for p in &normalized[1..] {
        let shared = common_prefix_len(&common, p);
        common.truncate(shared);
        if common.is_empty() {
            return String::new();
        }
    }
    match common.rfind('/') {
        Some(i) => common[..i].to_string(),
        None => String::new(),
    }
}

// Byte length of the shared character prefix of two strings.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .take_while(|((_, ca), cb)| ca == cb)
        .last()
        .map(|((i, ca), _)| i + ca.len_utf8())
        .unwrap_or(0)
}

/// Cheap structural check without a full parse, for rejecting obviously
/// bad input on interactive paste. Segments that do not split into three
/// `#` fields (such as the FLCP base path) pass; for those that do, the
/// size field must be all digits.
pub fn validate_link_format(link: &str) -> Result<()> {
    if link.is_empty() {
        return Err(FastLinkError::Format("link cannot be empty".into()));
    }
    if !(link.starts_with(FSLINK_PREFIX) || link.starts_with(FLCP_TAG)) {
        return Err(FastLinkError::Format(
            "must start with 123FSLink or 123FLCPV2".into(),
        ));
    }
    let parts: Vec<&str> = link.split('$').collect();
    if parts.len() < 2 {
        return Err(FastLinkError::Format("missing file info section".into()));
    }
    for part in &parts[1..] {
        if part.is_empty() {
            continue;
        }
        let fields: Vec<&str> = part.splitn(3, '#').collect();
        if fields.len() == 3 {
            let size = fields[1];
            if size.is_empty() || !size.chars().all(|c| c.is_ascii_digit()) {
                return Err(FastLinkError::Format("file size must be a number".into()));
            }
        }
    }
    Ok(())
}
