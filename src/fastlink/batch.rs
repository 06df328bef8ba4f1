//! Batched link ingestion.
//!
//! Interactive callers paste whole pages of links at once; ingesting them
//! runs on whatever worker thread the caller provides. The contract here:
//! fixed-size batches, a cumulative progress report after each batch, a
//! cooperative cancel flag checked between batches (an in-flight batch
//! always completes), and no I/O — callers persist the store exactly once
//! after a successful run.

use crate::error::{FastLinkError, Result};
use crate::link::{self, FLCP_TAG, FSLINK_PREFIX};
use crate::store::RecordStore;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Outcome of one ingestion run. `failures` holds one message per link
/// that could not be parsed; parse failures never abort the run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total_links: usize,
    pub parsed_links: usize,
    pub files_added: usize,
    pub failures: Vec<String>,
    pub cancelled: bool,
}

/// Pull link lines out of free-form pasted text.
pub fn extract_links(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(FSLINK_PREFIX) || line.starts_with(FLCP_TAG))
        .collect()
}

/// Ingest pasted link text into the store, [`DEFAULT_BATCH_SIZE`] links at
/// a time. `progress` receives `(processed, total)` after each batch.
pub fn ingest_links<F>(
    store: &mut RecordStore,
    text: &str,
    cancel: &AtomicBool,
    mut progress: F,
) -> Result<BatchReport>
where
    F: FnMut(usize, usize),
{
    let links = extract_links(text);
    if links.is_empty() {
        return Err(FastLinkError::Empty("no valid links found".into()));
    }

    let mut report = BatchReport {
        total_links: links.len(),
        ..BatchReport::default()
    };
    let mut processed = 0;
    for batch in links.chunks(DEFAULT_BATCH_SIZE) {
        if cancel.load(Ordering::Relaxed) {
            report.cancelled = true;
            return Ok(report);
        }
        for (offset, raw) in batch.iter().enumerate() {
            match link::parse_link(raw) {
                Ok(parsed) => {
                    report.parsed_links += 1;
                    report.files_added += store.add_files(parsed.records);
                }
                Err(e) => report
                    .failures
                    .push(format!("link {}: {}", processed + offset + 1, e)),
            }
        }
        processed += batch.len();
        progress(processed, report.total_links);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordSet;

    fn empty_store() -> RecordStore {
        let mut set = RecordSet::new();
        set.update_totals();
        RecordStore::from_set(set)
    }

    #[test]
    fn extract_ignores_non_link_lines() {
        let text = "notes\n123FSLinkV2$E#1#a.txt\n\n  123FLCPV2$d$E#1#b\nmore";
        assert_eq!(extract_links(text).len(), 2);
    }

    #[test]
    fn ingest_adds_files_and_counts_failures() {
        let mut store = empty_store();
        let text = "123FSLinkV2$E1#1#a.txt\n123FSLinkV2$broken\n123FSLinkV2$E2#2#b.txt";
        let cancel = AtomicBool::new(false);
        let report = ingest_links(&mut store, text, &cancel, |_, _| {}).unwrap();

        assert_eq!(report.total_links, 3);
        assert_eq!(report.parsed_links, 2);
        assert_eq!(report.files_added, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].starts_with("link 2:"));
        assert_eq!(store.records().len(), 2);
    }

    #[test]
    fn ingest_dedups_across_links() {
        let mut store = empty_store();
        let text = "123FSLinkV2$E1#1#same.txt\n123FSLinkV2$E2#2#same.txt";
        let cancel = AtomicBool::new(false);
        let report = ingest_links(&mut store, text, &cancel, |_, _| {}).unwrap();
        assert_eq!(report.files_added, 1);
    }

    #[test]
    fn ingest_reports_cumulative_progress() {
        let mut store = empty_store();
        let text = (0..250)
            .map(|i| format!("123FSLinkV2$E#1#f{}.txt", i))
            .collect::<Vec<_>>()
            .join("\n");
        let cancel = AtomicBool::new(false);
        let mut seen = Vec::new();
        ingest_links(&mut store, &text, &cancel, |done, total| {
            seen.push((done, total))
        })
        .unwrap();
        assert_eq!(seen, [(100, 250), (200, 250), (250, 250)]);
    }

    #[test]
    fn cancel_flag_stops_before_next_batch() {
        let mut store = empty_store();
        let text = "123FSLinkV2$E#1#a.txt";
        let cancel = AtomicBool::new(true);
        let report = ingest_links(&mut store, text, &cancel, |_, _| {}).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.files_added, 0);
    }

    #[test]
    fn no_links_is_empty_result() {
        let mut store = empty_store();
        let cancel = AtomicBool::new(false);
        let err = ingest_links(&mut store, "nothing here", &cancel, |_, _| {}).unwrap_err();
        assert!(err.is_empty_result());
    }
}
