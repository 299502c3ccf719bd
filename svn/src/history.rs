//! Per-file revision history queries and interactive listing helpers.

use crate::provider::{VcsClient, VcsResult};
use crate::types::{HistoryPickItem, LogEntry, Revision, RevisionReference};
use std::sync::Arc;
use tracing::debug;

/// Retrieves and paginates per-file history.
///
/// Stateless across calls: every query goes back to the tool, and the
/// browser remembers nothing about prior limits. The escalation protocol is
/// the caller's: when a finite limit comes back saturated, re-invoke with
/// `limit = None` to fetch the full history.
pub struct HistoryBrowser {
    client: Arc<dyn VcsClient>,
}

impl HistoryBrowser {
    pub fn new(client: Arc<dyn VcsClient>) -> Self {
        Self { client }
    }

    /// History for `path`, newest first. A finite `limit` bounds the tool
    /// call itself rather than truncating afterwards; `None` requests the
    /// full history.
    pub async fn get_history(
        &self,
        path: &str,
        limit: Option<usize>,
    ) -> VcsResult<Vec<LogEntry>> {
        debug!(path, ?limit, "querying file history");
        self.client.log(path, limit).await
    }

    /// Build the interactive listing for a history page. When the page is
    /// exactly as long as the finite limit that was requested, the history
    /// may be truncated, and a [`HistoryPickItem::ShowAllMarker`] is appended
    /// as the "show all" affordance.
    pub fn pick_items(
        entries: Vec<LogEntry>,
        requested_limit: Option<usize>,
    ) -> Vec<HistoryPickItem> {
        let saturated =
            matches!(requested_limit, Some(limit) if limit > 0 && entries.len() == limit);
        let mut items: Vec<HistoryPickItem> =
            entries.into_iter().map(HistoryPickItem::Entry).collect();
        if saturated {
            items.push(HistoryPickItem::ShowAllMarker);
        }
        items
    }

    /// The pair of references to diff for one log entry: the entry's
    /// revision against `revision - 1`.
    ///
    /// `revision - 1` is an approximation: the previous change to this
    /// particular path may be older when intervening revisions left it
    /// untouched. `None` when there is no earlier revision to diff against.
    pub fn diff_pair(entry: &LogEntry) -> Option<(RevisionReference, RevisionReference)> {
        let current = Revision::Number(entry.revision);
        let previous = current.previous()?;
        Some((
            RevisionReference::new(entry.path.clone(), previous),
            RevisionReference::new(entry.path.clone(), current),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(revision: u64) -> LogEntry {
        LogEntry {
            revision,
            author: "alice".to_string(),
            message: format!("change {}", revision),
            timestamp: Utc::now(),
            path: "src/lib.rs".to_string(),
        }
    }

    #[test]
    fn test_saturated_page_gets_show_all_marker() {
        let items = HistoryBrowser::pick_items(vec![entry(5), entry(4), entry(3)], Some(3));
        assert_eq!(items.len(), 4);
        assert!(matches!(items[0], HistoryPickItem::Entry(ref e) if e.revision == 5));
        assert!(matches!(items[3], HistoryPickItem::ShowAllMarker));
    }

    #[test]
    fn test_short_page_has_no_marker() {
        let items = HistoryBrowser::pick_items(vec![entry(2), entry(1)], Some(20));
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| matches!(item, HistoryPickItem::Entry(_))));
    }

    #[test]
    fn test_full_history_has_no_marker() {
        let items = HistoryBrowser::pick_items(vec![entry(2), entry(1)], None);
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| matches!(item, HistoryPickItem::Entry(_))));
    }

    #[test]
    fn test_marker_survives_show_all_commit_message() {
        // A commit literally named "Show All" stays a plain entry; the
        // marker is a variant, not a label comparison.
        let mut showy = entry(7);
        showy.message = "Show All".to_string();
        let items = HistoryBrowser::pick_items(vec![showy], Some(20));
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], HistoryPickItem::Entry(_)));
    }

    #[test]
    fn test_diff_pair_uses_previous_revision() {
        let (previous, current) = HistoryBrowser::diff_pair(&entry(5)).unwrap();
        assert_eq!(previous.revision, Revision::Number(4));
        assert_eq!(current.revision, Revision::Number(5));
        assert_eq!(previous.path, "src/lib.rs");
    }

    #[test]
    fn test_diff_pair_at_first_revision() {
        assert!(HistoryBrowser::diff_pair(&entry(1)).is_none());
    }
}
