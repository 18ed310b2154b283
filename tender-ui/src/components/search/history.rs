//! Server-sourced query history.
//!
//! The list is always replaced wholesale by `GET /rag/history`; entries are
//! never spliced in locally. Refreshes follow the same ticket discipline as
//! the section store, so an older refresh cannot overwrite a newer one.

use shared_types::HistoryEntry;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    entries: Vec<HistoryEntry>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refresh(&mut self) -> HistoryTicket {
        self.generation += 1;
        self.loading = true;
        HistoryTicket {
            generation: self.generation,
        }
    }

    /// Returns `false` if a newer refresh has started since `ticket` was issued.
    pub fn complete_refresh(
        &mut self,
        ticket: HistoryTicket,
        result: Result<Vec<HistoryEntry>, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!("dropping superseded history refresh");
            return false;
        }
        self.loading = false;

        match result {
            Ok(mut entries) => {
                // Newest first; entries without a timestamp sink to the end.
                entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                log::warn!("history refresh failed: {e}");
                self.error = Some(e.to_string());
            }
        }
        true
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn entry(id: i64, query: &str, answer: &str, minute: u32) -> HistoryEntry {
        HistoryEntry {
            id,
            query: query.to_string(),
            answer: answer.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).single(),
        }
    }

    #[test]
    fn refresh_replaces_and_sorts_newest_first() {
        let mut cache = HistoryCache::new();
        let ticket = cache.begin_refresh();
        assert!(cache.is_loading());
        assert!(cache.complete_refresh(
            ticket,
            Ok(vec![
                entry(1, "oldest", "a", 1),
                entry(3, "newest", "c", 30),
                entry(2, "middle", "b", 15),
            ])
        ));
        let queries: Vec<_> = cache.entries().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["newest", "middle", "oldest"]);
        assert!(!cache.is_loading());

        let ticket = cache.begin_refresh();
        cache.complete_refresh(ticket, Ok(vec![entry(9, "only", "z", 5)]));
        assert_eq!(cache.entries().len(), 1);
    }

    #[test]
    fn undated_entries_sort_last() {
        let mut cache = HistoryCache::new();
        let mut undated = entry(5, "undated", "x", 0);
        undated.created_at = None;
        let ticket = cache.begin_refresh();
        cache.complete_refresh(ticket, Ok(vec![undated, entry(4, "dated", "y", 10)]));
        assert_eq!(cache.entries()[0].query, "dated");
        assert_eq!(cache.entries()[1].query, "undated");
    }

    #[test]
    fn failure_keeps_previous_entries() {
        let mut cache = HistoryCache::new();
        let ticket = cache.begin_refresh();
        cache.complete_refresh(ticket, Ok(vec![entry(1, "kept", "a", 1)]));

        let ticket = cache.begin_refresh();
        cache.complete_refresh(ticket, Err(ApiError::Transport("offline".to_string())));
        assert_eq!(cache.entries().len(), 1);
        assert_eq!(cache.error(), Some("Request failed: offline"));

        let ticket = cache.begin_refresh();
        cache.complete_refresh(ticket, Ok(vec![]));
        assert!(cache.error().is_none());
    }

    #[test]
    fn superseded_refresh_is_dropped() {
        let mut cache = HistoryCache::new();
        let first = cache.begin_refresh();
        let second = cache.begin_refresh();
        assert!(cache.complete_refresh(second, Ok(vec![entry(2, "new", "b", 2)])));
        assert!(!cache.complete_refresh(first, Ok(vec![entry(1, "old", "a", 1)])));
        assert_eq!(cache.entries()[0].query, "new");
    }
}
