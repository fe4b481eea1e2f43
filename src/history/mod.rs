use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::{Store, HISTORY_KEY};

pub mod commands;
pub mod types;

pub use types::{
    HistoryCounts, HistoryFilter, HistoryItem, NewHistoryItem, OperationKind, OperationMetadata,
};

/// Newest-first log of completed operations, written through to the
/// document store. A mutation is only acknowledged once the persisted
/// sequence has been rewritten, so the in-memory log and the store agree
/// after every call that returns `Ok`.
#[derive(Clone)]
pub struct HistoryService {
    store: Store,
    items: Arc<RwLock<Vec<HistoryItem>>>,
}

impl HistoryService {
    /// Loads the persisted log; an absent or corrupt document yields an
    /// empty log.
    pub fn new(store: Store) -> Self {
        let items: Vec<HistoryItem> = store.load(HISTORY_KEY, Vec::new());
        Self {
            store,
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Assigns an id and timestamp, prepends the item, and persists the
    /// updated sequence. Identical consecutive operations produce separate
    /// entries; there is no dedup.
    pub fn append(&self, entry: NewHistoryItem) -> Result<HistoryItem> {
        let now = Utc::now();
        // Millisecond precision, matching the persisted representation, so
        // a reloaded log compares equal to the one that was written.
        let timestamp =
            DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        let item = HistoryItem {
            id: Uuid::new_v4().to_string(),
            kind: entry.kind,
            input: entry.input,
            output: entry.output,
            metadata: entry.metadata,
            timestamp,
        };

        let mut guard = self.items.write().unwrap();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(item.clone());
        next.extend(guard.iter().cloned());

        self.store
            .save(HISTORY_KEY, &next)
            .context("Failed to persist history log")?;
        *guard = next;

        Ok(item)
    }

    /// Empties the log. Clearing an empty log is a no-op with the same
    /// observable effect.
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.items.write().unwrap();
        self.store
            .save(HISTORY_KEY, &Vec::<HistoryItem>::new())
            .context("Failed to persist cleared history log")?;
        guard.clear();
        Ok(())
    }

    /// Pure projection over the current log; recomputed on every call.
    pub fn filter(&self, filter: &HistoryFilter) -> Vec<HistoryItem> {
        let needle = filter
            .search_term
            .as_deref()
            .map(str::to_lowercase)
            .filter(|term| !term.is_empty());
        let kind = filter
            .kind
            .as_deref()
            .filter(|kind| !kind.is_empty() && *kind != "all");

        self.items
            .read()
            .unwrap()
            .iter()
            .filter(|item| {
                let matches_search = needle.as_deref().map_or(true, |needle| {
                    item.input.to_lowercase().contains(needle)
                        || item.output.to_lowercase().contains(needle)
                });
                let matches_kind = kind.map_or(true, |kind| item.kind.as_str() == kind);
                matches_search && matches_kind
            })
            .cloned()
            .collect()
    }

    /// Count over the full log, independent of any active filter view.
    pub fn count_by_kind(&self, kind: OperationKind) -> usize {
        self.items
            .read()
            .unwrap()
            .iter()
            .filter(|item| item.kind == kind)
            .count()
    }

    pub fn counts(&self) -> HistoryCounts {
        let guard = self.items.read().unwrap();
        let mut counts = HistoryCounts::default();
        for item in guard.iter() {
            match item.kind {
                OperationKind::Translation => counts.translation += 1,
                OperationKind::Summarization => counts.summarization += 1,
                OperationKind::SpeechToText => counts.speech_to_text += 1,
                OperationKind::TextToSpeech => counts.text_to_speech += 1,
            }
        }
        counts
    }

    pub fn items(&self) -> Vec<HistoryItem> {
        self.items.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
