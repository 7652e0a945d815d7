//! Bounded text history
//!
//! `HistoryStore` front-ends a pluggable backend with the retention policy:
//! keep the newest `max_entries` entries, evict the single oldest entry
//! whenever a save pushes the count over the cap. Saves and deletes are
//! serialized through a store-level mutex so the bound holds at every
//! observable point; reads go straight to the backend.

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::metrics;
use crate::validation;

use super::clock::MonotonicClock;
use super::storage_err;
use super::types::{EntryId, Origin, TextEntry};

/// Persistence operations a history backend must provide. Implementations
/// only store and retrieve; ordering and retention live in `HistoryStore`.
pub trait HistoryBackend: Send + Sync {
    fn insert(&self, entry: &TextEntry) -> anyhow::Result<()>;

    /// All entries, in no particular order.
    fn fetch_all(&self) -> anyhow::Result<Vec<TextEntry>>;

    /// Returns `false` when no entry with this id exists.
    fn remove(&self, id: EntryId) -> anyhow::Result<bool>;

    fn count(&self) -> anyhow::Result<usize>;

    fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct HistoryStore {
    backend: Box<dyn HistoryBackend>,
    /// Retention cap. At least 1; a save may evict at most one older entry.
    max_entries: usize,
    clock: MonotonicClock,
    /// Serializes the save and delete paths. Without it, two concurrent
    /// saves can both observe `count == max` before either evicts, leaving
    /// the store one entry over the cap.
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(backend: Box<dyn HistoryBackend>, max_entries: usize) -> Self {
        Self {
            backend,
            max_entries: max_entries.max(1),
            clock: MonotonicClock::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Validate, persist with a fresh id, then enforce the retention cap.
    /// Duplicate text is accepted; each save is its own entry.
    pub fn save(&self, text: &str, origin: Origin) -> Result<TextEntry> {
        validation::validate_text(text).map_validation_err("text")?;

        let _guard = self.write_lock.lock();

        let entry = TextEntry {
            id: self.clock.next_id(),
            text: text.to_string(),
            origin: Some(origin),
        };
        self.backend.insert(&entry).map_err(storage_err)?;
        metrics::STORE_OPERATIONS_TOTAL
            .with_label_values(&["texts", "save"])
            .inc();
        debug!("Saved text entry {} ({} bytes)", entry.id, entry.text.len());

        let mut count = self.backend.count().map_err(storage_err)?;
        if count > self.max_entries {
            if let Some(oldest) = self.oldest_id()? {
                self.backend.remove(oldest).map_err(storage_err)?;
                count -= 1;
                metrics::STORE_EVICTIONS_TOTAL
                    .with_label_values(&["texts", "count"])
                    .inc();
                info!(
                    "History over capacity ({}/{}), evicted oldest entry {}",
                    count + 1,
                    self.max_entries,
                    oldest
                );
            }
        }
        metrics::TEXT_ENTRIES.set(count as i64);

        Ok(entry)
    }

    /// Every stored entry, newest first.
    pub fn list(&self) -> Result<Vec<TextEntry>> {
        let mut entries = self.backend.fetch_all().map_err(storage_err)?;
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(entries)
    }

    /// Remove one entry by id. Fails with `EntryNotFound` when the id was
    /// never stored or has already been evicted or deleted.
    pub fn delete(&self, id: EntryId) -> Result<()> {
        let _guard = self.write_lock.lock();

        let removed = self.backend.remove(id).map_err(storage_err)?;
        if !removed {
            return Err(AppError::EntryNotFound(id.to_string()));
        }
        metrics::STORE_OPERATIONS_TOTAL
            .with_label_values(&["texts", "delete"])
            .inc();
        metrics::TEXT_ENTRIES.set(self.backend.count().map_err(storage_err)? as i64);
        info!("Deleted text entry {id}");
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        self.backend.count().map_err(storage_err)
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn flush(&self) -> Result<()> {
        self.backend.flush().map_err(storage_err)
    }

    fn oldest_id(&self) -> Result<Option<EntryId>> {
        let entries = self.backend.fetch_all().map_err(storage_err)?;
        Ok(entries.iter().map(|e| e.id).min())
    }
}
