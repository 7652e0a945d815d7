//! Bounded file store
//!
//! `FileStore` enforces two independent caps over a pluggable backend: a
//! count cap (keep the newest `max_files` files) and a total-size cap
//! (evict oldest-first until the sum fits, never evicting the file that
//! was just uploaded). Per-file size is checked up front and rejected
//! outright rather than evicted around.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::metrics;
use crate::validation;

use super::clock::MonotonicClock;
use super::storage_err;
use super::types::StoredFile;

/// Persistence operations a file backend must provide. Blobs are written
/// and read whole; the store never streams partial content.
pub trait FileBackend: Send + Sync {
    /// Store `bytes` under `name`, overwriting any previous blob with the
    /// same name. `uploaded_at` must survive a round trip through
    /// `fetch_all` so eviction order is stable.
    fn persist(&self, name: &str, bytes: &[u8], uploaded_at: u64) -> anyhow::Result<()>;

    /// Metadata for every stored file, in no particular order.
    fn fetch_all(&self) -> anyhow::Result<Vec<StoredFile>>;

    /// Returns `false` when no file with this name exists.
    fn remove(&self, name: &str) -> anyhow::Result<bool>;

    /// Full blob contents, or `None` when the name is absent.
    fn read(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>>;

    fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct FileStore {
    backend: Box<dyn FileBackend>,
    /// Count cap, at least 1.
    max_files: usize,
    /// Largest accepted upload, in bytes. Checked before persisting.
    max_file_size: u64,
    /// Cap on the sum of stored sizes. Enforced by evicting oldest-first.
    max_total_size: u64,
    clock: MonotonicClock,
    /// Serializes uploads and deletes so both caps hold at every
    /// observable point.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(
        backend: Box<dyn FileBackend>,
        max_files: usize,
        max_file_size: u64,
        max_total_size: u64,
    ) -> Self {
        Self {
            backend,
            max_files: max_files.max(1),
            max_file_size,
            max_total_size,
            clock: MonotonicClock::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Sanitize the client-supplied name, reject oversized content, persist,
    /// then bring both caps back into bounds. Uploading a name that already
    /// exists replaces the old blob in place.
    pub fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let storage_name =
            validation::sanitize_file_name(original_name).map_validation_err("file")?;

        let size = bytes.len() as u64;
        if size > self.max_file_size {
            return Err(AppError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        let _guard = self.write_lock.lock();

        let uploaded_at = self.clock.next_id().as_millis();
        self.backend
            .persist(&storage_name, bytes, uploaded_at)
            .map_err(storage_err)?;
        metrics::STORE_OPERATIONS_TOTAL
            .with_label_values(&["files", "upload"])
            .inc();
        debug!("Stored file '{storage_name}' ({size} bytes)");

        self.enforce_count_cap()?;
        self.enforce_size_cap(&storage_name)?;
        self.refresh_gauges()?;

        Ok(StoredFile {
            storage_name: storage_name.clone(),
            original_name: storage_name,
            size_bytes: size,
            uploaded_at,
        })
    }

    /// Every stored file, newest first. Ties on timestamp break by name so
    /// the order is deterministic.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        let mut files = self.backend.fetch_all().map_err(storage_err)?;
        files.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.storage_name.cmp(&a.storage_name))
        });
        Ok(files)
    }

    /// Remove one file by storage name. Fails with `FileNotFound` when the
    /// name is absent; names that fail validation can never be stored, so
    /// they are rejected before touching the backend.
    pub fn delete(&self, name: &str) -> Result<()> {
        validation::validate_file_name(name).map_validation_err("filename")?;

        let _guard = self.write_lock.lock();

        let removed = self.backend.remove(name).map_err(storage_err)?;
        if !removed {
            return Err(AppError::FileNotFound(name.to_string()));
        }
        metrics::STORE_OPERATIONS_TOTAL
            .with_label_values(&["files", "delete"])
            .inc();
        self.refresh_gauges()?;
        info!("Deleted file '{name}'");
        Ok(())
    }

    /// Full contents of a stored file.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        validation::validate_file_name(name).map_validation_err("filename")?;

        self.backend
            .read(name)
            .map_err(storage_err)?
            .ok_or_else(|| AppError::FileNotFound(name.to_string()))
    }

    /// Current file count and total stored bytes.
    pub fn stats(&self) -> Result<(usize, u64)> {
        let files = self.backend.fetch_all().map_err(storage_err)?;
        let total = files.iter().map(|f| f.size_bytes).sum();
        Ok((files.len(), total))
    }

    pub fn capacity(&self) -> usize {
        self.max_files
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn flush(&self) -> Result<()> {
        self.backend.flush().map_err(storage_err)
    }

    /// Evict oldest-first until the count fits the cap. An upload that
    /// replaced an existing name does not change the count, so this loop
    /// usually runs zero or one time.
    fn enforce_count_cap(&self) -> Result<()> {
        loop {
            let files = self.oldest_first()?;
            if files.len() <= self.max_files {
                return Ok(());
            }
            let victim = &files[0];
            self.backend
                .remove(&victim.storage_name)
                .map_err(storage_err)?;
            metrics::STORE_EVICTIONS_TOTAL
                .with_label_values(&["files", "count"])
                .inc();
            info!(
                "File store over capacity ({}/{}), evicted oldest file '{}'",
                files.len(),
                self.max_files,
                victim.storage_name
            );
        }
    }

    /// Evict oldest-first until total size fits, skipping `protected` (the
    /// file just uploaded). When that file alone exceeds the cap there is
    /// nothing left to evict; it stays, with a warning.
    fn enforce_size_cap(&self, protected: &str) -> Result<()> {
        loop {
            let files = self.oldest_first()?;
            let total: u64 = files.iter().map(|f| f.size_bytes).sum();
            if total <= self.max_total_size {
                return Ok(());
            }
            let victim = files.iter().find(|f| f.storage_name != protected);
            match victim {
                Some(victim) => {
                    self.backend
                        .remove(&victim.storage_name)
                        .map_err(storage_err)?;
                    metrics::STORE_EVICTIONS_TOTAL
                        .with_label_values(&["files", "size"])
                        .inc();
                    info!(
                        "File store over size cap ({} > {} bytes), evicted oldest file '{}'",
                        total, self.max_total_size, victim.storage_name
                    );
                }
                None => {
                    warn!(
                        "File '{}' alone exceeds the total size cap ({} > {} bytes), keeping it",
                        protected, total, self.max_total_size
                    );
                    return Ok(());
                }
            }
        }
    }

    fn oldest_first(&self) -> Result<Vec<StoredFile>> {
        let mut files = self.backend.fetch_all().map_err(storage_err)?;
        files.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.storage_name.cmp(&b.storage_name))
        });
        Ok(files)
    }

    fn refresh_gauges(&self) -> Result<()> {
        let (count, total) = self.stats()?;
        metrics::STORED_FILES.set(count as i64);
        metrics::STORED_FILE_BYTES.set(total as i64);
        Ok(())
    }
}
