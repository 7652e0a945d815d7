//! RocksDB backends
//!
//! A single shared database holds both stores, namespaced by key prefix:
//!
//! - `text:{id:020}` -> bincode `TextEntry` (zero-padded so lexicographic
//!   key order matches numeric id order)
//! - `file:meta:{name}` -> bincode `StoredFile`
//! - `file:blob:{name}` -> raw bytes
//!
//! File metadata and blob are written and deleted in one `WriteBatch` so a
//! crash cannot leave a blob without its metadata row.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rocksdb::{IteratorMode, Options, WriteBatch, WriteOptions, DB};
use tracing::warn;

use super::files::FileBackend;
use super::history::HistoryBackend;
use super::types::{EntryId, StoredFile, TextEntry};

const TEXT_PREFIX: &str = "text:";
const FILE_META_PREFIX: &str = "file:meta:";
const FILE_BLOB_PREFIX: &str = "file:blob:";

/// Helper trait to safely iterate over RocksDB results with error logging.
/// Unlike `.flatten()` which silently ignores errors, this logs them.
trait LogErrors<T> {
    fn log_errors(self) -> impl Iterator<Item = T>;
}

impl<I, T, E> LogErrors<T> for I
where
    I: Iterator<Item = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    fn log_errors(self) -> impl Iterator<Item = T> {
        self.filter_map(|r| match r {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("RocksDB iterator error (continuing): {}", e);
                None
            }
        })
    }
}

/// Write mode for storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Sync writes, fsync() on every write. Durable but slow (2-10ms per
    /// write).
    Sync,
    /// Async writes, no fsync(). Data buffered in the OS page cache (<1ms
    /// per write); survives process crashes but not power loss before the
    /// next fsync.
    Async,
}

impl Default for WriteMode {
    fn default() -> Self {
        // Override with YANKPASTE_WRITE_MODE=sync for durability-critical
        // deployments.
        match std::env::var("YANKPASTE_WRITE_MODE") {
            Ok(mode) if mode.to_lowercase() == "sync" => WriteMode::Sync,
            _ => WriteMode::Async,
        }
    }
}

/// Open (or create) the shared database for both stores.
pub fn open_db(path: &Path) -> Result<Arc<DB>> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create database directory {}", path.display()))?;

    let mut opts = Options::default();
    opts.create_if_missing(true);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

    let db = DB::open(&opts, path)
        .with_context(|| format!("Failed to open RocksDB at {}", path.display()))?;

    let write_mode = WriteMode::default();
    tracing::info!(
        "RocksDB opened at {} with {:?} write mode",
        path.display(),
        write_mode
    );

    Ok(Arc::new(db))
}

fn text_key(id: EntryId) -> String {
    format!("{TEXT_PREFIX}{:020}", id.as_millis())
}

fn file_meta_key(name: &str) -> String {
    format!("{FILE_META_PREFIX}{name}")
}

fn file_blob_key(name: &str) -> String {
    format!("{FILE_BLOB_PREFIX}{name}")
}

pub struct RocksHistoryBackend {
    db: Arc<DB>,
    write_mode: WriteMode,
}

impl RocksHistoryBackend {
    pub fn new(db: Arc<DB>) -> Self {
        Self {
            db,
            write_mode: WriteMode::default(),
        }
    }
}

impl HistoryBackend for RocksHistoryBackend {
    fn insert(&self, entry: &TextEntry) -> Result<()> {
        let key = text_key(entry.id);
        let value = bincode::serde::encode_to_vec(entry, bincode::config::standard())
            .with_context(|| format!("Failed to serialize text entry {}", entry.id))?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.write_mode == WriteMode::Sync);
        self.db
            .put_opt(key.as_bytes(), &value, &write_opts)
            .with_context(|| format!("Failed to put text entry {}", entry.id))
    }

    fn fetch_all(&self) -> Result<Vec<TextEntry>> {
        let mut entries = Vec::new();
        let iter = self.db.iterator(IteratorMode::From(
            TEXT_PREFIX.as_bytes(),
            rocksdb::Direction::Forward,
        ));
        for (key, value) in iter.log_errors() {
            let key_str = String::from_utf8_lossy(&key);
            if !key_str.starts_with(TEXT_PREFIX) {
                break;
            }
            match bincode::serde::decode_from_slice::<TextEntry, _>(
                &value,
                bincode::config::standard(),
            ) {
                Ok((entry, _)) => entries.push(entry),
                Err(e) => warn!("Skipping undecodable text entry at {key_str}: {e}"),
            }
        }
        Ok(entries)
    }

    fn remove(&self, id: EntryId) -> Result<bool> {
        let key = text_key(id);
        let existing = self
            .db
            .get_pinned(key.as_bytes())
            .with_context(|| format!("Failed to look up text entry {id}"))?;
        if existing.is_none() {
            return Ok(false);
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.write_mode == WriteMode::Sync);
        self.db
            .delete_opt(key.as_bytes(), &write_opts)
            .with_context(|| format!("Failed to delete text entry {id}"))?;
        Ok(true)
    }

    fn count(&self) -> Result<usize> {
        let mut count = 0;
        let iter = self.db.iterator(IteratorMode::From(
            TEXT_PREFIX.as_bytes(),
            rocksdb::Direction::Forward,
        ));
        for (key, _value) in iter.log_errors() {
            if !key.starts_with(TEXT_PREFIX.as_bytes()) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush RocksDB")
    }
}

pub struct RocksFileBackend {
    db: Arc<DB>,
    write_mode: WriteMode,
}

impl RocksFileBackend {
    pub fn new(db: Arc<DB>) -> Self {
        Self {
            db,
            write_mode: WriteMode::default(),
        }
    }
}

impl FileBackend for RocksFileBackend {
    fn persist(&self, name: &str, bytes: &[u8], uploaded_at: u64) -> Result<()> {
        let meta = StoredFile {
            storage_name: name.to_string(),
            original_name: name.to_string(),
            size_bytes: bytes.len() as u64,
            uploaded_at,
        };
        let meta_value = bincode::serde::encode_to_vec(&meta, bincode::config::standard())
            .with_context(|| format!("Failed to serialize metadata for '{name}'"))?;

        let mut batch = WriteBatch::default();
        batch.put(file_meta_key(name).as_bytes(), &meta_value);
        batch.put(file_blob_key(name).as_bytes(), bytes);

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.write_mode == WriteMode::Sync);
        self.db
            .write_opt(batch, &write_opts)
            .with_context(|| format!("Failed to persist file '{name}'"))
    }

    fn fetch_all(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        let iter = self.db.iterator(IteratorMode::From(
            FILE_META_PREFIX.as_bytes(),
            rocksdb::Direction::Forward,
        ));
        for (key, value) in iter.log_errors() {
            let key_str = String::from_utf8_lossy(&key);
            if !key_str.starts_with(FILE_META_PREFIX) {
                break;
            }
            match bincode::serde::decode_from_slice::<StoredFile, _>(
                &value,
                bincode::config::standard(),
            ) {
                Ok((meta, _)) => files.push(meta),
                Err(e) => warn!("Skipping undecodable file metadata at {key_str}: {e}"),
            }
        }
        Ok(files)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let meta_key = file_meta_key(name);
        let existing = self
            .db
            .get_pinned(meta_key.as_bytes())
            .with_context(|| format!("Failed to look up file '{name}'"))?;
        if existing.is_none() {
            return Ok(false);
        }

        let mut batch = WriteBatch::default();
        batch.delete(meta_key.as_bytes());
        batch.delete(file_blob_key(name).as_bytes());

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.write_mode == WriteMode::Sync);
        self.db
            .write_opt(batch, &write_opts)
            .with_context(|| format!("Failed to delete file '{name}'"))?;
        Ok(true)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let blob = self
            .db
            .get(file_blob_key(name).as_bytes())
            .with_context(|| format!("Failed to read file '{name}'"))?;
        Ok(blob)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush RocksDB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Origin;
    use tempfile::TempDir;

    fn open_test_db(dir: &TempDir) -> Arc<DB> {
        open_db(&dir.path().join("db")).unwrap()
    }

    #[test]
    fn test_text_roundtrip_keeps_origin() {
        let dir = TempDir::new().unwrap();
        let backend = RocksHistoryBackend::new(open_test_db(&dir));

        let entry = TextEntry {
            id: EntryId::from_millis(1234),
            text: "payload".to_string(),
            origin: Some(Origin::Programmatic),
        };
        backend.insert(&entry).unwrap();

        let all = backend.fetch_all().unwrap();
        assert_eq!(all, vec![entry]);
        assert_eq!(backend.count().unwrap(), 1);
    }

    #[test]
    fn test_text_keys_iterate_in_id_order() {
        let dir = TempDir::new().unwrap();
        let backend = RocksHistoryBackend::new(open_test_db(&dir));

        for millis in [30_u64, 10, 20] {
            backend
                .insert(&TextEntry {
                    id: EntryId::from_millis(millis),
                    text: millis.to_string(),
                    origin: None,
                })
                .unwrap();
        }

        let ids: Vec<u64> = backend
            .fetch_all()
            .unwrap()
            .iter()
            .map(|e| e.id.as_millis())
            .collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_text_remove_reports_absence() {
        let dir = TempDir::new().unwrap();
        let backend = RocksHistoryBackend::new(open_test_db(&dir));

        let id = EntryId::from_millis(77);
        backend
            .insert(&TextEntry {
                id,
                text: "x".to_string(),
                origin: None,
            })
            .unwrap();

        assert!(backend.remove(id).unwrap());
        assert!(!backend.remove(id).unwrap());
    }

    #[test]
    fn test_file_meta_and_blob_move_together() {
        let dir = TempDir::new().unwrap();
        let backend = RocksFileBackend::new(open_test_db(&dir));

        backend.persist("report.pdf", b"blob-bytes", 9_000).unwrap();

        let all = backend.fetch_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].storage_name, "report.pdf");
        assert_eq!(all[0].size_bytes, 10);
        assert_eq!(all[0].uploaded_at, 9_000);
        assert_eq!(backend.read("report.pdf").unwrap().unwrap(), b"blob-bytes");

        assert!(backend.remove("report.pdf").unwrap());
        assert!(backend.fetch_all().unwrap().is_empty());
        assert!(backend.read("report.pdf").unwrap().is_none());
    }

    #[test]
    fn test_stores_share_one_database() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);
        let texts = RocksHistoryBackend::new(db.clone());
        let files = RocksFileBackend::new(db);

        texts
            .insert(&TextEntry {
                id: EntryId::from_millis(1),
                text: "t".to_string(),
                origin: None,
            })
            .unwrap();
        files.persist("f.bin", b"f", 2).unwrap();

        // Prefixes keep the namespaces disjoint.
        assert_eq!(texts.count().unwrap(), 1);
        assert_eq!(files.fetch_all().unwrap().len(), 1);
    }
}
