//! Bounded stores for text history and uploaded files
//!
//! Two independent stores share one layout: a thin service type owning the
//! retention policy (`HistoryStore`, `FileStore`) over a swappable
//! persistence backend. Backends come in two flavors, plain filesystem and
//! RocksDB, selected by configuration at startup.

pub mod clock;
pub mod files;
pub mod fs;
pub mod history;
pub mod rocks;
pub mod types;

pub use clock::MonotonicClock;
pub use files::{FileBackend, FileStore};
pub use history::{HistoryBackend, HistoryStore};
pub use types::{EntryId, Origin, StoredFile, TextEntry};

use std::fmt;
use std::str::FromStr;

use crate::config::ServerConfig;
use crate::errors::AppError;

/// Backend errors carry their full anyhow chain into the opaque storage
/// variant; the chain lands in logs, not in client responses.
pub(crate) fn storage_err(e: anyhow::Error) -> AppError {
    AppError::StorageError(format!("{e:#}"))
}

/// Which persistence backend both stores run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// One file per entry under the data directory. Zero setup, contents
    /// inspectable with ls and cat.
    Filesystem,
    /// Single shared RocksDB database. Keeps entry provenance, which the
    /// filesystem layout cannot represent.
    RocksDb,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fs" | "filesystem" => Ok(BackendKind::Filesystem),
            "rocksdb" | "rocks" => Ok(BackendKind::RocksDb),
            other => Err(anyhow::anyhow!(
                "Unknown storage backend '{other}' (expected 'filesystem' or 'rocksdb')"
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Filesystem => write!(f, "filesystem"),
            BackendKind::RocksDb => write!(f, "rocksdb"),
        }
    }
}

/// Open both stores under the configured data directory.
pub fn open_stores(config: &ServerConfig) -> anyhow::Result<(HistoryStore, FileStore)> {
    let (history_backend, file_backend): (Box<dyn HistoryBackend>, Box<dyn FileBackend>) =
        match config.backend {
            BackendKind::Filesystem => {
                let texts = fs::FsHistoryBackend::new(&config.data_dir.join("texts"))?;
                let files = fs::FsFileBackend::new(&config.data_dir.join("files"))?;
                (Box::new(texts), Box::new(files))
            }
            BackendKind::RocksDb => {
                let db = rocks::open_db(&config.data_dir.join("rocksdb"))?;
                (
                    Box::new(rocks::RocksHistoryBackend::new(db.clone())),
                    Box::new(rocks::RocksFileBackend::new(db)),
                )
            }
        };

    let history = HistoryStore::new(history_backend, config.max_text_entries);
    let files = FileStore::new(
        file_backend,
        config.max_files,
        config.max_file_size,
        config.max_total_size,
    );
    Ok((history, files))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parses_aliases() {
        assert_eq!("fs".parse::<BackendKind>().unwrap(), BackendKind::Filesystem);
        assert_eq!(
            "Filesystem".parse::<BackendKind>().unwrap(),
            BackendKind::Filesystem
        );
        assert_eq!("rocks".parse::<BackendKind>().unwrap(), BackendKind::RocksDb);
        assert_eq!(
            "ROCKSDB".parse::<BackendKind>().unwrap(),
            BackendKind::RocksDb
        );
        assert!("sqlite".parse::<BackendKind>().is_err());
    }
}
