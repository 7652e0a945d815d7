//! Filesystem backends
//!
//! Texts live as `<id>.txt` files, uploads as plain files under the store
//! directory. No sidecar metadata: the text id is the file stem, and the
//! upload timestamp is persisted as the file's mtime. Clock-issued
//! timestamps are strictly increasing, so mtime ordering stays stable even
//! for uploads that land in the same millisecond.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::warn;

use super::files::FileBackend;
use super::history::HistoryBackend;
use super::types::{EntryId, StoredFile, TextEntry};

const TEXT_EXTENSION: &str = "txt";

pub struct FsHistoryBackend {
    dir: PathBuf,
}

impl FsHistoryBackend {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create history directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn entry_path(&self, id: EntryId) -> PathBuf {
        self.dir.join(format!("{id}.{TEXT_EXTENSION}"))
    }
}

impl HistoryBackend for FsHistoryBackend {
    fn insert(&self, entry: &TextEntry) -> Result<()> {
        let path = self.entry_path(entry.id);
        fs::write(&path, entry.text.as_bytes())
            .with_context(|| format!("Failed to write text entry {}", path.display()))
    }

    fn fetch_all(&self) -> Result<Vec<TextEntry>> {
        let mut entries = Vec::new();
        let dir = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read history directory {}", self.dir.display()))?;

        for item in dir {
            let item = item.with_context(|| {
                format!("Failed to walk history directory {}", self.dir.display())
            })?;
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEXT_EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<EntryId>().ok())
            else {
                warn!("Skipping history file with unparseable name: {}", path.display());
                continue;
            };
            // Entries can vanish between the directory walk and the read
            // when a concurrent delete wins the race.
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Skipping unreadable history file {}: {e}", path.display());
                    continue;
                }
            };
            entries.push(TextEntry {
                id,
                text,
                // Bare text files carry no provenance.
                origin: None,
            });
        }
        Ok(entries)
    }

    fn remove(&self, id: EntryId) -> Result<bool> {
        let path = self.entry_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    fn count(&self) -> Result<usize> {
        Ok(self.fetch_all()?.len())
    }
}

pub struct FsFileBackend {
    dir: PathBuf,
}

impl FsFileBackend {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create file directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// `name` has already passed validation, so it is a bare component and
    /// the join cannot escape the store directory.
    fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl FileBackend for FsFileBackend {
    fn persist(&self, name: &str, bytes: &[u8], uploaded_at: u64) -> Result<()> {
        let path = self.file_path(name);
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write file {}", path.display()))?;

        let mtime = UNIX_EPOCH + Duration::from_millis(uploaded_at);
        let file = fs::File::options()
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to reopen {} for timestamping", path.display()))?;
        file.set_modified(mtime)
            .with_context(|| format!("Failed to set mtime on {}", path.display()))
    }

    fn fetch_all(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        let dir = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read file directory {}", self.dir.display()))?;

        for item in dir {
            let item = item
                .with_context(|| format!("Failed to walk file directory {}", self.dir.display()))?;
            let metadata = match item.metadata() {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Skipping unreadable file {:?}: {e}", item.file_name());
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let name = item.file_name().to_string_lossy().into_owned();
            let uploaded_at = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            files.push(StoredFile {
                storage_name: name.clone(),
                original_name: name,
                size_bytes: metadata.len(),
                uploaded_at,
            });
        }
        Ok(files)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.file_path(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_history_roundtrip() {
        let dir = TempDir::new().unwrap();
        let backend = FsHistoryBackend::new(dir.path()).unwrap();

        let entry = TextEntry {
            id: EntryId::from_millis(1000),
            text: "hello".to_string(),
            origin: None,
        };
        backend.insert(&entry).unwrap();

        let all = backend.fetch_all().unwrap();
        assert_eq!(all, vec![entry]);
        assert_eq!(backend.count().unwrap(), 1);
    }

    #[test]
    fn test_history_remove_reports_absence() {
        let dir = TempDir::new().unwrap();
        let backend = FsHistoryBackend::new(dir.path()).unwrap();

        let entry = TextEntry {
            id: EntryId::from_millis(42),
            text: "x".to_string(),
            origin: None,
        };
        backend.insert(&entry).unwrap();

        assert!(backend.remove(entry.id).unwrap());
        assert!(!backend.remove(entry.id).unwrap());
        assert!(!backend.remove(EntryId::from_millis(7)).unwrap());
    }

    #[test]
    fn test_history_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        let backend = FsHistoryBackend::new(dir.path()).unwrap();

        fs::write(dir.path().join("notes.md"), "not a text entry").unwrap();
        fs::write(dir.path().join("garbled.txt"), "no numeric stem").unwrap();

        assert!(backend.fetch_all().unwrap().is_empty());
        assert_eq!(backend.count().unwrap(), 0);
    }

    #[test]
    fn test_file_mtime_carries_upload_timestamp() {
        let dir = TempDir::new().unwrap();
        let backend = FsFileBackend::new(dir.path()).unwrap();

        backend.persist("a.bin", b"aaa", 5_000).unwrap();
        backend.persist("b.bin", b"bb", 5_001).unwrap();

        let mut all = backend.fetch_all().unwrap();
        all.sort_by_key(|f| f.uploaded_at);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].storage_name, "a.bin");
        assert_eq!(all[0].uploaded_at, 5_000);
        assert_eq!(all[0].size_bytes, 3);
        assert_eq!(all[1].storage_name, "b.bin");
        assert_eq!(all[1].uploaded_at, 5_001);
    }

    #[test]
    fn test_file_overwrite_replaces_blob() {
        let dir = TempDir::new().unwrap();
        let backend = FsFileBackend::new(dir.path()).unwrap();

        backend.persist("same.txt", b"old", 100).unwrap();
        backend.persist("same.txt", b"newer", 200).unwrap();

        let all = backend.fetch_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].size_bytes, 5);
        assert_eq!(all[0].uploaded_at, 200);
        assert_eq!(backend.read("same.txt").unwrap().unwrap(), b"newer");
    }

    #[test]
    fn test_file_read_absent_returns_none() {
        let dir = TempDir::new().unwrap();
        let backend = FsFileBackend::new(dir.path()).unwrap();
        assert!(backend.read("ghost.bin").unwrap().is_none());
    }
}
