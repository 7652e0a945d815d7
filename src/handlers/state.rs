//! Shared application state
//!
//! One `AppContext` lives for the whole process and is handed to every
//! handler as axum state. The stores sit behind `Arc` because handlers move
//! clones into `spawn_blocking` closures.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::errors::Result;
use crate::store::{FileStore, HistoryStore};

pub struct AppContext {
    pub history: Arc<HistoryStore>,
    pub files: Arc<FileStore>,
    pub config: ServerConfig,
    started_at: Instant,
}

impl AppContext {
    pub fn new(history: HistoryStore, files: FileStore, config: ServerConfig) -> Self {
        Self {
            history: Arc::new(history),
            files: Arc::new(files),
            config,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Flush both stores. Called once during graceful shutdown.
    pub fn flush_stores(&self) -> Result<()> {
        self.history.flush()?;
        self.files.flush()
    }
}
