//! Yank Paste Library
//!
//! Personal paste-bin with a bounded text history and a bounded file store
//! behind a small HTTP surface.
//!
//! # Key Features
//! - Rolling text history: keeps the newest N snippets, oldest evicted on save
//! - Bounded file store: count and total-size caps enforced on every upload
//! - Swappable persistence: plain filesystem or embedded RocksDB
//! - Full offline operation, no external services

pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod store;
pub mod validation;

// Re-export dependencies to ensure tests/benchmarks use the same version
pub use chrono;
pub use parking_lot;
