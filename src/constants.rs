//! Documented constants for the paste-bin stores
//!
//! This module contains all tunable parameters with justification for their values.
//! Everything here is a default: the matching `ServerConfig` field overrides each
//! value through a `YANKPASTE_*` environment variable.

// =============================================================================
// RETENTION CAPS
// The whole point of this service: keep the N most recent items, evict the
// oldest after each write.
// =============================================================================

/// Maximum text entries kept in the history store
///
/// After each save the store deletes the oldest entry once the count exceeds
/// this bound, so the history view never grows past it.
///
/// Justification:
/// - The history is a scratchpad, not an archive; ten entries cover a working
///   session while keeping every read a trivial full scan
/// - Deployed variants of this service have run with 5 and with 10; 10 is the
///   value the filesystem store shipped with
pub const DEFAULT_MAX_TEXT_ENTRIES: usize = 10;

/// Maximum uploaded files kept in the file store
///
/// Justification:
/// - Matches the client's file table, which advertises a three-file limit
/// - Files are large compared to texts; a small count cap keeps the total
///   footprint predictable together with the size caps below
pub const DEFAULT_MAX_FILES: usize = 3;

/// Per-file upload size cap in bytes (10 GiB)
///
/// Uploads larger than this are rejected with 413 before anything is
/// persisted.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024 * 1024;

/// Cumulative size cap across all stored files in bytes (10 GiB)
///
/// Checked independently of the count cap after every upload: the count cap
/// models "too many small files", this one models "one huge file". A single
/// file may exceed it alone (logged, never hard-failed) because the per-file
/// cap above is the acceptance gate.
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 10 * 1024 * 1024 * 1024;

// =============================================================================
// REQUEST LIMITS
// =============================================================================

/// Request body limit for the JSON routes in bytes (50 MB)
///
/// Justification:
/// - Pastes can run to tens of MB; 50 MB is the body-parser limit this
///   service has always shipped with
pub const DEFAULT_JSON_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Extra bytes allowed on the upload route beyond the per-file cap
///
/// Covers multipart boundaries and part headers so a file of exactly
/// `max_file_size` bytes still fits in the request body.
pub const UPLOAD_BODY_OVERHEAD: u64 = 1024 * 1024;

/// Maximum accepted text length in bytes
///
/// Matches the JSON body limit; the store re-checks it so backends stay
/// bounded even for callers that bypass the HTTP layer.
pub const MAX_TEXT_BYTES: usize = DEFAULT_JSON_BODY_LIMIT;

/// Maximum filename length in bytes after sanitization
///
/// Justification:
/// - 255 bytes is the component limit on every filesystem the store runs on,
///   and the RocksDB backend keeps the same bound for key sanity
pub const MAX_FILE_NAME_BYTES: usize = 255;

// =============================================================================
// SHUTDOWN TIMEOUTS
// =============================================================================

/// Seconds allowed for backend flush during graceful shutdown
pub const STORE_FLUSH_TIMEOUT_SECS: u64 = 10;

/// Seconds allowed for the whole shutdown cleanup before forcing exit
pub const GRACEFUL_SHUTDOWN_TIMEOUT_SECS: u64 = 15;
