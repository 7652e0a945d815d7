//! Wire types shared across handler modules
//!
//! Field names follow the JSON contract the web client expects: entry ids
//! travel as decimal strings under `unixTime`, file listings expose both
//! the storage name and the original name.

use serde::{Deserialize, Serialize};

use crate::store::{Origin, StoredFile, TextEntry};

/// Generic acknowledgement returned by mutating endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One history entry as rendered on the wire
#[derive(Debug, Serialize)]
pub struct TextRow {
    /// Entry id as a decimal string. Clients echo it back verbatim on delete.
    #[serde(rename = "unixTime")]
    pub unix_time: String,
    pub text: String,
    /// Omitted entirely when the backend carries no provenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl From<TextEntry> for TextRow {
    fn from(entry: TextEntry) -> Self {
        Self {
            unix_time: entry.id.to_string(),
            text: entry.text,
            origin: entry.origin,
        }
    }
}

/// Response for GET /getTexts
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub rows: Vec<TextRow>,
}

/// One stored file as rendered on the wire
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub name: String,
    #[serde(rename = "originalName")]
    pub original_name: String,
    /// Size in bytes
    pub size: u64,
    /// Upload time in millisecond Unix time
    pub timestamp: u64,
}

impl From<StoredFile> for FileInfo {
    fn from(file: StoredFile) -> Self {
        Self {
            name: file.storage_name,
            original_name: file.original_name,
            size: file.size_bytes,
            timestamp: file.uploaded_at,
        }
    }
}

/// Response for GET /files
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<FileInfo>,
}

/// Request body for POST /saveText. `text` is optional so a missing field
/// maps to a 400 instead of an axum deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SaveTextRequest {
    pub text: Option<String>,
}

/// Query parameters for GET /saveUrlText
#[derive(Debug, Deserialize)]
pub struct SaveUrlTextParams {
    pub text: Option<String>,
}

/// Request body for DELETE /delete
#[derive(Debug, Deserialize)]
pub struct DeleteTextRequest {
    #[serde(rename = "unixTime")]
    pub unix_time: Option<String>,
}
