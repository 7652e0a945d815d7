//! HTTP API Handlers - Modular organization of the REST API
//!
//! Each submodule handles a specific domain of functionality.

// Core modules
pub mod router;
pub mod state;
pub mod types;

// Health and utilities
pub mod health;

// Text history operations
pub mod texts;

// File store operations
pub mod files;

// Re-export commonly used items
pub use router::{build_api_routes, build_ops_routes, build_router, AppState};
pub use state::AppContext;
pub use types::*;
