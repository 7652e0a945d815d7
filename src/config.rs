//! Configuration management for Yank Paste
//!
//! All configurable parameters in one place with environment variable overrides.
//! Follows the principle: sensible defaults, configurable in production.

use std::env;
use std::path::PathBuf;
use tracing::info;

use crate::constants::{
    DEFAULT_JSON_BODY_LIMIT, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TEXT_ENTRIES,
    DEFAULT_MAX_TOTAL_SIZE,
};
use crate::store::BackendKind;

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(), // Empty = allow all origins
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "DELETE".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec!["Content-Type".to_string()],
            allow_credentials: false,
            max_age_seconds: 86400, // 24 hours
        }
    }
}

impl CorsConfig {
    /// Load from environment variables with production safety checks
    ///
    /// In production mode (YANKPASTE_ENV=production), warns if CORS origins are
    /// not configured. This prevents accidentally running in production with
    /// permissive CORS.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("YANKPASTE_CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(methods) = env::var("YANKPASTE_CORS_METHODS") {
            config.allowed_methods = methods
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(headers) = env::var("YANKPASTE_CORS_HEADERS") {
            config.allowed_headers = headers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("YANKPASTE_CORS_CREDENTIALS") {
            config.allow_credentials = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("YANKPASTE_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        // Production safety check: warn if CORS is permissive in production
        let is_production = env::var("YANKPASTE_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if is_production && config.allowed_origins.is_empty() {
            tracing::warn!(
                "⚠️  PRODUCTION WARNING: CORS allows all origins. Set YANKPASTE_CORS_ORIGINS for security."
            );
        }

        config
    }

    /// Check if any origin restrictions are configured
    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        // Configure allowed origins
        if self.allowed_origins.is_empty() {
            // Intentionally permissive - no origins configured
            layer = layer.allow_origin(Any);
        } else {
            // Parse configured origins, tracking failures
            let mut valid_origins = Vec::new();
            let mut invalid_origins = Vec::new();

            for origin_str in &self.allowed_origins {
                match origin_str.parse::<axum::http::HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => invalid_origins.push(origin_str.clone()),
                }
            }

            // Log any invalid origins
            for invalid in &invalid_origins {
                tracing::warn!("CORS: Invalid origin '{}' - skipping", invalid);
            }

            if valid_origins.is_empty() {
                // All configured origins failed to parse - this is a config error
                // Do NOT fall back to permissive - that would be a security hole
                tracing::error!(
                    "CORS: All {} configured origin(s) failed to parse. \
                     Rejecting all cross-origin requests. Fix YANKPASTE_CORS_ORIGINS.",
                    self.allowed_origins.len()
                );
                // Use an impossible origin to effectively deny all CORS
                layer =
                    layer.allow_origin(AllowOrigin::list(Vec::<axum::http::HeaderValue>::new()));
            } else {
                if !invalid_origins.is_empty() {
                    tracing::info!(
                        "CORS: Using {} valid origin(s), {} invalid skipped",
                        valid_origins.len(),
                        invalid_origins.len()
                    );
                }
                layer = layer.allow_origin(AllowOrigin::list(valid_origins));
            }
        }

        // Configure allowed methods
        let methods: Vec<axum::http::Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        if methods.is_empty() {
            layer = layer.allow_methods(Any);
        } else {
            layer = layer.allow_methods(methods);
        }

        // Configure allowed headers
        let headers: Vec<axum::http::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if headers.is_empty() {
            layer = layer.allow_headers(Any);
        } else {
            layer = layer.allow_headers(headers);
        }

        // Configure credentials
        if self.allow_credentials {
            layer = layer.allow_credentials(true);
        }

        // Configure max age
        layer = layer.max_age(std::time::Duration::from_secs(self.max_age_seconds));

        layer
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: 127.0.0.1)
    /// Set to 0.0.0.0 for Docker or network-accessible deployments
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Data directory for both stores (default: ./yankpaste_data)
    pub data_dir: PathBuf,

    /// Persistence backend for both stores (default: filesystem)
    pub backend: BackendKind,

    /// Text entries to retain before evicting the oldest (default: 10)
    pub max_text_entries: usize,

    /// Files to retain before evicting the oldest (default: 3)
    pub max_files: usize,

    /// Largest accepted upload in bytes (default: 10 GiB)
    pub max_file_size: u64,

    /// Cap on total stored file bytes (default: 10 GiB)
    pub max_total_size: u64,

    /// Request body limit for the JSON text routes in bytes (default: 50 MB)
    pub max_json_body_bytes: usize,

    /// Rate limit: requests per second (default: 50)
    pub rate_limit_per_second: u64,

    /// Rate limit: burst size (default: 100)
    pub rate_limit_burst: u32,

    /// Maximum concurrent requests (default: 100)
    pub max_concurrent_requests: usize,

    /// Directory served under /static (default: ./static)
    pub static_dir: PathBuf,

    /// Whether running in production mode
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir: PathBuf::from("./yankpaste_data"),
            backend: BackendKind::Filesystem,
            max_text_entries: DEFAULT_MAX_TEXT_ENTRIES,
            max_files: DEFAULT_MAX_FILES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            max_json_body_bytes: DEFAULT_JSON_BODY_LIMIT,
            rate_limit_per_second: 50,
            rate_limit_burst: 100,
            max_concurrent_requests: 100,
            static_dir: PathBuf::from("./static"),
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)] // Environment overrides require mutable config
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Check production mode first
        config.is_production = env::var("YANKPASTE_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        // Host (bind address)
        if let Ok(val) = env::var("YANKPASTE_HOST") {
            config.host = val;
        }

        // Port
        if let Ok(val) = env::var("YANKPASTE_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        // Data directory
        if let Ok(val) = env::var("YANKPASTE_DATA_DIR") {
            config.data_dir = PathBuf::from(val);
        }

        // Storage backend
        if let Ok(val) = env::var("YANKPASTE_BACKEND") {
            match val.parse() {
                Ok(kind) => config.backend = kind,
                Err(e) => tracing::warn!("{e}, keeping {}", config.backend),
            }
        }

        // Retention caps. A cap of zero would make every write evict itself,
        // so both are floored at 1.
        if let Ok(val) = env::var("YANKPASTE_MAX_TEXTS") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_text_entries = n.max(1);
            }
        }

        if let Ok(val) = env::var("YANKPASTE_MAX_FILES") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_files = n.max(1);
            }
        }

        // Size limits (bytes)
        if let Ok(val) = env::var("YANKPASTE_MAX_FILE_SIZE") {
            if let Ok(n) = val.parse() {
                config.max_file_size = n;
            }
        }

        if let Ok(val) = env::var("YANKPASTE_MAX_TOTAL_SIZE") {
            if let Ok(n) = val.parse() {
                config.max_total_size = n;
            }
        }

        if let Ok(val) = env::var("YANKPASTE_JSON_BODY_LIMIT") {
            if let Ok(n) = val.parse() {
                config.max_json_body_bytes = n;
            }
        }

        // Rate limiting
        if let Ok(val) = env::var("YANKPASTE_RATE_LIMIT") {
            if let Ok(n) = val.parse() {
                config.rate_limit_per_second = n;
            }
        }

        if let Ok(val) = env::var("YANKPASTE_RATE_BURST") {
            if let Ok(n) = val.parse() {
                config.rate_limit_burst = n;
            }
        }

        // Concurrency
        if let Ok(val) = env::var("YANKPASTE_MAX_CONCURRENT") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_requests = n;
            }
        }

        // Static assets
        if let Ok(val) = env::var("YANKPASTE_STATIC_DIR") {
            config.static_dir = PathBuf::from(val);
        }

        // CORS configuration
        config.cors = CorsConfig::from_env();

        config
    }

    /// Log the current configuration
    pub fn log(&self) {
        info!("📋 Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "PRODUCTION"
            } else {
                "Development"
            }
        );
        info!("   Listen: {}:{}", self.host, self.port);
        info!("   Data dir: {:?} (backend: {})", self.data_dir, self.backend);
        info!("   History cap: {} entries", self.max_text_entries);
        info!(
            "   File caps: {} files, {} MB each, {} MB total",
            self.max_files,
            self.max_file_size / (1024 * 1024),
            self.max_total_size / (1024 * 1024)
        );
        info!(
            "   JSON body limit: {} MB",
            self.max_json_body_bytes / (1024 * 1024)
        );
        if self.rate_limit_per_second > 0 {
            info!(
                "   Rate limit: {} req/sec (burst: {})",
                self.rate_limit_per_second, self.rate_limit_burst
            );
        } else {
            info!("   Rate limit: disabled");
        }
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        info!("   Static dir: {:?}", self.static_dir);
        if self.cors.is_restricted() {
            info!("   CORS origins: {:?}", self.cors.allowed_origins);
        } else {
            info!("   CORS: Permissive (all origins allowed)");
        }
    }
}

/// Environment variable documentation
#[allow(unused)] // Public API - available for CLI help output
pub fn print_env_help() {
    println!("Yank Paste Configuration Environment Variables:");
    println!();
    println!("  YANKPASTE_ENV             - Set to 'production' or 'prod' for production mode");
    println!(
        "  YANKPASTE_HOST            - Bind address (default: 127.0.0.1, use 0.0.0.0 for Docker)"
    );
    println!("  YANKPASTE_PORT            - Server port (default: 3000)");
    println!("  YANKPASTE_DATA_DIR        - Data directory (default: ./yankpaste_data)");
    println!("  YANKPASTE_BACKEND         - Storage backend: filesystem or rocksdb (default: filesystem)");
    println!("  YANKPASTE_WRITE_MODE      - RocksDB write mode: sync or async (default: async)");
    println!("  YANKPASTE_MAX_TEXTS       - Text entries to retain (default: 10, min: 1)");
    println!("  YANKPASTE_MAX_FILES       - Files to retain (default: 3, min: 1)");
    println!("  YANKPASTE_MAX_FILE_SIZE   - Largest accepted upload in bytes (default: 10 GiB)");
    println!("  YANKPASTE_MAX_TOTAL_SIZE  - Cap on total stored bytes (default: 10 GiB)");
    println!("  YANKPASTE_JSON_BODY_LIMIT - JSON body limit in bytes (default: 50 MB)");
    println!("  YANKPASTE_RATE_LIMIT      - Requests per second (default: 50)");
    println!("  YANKPASTE_RATE_BURST      - Burst size (default: 100)");
    println!("  YANKPASTE_MAX_CONCURRENT  - Max concurrent requests (default: 100)");
    println!("  YANKPASTE_STATIC_DIR      - Directory served under /static (default: ./static)");
    println!();
    println!("CORS Configuration:");
    println!("  YANKPASTE_CORS_ORIGINS     - Comma-separated allowed origins (default: all)");
    println!("  YANKPASTE_CORS_METHODS     - Comma-separated allowed methods (default: GET,POST,DELETE,OPTIONS)");
    println!("  YANKPASTE_CORS_HEADERS     - Comma-separated allowed headers (default: Content-Type)");
    println!("  YANKPASTE_CORS_CREDENTIALS - Allow credentials true/false (default: false)");
    println!("  YANKPASTE_CORS_MAX_AGE     - Preflight cache seconds (default: 86400)");
    println!();
    println!("  RUST_LOG                  - Log level (e.g., info, debug, trace)");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_text_entries, 10);
        assert_eq!(config.max_files, 3);
        assert_eq!(config.backend, BackendKind::Filesystem);
        assert!(!config.is_production);
    }

    #[test]
    fn test_env_override() {
        env::set_var("YANKPASTE_PORT", "8080");
        env::set_var("YANKPASTE_MAX_TEXTS", "25");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_text_entries, 25);

        env::remove_var("YANKPASTE_PORT");
        env::remove_var("YANKPASTE_MAX_TEXTS");
    }

    #[test]
    fn test_zero_cap_floors_to_one() {
        env::set_var("YANKPASTE_MAX_FILES", "0");

        let config = ServerConfig::from_env();
        assert_eq!(config.max_files, 1);

        env::remove_var("YANKPASTE_MAX_FILES");
    }

    #[test]
    fn test_cors_default_is_permissive() {
        let cors = CorsConfig::default();
        assert!(!cors.is_restricted());
        assert!(cors.allowed_origins.is_empty());
        assert!(!cors.allowed_methods.is_empty());
        assert!(!cors.allowed_headers.is_empty());
    }

    #[test]
    fn test_cors_with_origins_is_restricted() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://example.com".to_string()],
            ..Default::default()
        };
        assert!(cors.is_restricted());
    }

    #[test]
    fn test_cors_to_layer_permissive() {
        let cors = CorsConfig::default();
        let _layer = cors.to_layer(); // Should not panic
    }

    #[test]
    fn test_cors_to_layer_restricted() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://example.com".to_string()],
            ..Default::default()
        };
        let _layer = cors.to_layer(); // Should not panic
    }
}
