//! Configuration Module
//!
//! Handles loading server configuration from environment variables. The
//! served directory comes from the command line instead.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of JPEGs to serve
    pub directory: PathBuf,
    /// SQLite file backing the thumbnail cache
    pub cache_path: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Thumbnail TTL in seconds
    pub thumbnail_ttl: u64,
    /// Expired-entry reclamation interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PATH` - Thumbnail database file (default: /tmp/thumb_gallery.sqlite3)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `THUMBNAIL_TTL` - Thumbnail TTL in seconds (default: 604800, 7 days)
    /// - `CLEANUP_INTERVAL` - Reclamation frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            directory: defaults.directory,
            cache_path: env::var("CACHE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            thumbnail_ttl: env::var("THUMBNAIL_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&ttl| ttl > 0)
                .unwrap_or(defaults.thumbnail_ttl),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&interval| interval > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Sets the served directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Thumbnail TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.thumbnail_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            cache_path: PathBuf::from("/tmp/thumb_gallery.sqlite3"),
            server_port: 8080,
            thumbnail_ttl: 7 * 24 * 60 * 60,
            cleanup_interval: 3600,
        }
    }
}
