//! Thumb Gallery - a JPEG photo gallery server
//!
//! Serves a directory of JPEGs as a gallery page, raw originals, and 800px
//! thumbnails kept in a persistent, TTL-bounded store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod tasks;
pub mod thumbnail;

pub use api::{create_router, AppState};
pub use cache::CacheStore;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
pub use thumbnail::{Thumbnail, ThumbnailService};
