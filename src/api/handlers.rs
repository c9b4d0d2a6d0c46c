//! API Handlers
//!
//! HTTP request handlers for the gallery, thumbnail and auxiliary endpoints.
//! Originals are served by `ServeDir` directly from the router.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderName},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{GalleryError, StoreError, ThumbnailError};
use crate::gallery::{list_images, render_page};
use crate::models::{HealthResponse, StatsResponse};
use crate::thumbnail::ThumbnailService;

/// Response header reporting whether a thumbnail came from the store.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thumbnail get-or-create service
    pub thumbnails: Arc<ThumbnailService>,
    /// Store handle, shared with the service and the cleanup task
    pub store: CacheStore,
    /// Served directory
    pub directory: Arc<PathBuf>,
}

impl AppState {
    /// Creates a new AppState serving `directory` with the default thumbnail TTL.
    pub fn new(store: CacheStore, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let thumbnails = ThumbnailService::new(store.clone(), directory.clone());
        Self::with_service(store, directory, thumbnails)
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, store: CacheStore) -> Self {
        let thumbnails = ThumbnailService::new(store.clone(), config.directory.clone())
            .with_ttl(config.ttl());
        Self::with_service(store, config.directory.clone(), thumbnails)
    }

    fn with_service(store: CacheStore, directory: PathBuf, thumbnails: ThumbnailService) -> Self {
        Self {
            thumbnails: Arc::new(thumbnails),
            store,
            directory: Arc::new(directory),
        }
    }
}

/// Handler for GET /
///
/// Renders the gallery page for the JPEGs in the served directory.
pub async fn gallery_handler(State(state): State<AppState>) -> Result<Html<String>, GalleryError> {
    let images = list_images(&state.directory).await.map_err(|e| {
        error!(error = %e, "Failed to list images");
        e
    })?;

    Ok(Html(render_page(&images)))
}

/// Handler for GET /thumb/*key
///
/// Returns the 800px JPEG thumbnail for `key`, generating it on a miss.
pub async fn thumbnail_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ThumbnailError> {
    let thumbnail = state.thumbnails.get_or_create(&key).await?;
    let cache_status = if thumbnail.cache_hit { "HIT" } else { "MISS" };

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (HeaderName::from_static(CACHE_STATUS_HEADER), cache_status),
        ],
        thumbnail.data,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current thumbnail store statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, StoreError> {
    let stats = state.store.stats()?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use image::{DynamicImage, RgbImage};
    use tempfile::TempDir;

    fn test_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::new(1600, 1200));
        let bytes = crate::thumbnail::encode_jpeg(&img, 90).unwrap();
        std::fs::write(dir.path().join("photo.jpg"), bytes).unwrap();

        let state = AppState::new(CacheStore::in_memory(), dir.path());
        (dir, state)
    }

    #[tokio::test]
    async fn test_thumbnail_handler_reports_cache_status() {
        let (_dir, state) = test_state();

        let first = thumbnail_handler(State(state.clone()), Path("photo.jpg".to_string()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(first.headers()[CACHE_STATUS_HEADER], "MISS");

        let second = thumbnail_handler(State(state), Path("photo.jpg".to_string()))
            .await
            .unwrap();
        assert_eq!(second.headers()[CACHE_STATUS_HEADER], "HIT");
    }

    #[tokio::test]
    async fn test_thumbnail_handler_missing_source() {
        let (_dir, state) = test_state();

        let result = thumbnail_handler(State(state), Path("nope.jpg".to_string())).await;
        assert!(matches!(result, Err(ThumbnailError::SourceNotFound { .. })));
    }

    #[tokio::test]
    async fn test_gallery_handler_lists_photo() {
        let (_dir, state) = test_state();

        let Html(page) = gallery_handler(State(state)).await.unwrap();
        assert!(page.contains(r#"<img src="/thumb/photo.jpg""#));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (_dir, state) = test_state();

        let response = stats_handler(State(state)).await.unwrap();
        assert_eq!(response.hits, 0);
        assert_eq!(response.writes, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
