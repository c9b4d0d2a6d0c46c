//! API Routes
//!
//! Configures the Axum router with all gallery server endpoints.

use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{
    gallery_handler, health_handler, stats_handler, thumbnail_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Gallery page
/// - `GET /original/*path` - Original file bytes (static file semantics)
/// - `GET /thumb/*key` - Cached 800px JPEG thumbnail
/// - `GET /stats` - Thumbnail store statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin to embed images
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers(Any);

    let originals = ServeDir::new(state.directory.as_path());

    Router::new()
        .route("/", get(gallery_handler))
        .route("/thumb/*key", get(thumbnail_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .nest_service("/original", originals)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("raw.jpg"), b"original bytes").unwrap();
        let state = AppState::new(CacheStore::in_memory(), dir.path());
        (dir, create_router(state))
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_dir, app) = create_test_app();
        assert_eq!(get_status(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (_dir, app) = create_test_app();
        assert_eq!(get_status(app, "/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gallery_endpoint() {
        let (_dir, app) = create_test_app();
        assert_eq!(get_status(app, "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_original_endpoint() {
        let (_dir, app) = create_test_app();
        assert_eq!(get_status(app.clone(), "/original/raw.jpg").await, StatusCode::OK);
        assert_eq!(get_status(app, "/original/gone.jpg").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_thumbnail_of_invalid_jpeg_is_server_error() {
        let (_dir, app) = create_test_app();
        assert_eq!(
            get_status(app, "/thumb/raw.jpg").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
