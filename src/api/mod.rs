//! API Module
//!
//! HTTP handlers and routing for the gallery server.
//!
//! # Endpoints
//! - `GET /` - Gallery page
//! - `GET /original/*path` - Original image bytes
//! - `GET /thumb/*key` - Cached thumbnail
//! - `GET /stats` - Store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
