//! Thumbnail generation and caching.
//!
//! - [`Thumbnailer`]: JPEG decode, EXIF orientation, Lanczos resize, JPEG encode
//! - [`ThumbnailService`]: transactional get-or-create over the [`CacheStore`](crate::cache::CacheStore)

mod pipeline;
mod service;

pub use pipeline::{
    apply_orientation, decode_upright, encode_jpeg, resize_to_width, scaled_height, Thumbnailer,
    DEFAULT_JPEG_QUALITY, THUMBNAIL_WIDTH,
};
pub use service::{resolve_source, SourceKey, Thumbnail, ThumbnailService, THUMBNAIL_TTL};
