//! Gallery Module
//!
//! Lists the JPEG files of the served directory and renders them into the
//! gallery page.

use std::path::Path;

use crate::error::GalleryError;

/// Shown instead of the image column when the directory has no JPEGs.
pub const EMPTY_GALLERY_MESSAGE: &str = "No photos right now!";

/// Returns true for names ending in `.jpg` or `.jpeg`, ignoring case.
pub fn is_jpeg(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Lists JPEG file names directly inside `dir`, in enumeration order.
///
/// Subdirectories and names that are not valid UTF-8 are skipped.
pub async fn list_images(dir: &Path) -> Result<Vec<String>, GalleryError> {
    let listing_failed = |source: std::io::Error| GalleryError::ListingFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(listing_failed)?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(listing_failed)? {
        let file_type = entry.file_type().await.map_err(listing_failed)?;
        if file_type.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_jpeg(name) {
                images.push(name.to_string());
            }
        }
    }

    Ok(images)
}

/// Renders the gallery page for `images`.
pub fn render_page(images: &[String]) -> String {
    let body = if images.is_empty() {
        format!("<strong>{}</strong>", EMPTY_GALLERY_MESSAGE)
    } else {
        images
            .iter()
            .map(|name| {
                let encoded = urlencoding::encode(name);
                format!(
                    r#"<a href="/original/{0}"><img src="/thumb/{0}" alt="{1}"></a>"#,
                    encoded,
                    html_escape(name)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\t\t\t")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="UTF-8">
		<title>Photos</title>
		<style>
			img {{ max-width: 700px; }}
			body {{ font-family: system-ui, sans-serif; }}
		</style>
	</head>
	<body>
		<div style="display: flex; flex-direction: column; row-gap: 10px; margin-left: 10px; margin-top: 10px;">
			{body}
		</div>
	</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
