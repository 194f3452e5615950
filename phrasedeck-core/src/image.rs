//! Image fetching and validation.
//!
//! Candidate URLs come from a third-party search index, so both the declared
//! content types and the payloads themselves are untrusted. Every candidate
//! goes through two gates before it can be scored:
//!
//! 1. the fetch gate: the response's Content-Type header must be on the
//!    jpeg/png/webp allow-list;
//! 2. the validation gate: the payload's magic bytes must agree with the
//!    candidate's declared format, and the payload must survive a full
//!    decode.
//!
//! Failures at either gate drop the single candidate. They never fail the
//! phrase.

use image::ImageFormat;
use thiserror::Error;

use crate::http::HttpClient;
use crate::types::{Candidate, FetchedCandidate, ImageMime};

/// Maximum accepted image payload (10MB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("image is {0} bytes (max {MAX_IMAGE_BYTES})")]
    TooLarge(usize),

    #[error("could not detect an image format from the payload")]
    UnknownFormat,

    #[error("sniffed format {sniffed} does not match declared {declared}")]
    MimeMismatch {
        declared: &'static str,
        sniffed: &'static str,
    },

    #[error("image failed to decode: {0}")]
    Corrupt(String),
}

fn expected_format(mime: ImageMime) -> ImageFormat {
    match mime {
        ImageMime::Jpeg => ImageFormat::Jpeg,
        ImageMime::Png => ImageFormat::Png,
        ImageMime::Webp => ImageFormat::WebP,
    }
}

/// Validate an image payload against its declared format.
///
/// Sniffs the true format from magic bytes first (a mismatch is a rejection
/// even if the payload would decode), then runs a full decode pass to catch
/// truncated or corrupt data.
pub fn validate_image(data: &[u8], declared: ImageMime) -> Result<(), ValidationError> {
    if data.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge(data.len()));
    }

    let sniffed = image::guess_format(data).map_err(|_| ValidationError::UnknownFormat)?;

    if sniffed != expected_format(declared) {
        return Err(ValidationError::MimeMismatch {
            declared: declared.as_mime(),
            sniffed: sniffed.to_mime_type(),
        });
    }

    image::load_from_memory_with_format(data, sniffed)
        .map_err(|e| ValidationError::Corrupt(e.to_string()))?;

    Ok(())
}

/// Fetch candidate payloads, applying the Content-Type allow-list.
///
/// Each surviving entry carries the index of its candidate in the original
/// search result list. Failed or filtered fetches are logged and dropped.
pub async fn fetch_candidates<C: HttpClient>(
    client: &C,
    candidates: &[Candidate],
) -> Vec<FetchedCandidate> {
    let mut fetched = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let response = match client.get(&candidate.url).await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url = %candidate.url, error = %e, "candidate fetch failed");
                continue;
            }
        };

        if !response.is_success() {
            tracing::debug!(url = %candidate.url, status = response.status, "candidate fetch failed");
            continue;
        }

        let header_mime = response
            .content_type
            .as_deref()
            .and_then(ImageMime::from_mime);
        if header_mime.is_none() {
            tracing::debug!(
                url = %candidate.url,
                content_type = response.content_type.as_deref().unwrap_or("<none>"),
                "candidate content type not on allow-list"
            );
            continue;
        }

        fetched.push(FetchedCandidate {
            original_index: index,
            url: candidate.url.clone(),
            mime: candidate.mime,
            data: response.body,
        });
    }

    fetched
}

/// Keep only candidates whose payloads validate, preserving order and
/// original indices.
pub fn validate_candidates(fetched: Vec<FetchedCandidate>) -> Vec<FetchedCandidate> {
    fetched
        .into_iter()
        .filter(|c| match validate_image(&c.data, c.mime) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(url = %c.url, error = %e, "candidate rejected by validation");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockClient;
    use crate::types::ConfidenceTier;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([120, 40, 200]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 220, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    }

    fn candidate(url: &str, mime: ImageMime) -> Candidate {
        Candidate {
            url: url.to_string(),
            mime,
            confidence: ConfidenceTier::Low,
        }
    }

    #[test]
    fn accepts_matching_png() {
        assert!(validate_image(&png_bytes(), ImageMime::Png).is_ok());
    }

    #[test]
    fn rejects_decodable_image_with_wrong_declared_type() {
        // A perfectly valid PNG claimed to be a JPEG must still be rejected.
        let result = validate_image(&png_bytes(), ImageMime::Jpeg);
        assert!(matches!(result, Err(ValidationError::MimeMismatch { .. })));
    }

    #[test]
    fn rejects_truncated_payload() {
        let data = png_bytes();
        let truncated = &data[..data.len() / 2];
        let result = validate_image(truncated, ImageMime::Png);
        assert!(matches!(result, Err(ValidationError::Corrupt(_))));
    }

    #[test]
    fn rejects_non_image_data() {
        let result = validate_image(b"definitely not an image", ImageMime::Png);
        assert!(matches!(result, Err(ValidationError::UnknownFormat)));
    }

    #[test]
    fn rejects_oversized_payload() {
        let data = vec![0u8; MAX_IMAGE_BYTES + 1];
        let result = validate_image(&data, ImageMime::Png);
        assert!(matches!(result, Err(ValidationError::TooLarge(_))));
    }

    #[tokio::test]
    async fn fetch_filters_on_content_type_header() {
        let candidates = vec![
            candidate("http://img/a.png", ImageMime::Png),
            candidate("http://img/b.png", ImageMime::Png),
            candidate("http://img/c.jpg", ImageMime::Jpeg),
        ];
        let client = MockClient::new()
            .with_bytes("http://img/a.png", "image/png", png_bytes())
            .with_bytes("http://img/b.png", "text/html", b"<html>".to_vec())
            .with_bytes("http://img/c.jpg", "image/jpeg", jpeg_bytes());

        let fetched = fetch_candidates(&client, &candidates).await;
        let indices: Vec<usize> = fetched.iter().map(|f| f.original_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[tokio::test]
    async fn fetch_drops_failures_without_erroring() {
        let candidates = vec![
            candidate("http://img/down.png", ImageMime::Png),
            candidate("http://img/gone.png", ImageMime::Png),
            candidate("http://img/ok.png", ImageMime::Png),
        ];
        let client = MockClient::new()
            .with_error("http://img/down.png", "connection refused")
            .with_status("http://img/gone.png", 404, Some("image/png"), vec![])
            .with_bytes("http://img/ok.png", "image/png", png_bytes());

        let fetched = fetch_candidates(&client, &candidates).await;
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].original_index, 2);
    }

    #[test]
    fn validation_preserves_original_indices() {
        let fetched = vec![
            FetchedCandidate {
                original_index: 1,
                url: "http://img/bad".to_string(),
                mime: ImageMime::Png,
                data: b"junk".to_vec(),
            },
            FetchedCandidate {
                original_index: 3,
                url: "http://img/good".to_string(),
                mime: ImageMime::Png,
                data: png_bytes(),
            },
        ];

        let valid = validate_candidates(fetched);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].original_index, 3);
    }
}
