//! Image upload filter.
//!
//! [`ImageUpload`] is an extractor that pulls the `image` file part out of a multipart body and
//! applies the [`ImageFilter`] rules while doing so. Because the checks run during extraction, a
//! rejected upload never reaches the handler body:
//!
//! - a declared content type outside the allow-list is rejected with `415 Unsupported Media Type`
//!   before any of the file is read. A part without a content type counts as
//!   `application/octet-stream`;
//! - a file growing past `max_file_size` is rejected with `413 Payload Too Large` as soon as the
//!   running total crosses the ceiling;
//! - a file part in any field other than `image`, or a second `image` file, is rejected with
//!   `400 Bad Request` ("Unexpected field").
//!
//! Accepted files are buffered in memory and handed to the handler as [`UploadedImage`]. Nothing
//! is written to disk.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use mime::Mime;
use tracing::{debug, info, instrument};

use crate::AppState;
use crate::config::UploadConfig;
use crate::errors::{Error, Result};

/// Multipart field that carries the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Extra body allowance on top of `max_file_size` for multipart framing and other small fields.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Content type and size rules for uploaded images.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    allowed_mime_types: Vec<Mime>,
    max_file_size: u64,
}

impl ImageFilter {
    /// Build the filter from config. Entries that do not parse as MIME types are skipped; config
    /// validation refuses them up front.
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            allowed_mime_types: config.allowed_mime_types.iter().filter_map(|m| m.parse().ok()).collect(),
            max_file_size: config.max_file_size,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Request body limit for routes using this filter.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_file_size).unwrap_or(usize::MAX).saturating_add(MULTIPART_OVERHEAD)
    }

    /// Whether `mime_type` is in the allow-list. Parameters such as `; charset=...` are ignored.
    pub fn is_allowed(&self, mime_type: &str) -> bool {
        let Ok(parsed) = mime_type.parse::<Mime>() else {
            return false;
        };
        self.allowed_mime_types.iter().any(|allowed| allowed.essence_str() == parsed.essence_str())
    }

    /// Returns the parsed type when it is allowed.
    pub fn check_mime(&self, mime_type: &str) -> Result<Mime> {
        match mime_type.parse::<Mime>() {
            Ok(parsed) if self.is_allowed(parsed.essence_str()) => Ok(parsed),
            _ => Err(Error::UnsupportedMediaType {
                message: "Unsupported file type.".to_string(),
            }),
        }
    }

    /// `size` is inclusive: a file of exactly `max_file_size` bytes passes.
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size <= self.max_file_size {
            Ok(())
        } else {
            Err(Error::PayloadTooLarge {
                message: "File too large.".to_string(),
            })
        }
    }
}

/// A file that passed the [`ImageFilter`].
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// `type/subtype` only, parameters stripped
    pub mime_type: String,
    pub file_name: Option<String>,
    pub data: Bytes,
}

impl UploadedImage {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Extractor for an optional, filtered `image` upload. `None` means the request carried no file
/// in the `image` field.
#[derive(Debug)]
pub struct ImageUpload(pub Option<UploadedImage>);

/// Content type the client declared for a file part, `application/octet-stream` when it declared
/// none. The file name is never consulted.
pub fn declared_mime(content_type: Option<&str>) -> String {
    content_type
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM.essence_str())
        .to_string()
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: "File too large.".to_string(),
        }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}

async fn read_image(mut field: Field<'_>, filter: &ImageFilter) -> Result<UploadedImage> {
    let file_name = field.file_name().map(str::to_string);
    let declared = declared_mime(field.content_type());

    let mime_type = match filter.check_mime(&declared) {
        Ok(parsed) => parsed.essence_str().to_string(),
        Err(e) => {
            info!(mime = %declared, file_name = ?file_name, "Rejecting upload with disallowed content type");
            return Err(e);
        }
    };

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        let size = (data.len() + chunk.len()) as u64;
        if let Err(e) = filter.check_size(size) {
            info!(
                mime = %mime_type,
                size = size,
                max_file_size = filter.max_file_size(),
                "File size limit exceeded, aborting upload"
            );
            return Err(e);
        }
        data.extend_from_slice(&chunk);
    }

    debug!(mime = %mime_type, size = data.len(), "Accepted image upload");

    Ok(UploadedImage {
        mime_type,
        file_name,
        data: data.freeze(),
    })
}

impl FromRequest<AppState> for ImageUpload {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|e| Error::BadRequest {
            message: e.body_text(),
        })?;

        let mut image = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            // Text fields are ignored, including one called `image`.
            if field.file_name().is_none() {
                continue;
            }

            if field.name() != Some(IMAGE_FIELD) || image.is_some() {
                debug!(field = ?field.name(), "Rejecting file in unexpected field");
                return Err(Error::BadRequest {
                    message: "Unexpected field".to_string(),
                });
            }

            image = Some(read_image(field, &state.image_filter).await?);
        }

        Ok(ImageUpload(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ImageFilter {
        ImageFilter::new(&UploadConfig::default())
    }

    #[test]
    fn test_default_allow_list() {
        let filter = filter();

        for allowed in ["image/jpeg", "image/png", "image/gif", "image/webp"] {
            assert!(filter.is_allowed(allowed), "{allowed} should be allowed");
            assert!(filter.check_mime(allowed).is_ok());
        }

        for rejected in ["image/svg+xml", "image/bmp", "application/pdf", "text/plain", "", "garbage"] {
            assert!(!filter.is_allowed(rejected), "{rejected} should be rejected");
            assert!(matches!(filter.check_mime(rejected), Err(Error::UnsupportedMediaType { .. })));
        }
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        let filter = filter();

        assert!(filter.is_allowed("image/png; name=cat.png"));
        let parsed = filter.check_mime("image/png; name=cat.png").unwrap();
        assert_eq!(parsed.essence_str(), "image/png");
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let filter = filter();

        assert!(filter.check_size(0).is_ok());
        assert!(filter.check_size(10 * 1024 * 1024).is_ok());
        assert!(matches!(
            filter.check_size(10 * 1024 * 1024 + 1),
            Err(Error::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_body_limit_leaves_room_for_framing() {
        let filter = filter();
        assert_eq!(filter.body_limit(), 10 * 1024 * 1024 + MULTIPART_OVERHEAD);
    }

    #[test]
    fn test_custom_config() {
        let filter = ImageFilter::new(&UploadConfig {
            max_file_size: 16,
            allowed_mime_types: vec!["image/png".to_string()],
        });

        assert!(filter.is_allowed("image/png"));
        assert!(!filter.is_allowed("image/jpeg"));
        assert!(filter.check_size(16).is_ok());
        assert!(filter.check_size(17).is_err());
    }

    #[test]
    fn test_declared_mime() {
        assert_eq!(declared_mime(Some("image/gif")), "image/gif");
        assert_eq!(declared_mime(Some("image/png; name=cat.png")), "image/png; name=cat.png");
        assert_eq!(declared_mime(Some("  ")), "application/octet-stream");
        assert_eq!(declared_mime(None), "application/octet-stream");
    }

    #[test]
    fn test_undeclared_type_is_rejected() {
        assert!(matches!(
            filter().check_mime(&declared_mime(None)),
            Err(Error::UnsupportedMediaType { .. })
        ));
    }
}
