use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use thiserror::Error;

use super::turn::{ImageAttachment, TurnInput};

/// Image types the upload field accepts.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read the submitted form: {0}")]
    Multipart(String),

    #[error("unsupported image type {0}; upload a JPG or PNG file")]
    UnsupportedImage(String),

    #[error("image exceeds {limit} bytes; upload a smaller file")]
    TooLarge { limit: usize },
}

impl InputError {
    fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            InputError::TooLarge { limit }
        } else {
            InputError::Multipart(err.to_string())
        }
    }
}

/// Read the `prompt` field and the optional `image` file from the chat form.
///
/// An empty file field means no image was attached. Images larger than
/// `max_image_bytes` are rejected.
pub async fn collect_input(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<TurnInput, InputError> {
    let mut prompt = String::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InputError::from_multipart(e, max_image_bytes))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("prompt") => {
                prompt = field
                    .text()
                    .await
                    .map_err(|e| InputError::from_multipart(e, max_image_bytes))?;
            }
            Some("image") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty());
                let declared = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| InputError::from_multipart(e, max_image_bytes))?;
                if bytes.is_empty() {
                    continue;
                }
                if bytes.len() > max_image_bytes {
                    return Err(InputError::TooLarge {
                        limit: max_image_bytes,
                    });
                }
                image = Some(image_attachment(bytes.to_vec(), file_name, declared.as_deref())?);
            }
            _ => {}
        }
    }

    Ok(TurnInput { prompt, image })
}

/// Wrap uploaded bytes, rejecting anything that is not an accepted image type.
pub fn image_attachment(
    bytes: Vec<u8>,
    file_name: Option<String>,
    declared: Option<&str>,
) -> Result<ImageAttachment, InputError> {
    let mime_type = detect_mime_type(&bytes, file_name.as_deref(), declared)
        .unwrap_or_else(|| "application/octet-stream".to_string());

    if !ACCEPTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
        return Err(InputError::UnsupportedImage(mime_type));
    }

    Ok(ImageAttachment {
        bytes,
        mime_type,
        file_name,
    })
}

/// Magic bytes first, then the file extension, then whatever the browser declared.
pub fn detect_mime_type(
    bytes: &[u8],
    file_name: Option<&str>,
    declared: Option<&str>,
) -> Option<String> {
    if let Some(sniffed) = sniff(bytes) {
        return Some(sniffed.to_string());
    }

    if let Some(guess) = file_name.and_then(|name| mime_guess::from_path(name).first()) {
        return Some(guess.essence_str().to_string());
    }

    declared
        .filter(|d| !d.is_empty() && *d != "application/octet-stream")
        .map(str::to_string)
}

fn sniff(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_beat_the_file_name() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert_eq!(
            detect_mime_type(&jpeg, Some("photo.png"), Some("image/png")).as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn falls_back_to_extension_then_declared_type() {
        let unknown = [0x00, 0x01, 0x02];
        assert_eq!(
            detect_mime_type(&unknown, Some("scan.PNG"), None).as_deref(),
            Some("image/png")
        );
        assert_eq!(
            detect_mime_type(&unknown, None, Some("image/jpeg")).as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            detect_mime_type(&unknown, None, Some("application/octet-stream")),
            None
        );
    }

    #[test]
    fn gif_uploads_are_rejected() {
        let result = image_attachment(b"GIF89a....".to_vec(), Some("anim.gif".to_string()), None);
        match result {
            Err(InputError::UnsupportedImage(mime)) => assert_eq!(mime, "image/gif"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn png_upload_keeps_bytes_and_name() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x42];
        let image = image_attachment(png.clone(), Some("bike.png".to_string()), None).unwrap();
        assert_eq!(image.bytes, png);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.file_name.as_deref(), Some("bike.png"));
    }
}
