//! Frame decode and encode.
//!
//! Pushed frames arrive as `data:image/...;base64,` URLs. A malformed or
//! undecodable payload is a decode error reported to the caller; the frame
//! is dropped and counter state stays untouched.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Errors from frame payload handling.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The payload is not a `data:image` URL.
    #[error("payload is not a data:image URL")]
    NotAnImageUrl,

    /// The data URL has no base64 body.
    #[error("data URL carries no image body")]
    EmptyBody,

    /// The base64 body did not decode.
    #[error("invalid base64 image body: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not a decodable image.
    #[error("undecodable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode a `data:image/...;base64,` URL into an image.
pub fn decode_data_url(data_url: &str) -> Result<DynamicImage, FrameError> {
    if !data_url.starts_with("data:image") {
        return Err(FrameError::NotAnImageUrl);
    }
    let body = data_url
        .split_once(',')
        .map(|(_, body)| body)
        .ok_or(FrameError::EmptyBody)?;
    let bytes = BASE64.decode(body)?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Encode an image as a JPEG data URL for the response payload.
pub fn encode_data_url(frame: &DynamicImage) -> Result<String, FrameError> {
    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(frame.to_rgb8());
    let mut bytes = Cursor::new(Vec::new());
    rgb.write_to(&mut bytes, ImageFormat::Jpeg)?;
    Ok(format!(
        "data:image/jpeg;base64,{}",
        BASE64.encode(bytes.into_inner())
    ))
}

// =============================================================================
// TESTS
// =============================================================================
