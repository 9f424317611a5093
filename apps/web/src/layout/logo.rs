use std::path::Path;

use image::{io::Reader as ImageReader, DynamicImage};
use thiserror::Error;

use crate::layout::commands::LogoImage;

/// Longest edge kept for an embedded logo. The logo is printed at 70pt, so
/// this is roughly 300 dpi.
const MAX_LOGO_EDGE_PX: u32 = 300;

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("could not read logo file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode logo image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("logo image is empty")]
    Empty,
}

/// Reads and decodes a logo, sniffing the format from its content.
///
/// Large images are downscaled so the longest edge is at most
/// `MAX_LOGO_EDGE_PX`; the result is deterministic for identical input bytes.
pub fn load_logo(path: &Path) -> Result<LogoImage, LogoError> {
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    logo_from_dynamic(decoded)
}

fn logo_from_dynamic(image: DynamicImage) -> Result<LogoImage, LogoError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LogoError::Empty);
    }

    let image = if image.width() > MAX_LOGO_EDGE_PX || image.height() > MAX_LOGO_EDGE_PX {
        image.thumbnail(MAX_LOGO_EDGE_PX, MAX_LOGO_EDGE_PX)
    } else {
        image
    };

    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for px in rgba.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            alpha.push(px.0[3]);
        }
        Ok(LogoImage {
            width,
            height,
            rgb,
            alpha: Some(alpha),
        })
    } else {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(LogoImage {
            width,
            height,
            rgb: rgb.into_raw(),
            alpha: None,
        })
    }
}
