/// Poster derivation from the full-size cover image
use crate::error::Result;
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Poster height/width ratio used by media libraries
pub const DEFAULT_POSTER_RATIO: f64 = 1.42;

/// Crop width used when the cover cannot be read
pub const FALLBACK_POSTER_WIDTH: u32 = 378;

/// Crop rectangle size in pixels. A height of 0 means "no explicit height":
/// the crop keeps the full image height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn fallback(width: u32) -> Self {
        Self { width, height: 0 }
    }
}

/// Compute the poster crop for a cover of `height` x `width` pixels.
///
/// Covers flatter than `ratio` are cropped to their full height; taller ones
/// keep their full width. Fractional pixels are truncated.
pub fn poster_geometry(height: u32, width: u32, ratio: f64) -> Geometry {
    if width == 0 || ratio <= 0.0 {
        return Geometry { width, height };
    }

    if (height as f64) / (width as f64) < ratio {
        Geometry {
            width: ((height as f64) / ratio) as u32,
            height,
        }
    } else {
        Geometry {
            width,
            height: ((width as f64) * ratio) as u32,
        }
    }
}

/// Poster geometry for the cover image at `cover`, or the fallback geometry
/// when the image header cannot be decoded
pub fn cover_geometry(cover: &Path, ratio: f64, fallback_width: u32) -> Geometry {
    match image::image_dimensions(cover) {
        Ok((width, height)) => {
            let geometry = poster_geometry(height, width, ratio);
            debug!(
                "Cover {}x{} -> poster {}x{}",
                width, height, geometry.width, geometry.height
            );
            geometry
        }
        Err(e) => {
            warn!("Could not read cover {}: {}, using fallback width", cover.display(), e);
            Geometry::fallback(fallback_width)
        }
    }
}

/// Crop `img` to `geometry` anchored at the top-left corner, clamped to the
/// image bounds
pub fn crop(img: &DynamicImage, geometry: Geometry) -> DynamicImage {
    let (img_width, img_height) = img.dimensions();
    let width = geometry.width.min(img_width);
    let height = if geometry.height == 0 {
        img_height
    } else {
        geometry.height.min(img_height)
    };
    img.crop_imm(0, 0, width, height)
}

/// Decode `src`, crop it and write the result to `dst` as JPEG
pub fn crop_and_save(src: &Path, dst: &Path, geometry: Geometry) -> Result<()> {
    let img = image::open(src)?;
    let poster = crop(&img, geometry);
    DynamicImage::ImageRgb8(poster.to_rgb8()).save_with_format(dst, ImageFormat::Jpeg)?;
    Ok(())
}
