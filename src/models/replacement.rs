//! Replacement code images supplied by the caller.

use image::imageops;
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{ReplaceError, Result};

/// Raster to be placed into one detected quad.
///
/// Stored as RGBA; `has_alpha` records whether the source carried a real
/// alpha channel. Placement only ever reads it or resizes a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementImage {
    pixels: RgbaImage,
    has_alpha: bool,
}

impl ReplacementImage {
    /// Decode an encoded image (PNG, JPEG, ...) from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ReplaceError::replacement_invalid("empty image data"));
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ReplaceError::replacement_invalid(format!("cannot decode: {e}")))?;
        Self::from_dynamic(decoded)
    }

    /// Wrap an already decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let has_alpha = image.color().has_alpha();
        Self::checked(image.to_rgba8(), has_alpha)
    }

    /// Wrap an opaque RGB buffer.
    pub fn from_rgb(image: RgbImage) -> Result<Self> {
        Self::checked(DynamicImage::ImageRgb8(image).to_rgba8(), false)
    }

    /// Wrap an RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Result<Self> {
        Self::checked(image, true)
    }

    fn checked(pixels: RgbaImage, has_alpha: bool) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ReplaceError::replacement_invalid(format!(
                "zero-sized image ({}x{})",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels, has_alpha })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether the source image had an alpha channel
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// RGBA view
    pub fn rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Colour channels only
    pub fn to_rgb(&self) -> RgbImage {
        DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8()
    }

    /// Centre-crop to a square on the shorter side.
    pub fn square_cropped(&self) -> ReplacementImage {
        let (w, h) = self.pixels.dimensions();
        let side = w.min(h);
        if w == h {
            return self.clone();
        }
        let x = (w - side) / 2;
        let y = (h - side) / 2;
        let pixels = imageops::crop_imm(&self.pixels, x, y, side, side).to_image();
        ReplacementImage {
            pixels,
            has_alpha: self.has_alpha,
        }
    }
}
