//! Convert RGB pixels to luminance
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert packed RGB bytes (3 per pixel) to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = Vec::with_capacity(pixel_count);
    gray.extend(
        rgb.chunks_exact(3)
            .take(pixel_count)
            .map(|px| luma(px[0], px[1], px[2])),
    );
    gray.resize(pixel_count, 0);
    gray
}

/// Convert packed RGBA bytes (4 per pixel) to grayscale, ignoring alpha
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = Vec::with_capacity(pixel_count);
    gray.extend(
        rgba.chunks_exact(4)
            .take(pixel_count)
            .map(|px| luma(px[0], px[1], px[2])),
    );
    gray.resize(pixel_count, 0);
    gray
}
