//! Utility functions for image processing
//!
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (Otsu's method and local-mean adaptive thresholding)
//! - Geometry (perspective transforms, bilinear sampling)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
