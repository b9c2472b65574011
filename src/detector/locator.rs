//! Detection backends.

use image::RgbImage;

use crate::detector::finder::{FinderDetector, FinderPattern};
use crate::detector::grouping::{
    FinderTriple, group_finder_patterns, group_score, order_finder_patterns,
};
use crate::error::{ReplaceError, Result};
use crate::models::{BinaryImage, Point};
use crate::utils::binarization::{adaptive_binarize, otsu_binarize};
use crate::utils::grayscale::rgb_to_grayscale;

/// A code detection capability.
///
/// Backends expose two strategies with different result shapes; only
/// [`Detector`](crate::detector::Detector) should call them directly.
pub trait CodeLocator: Send + Sync {
    /// Multi-region strategy: one corner polygon per symbol found, corners in
    /// whatever order the backend produces them.
    fn locate_all(&self, image: &RgbImage) -> Result<Vec<Vec<Point>>>;

    /// Single-region strategy: the most prominent symbol's four corners, if any.
    fn locate_one(&self, image: &RgbImage) -> Result<Option<[Point; 4]>>;
}

impl<T: CodeLocator + ?Sized> CodeLocator for Box<T> {
    fn locate_all(&self, image: &RgbImage) -> Result<Vec<Vec<Point>>> {
        (**self).locate_all(image)
    }

    fn locate_one(&self, image: &RgbImage) -> Result<Option<[Point; 4]>> {
        (**self).locate_one(image)
    }
}

/// Built-in backend: finds symbols by their three finder markers.
///
/// No payload is decoded; a symbol is any right-angle triple of markers with
/// a consistent module size.
#[derive(Debug, Clone, Copy)]
pub struct FinderLocator {
    /// Images with either side at or above this use adaptive thresholding first
    pub adaptive_min_side: usize,
    /// Adaptive threshold window
    pub adaptive_block: usize,
    /// Markers with smaller modules are ignored
    pub min_module_size: f32,
}

impl Default for FinderLocator {
    fn default() -> Self {
        Self {
            adaptive_min_side: 800,
            adaptive_block: 31,
            min_module_size: 1.0,
        }
    }
}

impl FinderLocator {
    /// Backend with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    fn grayscale(&self, image: &RgbImage) -> Result<(Vec<u8>, usize, usize)> {
        let (w, h) = (image.width() as usize, image.height() as usize);
        if w == 0 || h == 0 {
            return Err(ReplaceError::detector_unavailable(format!(
                "cannot scan a {w}x{h} raster"
            )));
        }
        Ok((rgb_to_grayscale(image.as_raw(), w, h), w, h))
    }

    fn prefers_adaptive(&self, width: usize, height: usize) -> bool {
        width >= self.adaptive_min_side || height >= self.adaptive_min_side
    }

    fn binarize(&self, gray: &[u8], width: usize, height: usize, adaptive: bool) -> BinaryImage {
        if adaptive {
            adaptive_binarize(gray, width, height, self.adaptive_block)
        } else {
            otsu_binarize(gray, width, height)
        }
    }

    fn oriented(&self, patterns: &[FinderPattern], group: &[usize; 3]) -> Option<FinderTriple> {
        order_finder_patterns(
            &patterns[group[0]],
            &patterns[group[1]],
            &patterns[group[2]],
            self.min_module_size,
        )
    }
}

impl CodeLocator for FinderLocator {
    fn locate_all(&self, image: &RgbImage) -> Result<Vec<Vec<Point>>> {
        let (gray, w, h) = self.grayscale(image)?;
        let primary = self.prefers_adaptive(w, h);

        let mut patterns = FinderDetector::detect(&self.binarize(&gray, w, h, primary));
        if patterns.len() < 3 {
            let fallback = FinderDetector::detect(&self.binarize(&gray, w, h, !primary));
            if fallback.len() >= 3 {
                patterns = fallback;
            }
        }
        tracing::debug!(patterns = patterns.len(), "finder patterns (multi-region)");

        let regions: Vec<Vec<Point>> = group_finder_patterns(&patterns, true)
            .iter()
            .filter_map(|g| self.oriented(&patterns, g))
            .map(|t| t.outer_corners().to_vec())
            .collect();
        Ok(regions)
    }

    fn locate_one(&self, image: &RgbImage) -> Result<Option<[Point; 4]>> {
        let (gray, w, h) = self.grayscale(image)?;
        // The multi-region pass already tried the preferred binarizer first.
        let adaptive = !self.prefers_adaptive(w, h);
        let patterns = FinderDetector::detect(&self.binarize(&gray, w, h, adaptive));
        tracing::debug!(patterns = patterns.len(), "finder patterns (single-region)");

        let best = group_finder_patterns(&patterns, false)
            .into_iter()
            .filter_map(|g| self.oriented(&patterns, &g).map(|t| (group_score(&patterns, &g), t)))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        Ok(best.map(|(_, t)| t.outer_corners()))
    }
}
