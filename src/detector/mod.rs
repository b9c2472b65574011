//! QR symbol location
//!
//! This module finds where codes are, not what they say:
//! - Finder pattern detection (the three square markers)
//! - Grouping markers into oriented triples and extrapolating symbol corners
//! - The [`CodeLocator`] capability and the [`Detector`] that hides its two
//!   result shapes behind one call

/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Grouping finder patterns into symbols
pub mod grouping;
/// Detection backends
pub mod locator;

pub use locator::{CodeLocator, FinderLocator};

use image::RgbImage;

use crate::error::Result;
use crate::models::RawQuad;

/// Unified detection façade over a [`CodeLocator`].
///
/// Tries the multi-region strategy first and falls back to the single-region
/// strategy only when that finds nothing. An empty result is not an error.
#[derive(Debug, Clone, Default)]
pub struct Detector<L = FinderLocator> {
    locator: L,
}

impl Detector<FinderLocator> {
    /// Detector over the built-in finder-pattern backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: CodeLocator> Detector<L> {
    /// Detector over any backend
    pub fn with_locator(locator: L) -> Self {
        Self { locator }
    }

    /// The wrapped backend
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Raw quads found in `image`, possibly none.
    ///
    /// Fails with `DetectorUnavailable` if the backend cannot run and with
    /// `InvalidGeometry` if it reports a region without exactly 4 corners.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<RawQuad>> {
        let regions = self.locator.locate_all(image)?;
        if !regions.is_empty() {
            tracing::debug!(regions = regions.len(), "multi-region detection");
            return regions
                .iter()
                .map(|points| RawQuad::try_from(points.as_slice()))
                .collect();
        }

        match self.locator.locate_one(image)? {
            Some(points) => {
                tracing::debug!("multi-region found nothing, single-region hit");
                Ok(vec![RawQuad::new(points)])
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplaceError;
    use crate::models::Point;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        all: Vec<Vec<Point>>,
        one: Option<[Point; 4]>,
        single_calls: AtomicUsize,
    }

    impl CodeLocator for Scripted {
        fn locate_all(&self, _: &RgbImage) -> Result<Vec<Vec<Point>>> {
            Ok(self.all.clone())
        }

        fn locate_one(&self, _: &RgbImage) -> Result<Option<[Point; 4]>> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.one)
        }
    }

    struct Offline;

    impl CodeLocator for Offline {
        fn locate_all(&self, _: &RgbImage) -> Result<Vec<Vec<Point>>> {
            Err(ReplaceError::detector_unavailable("backend offline"))
        }

        fn locate_one(&self, _: &RgbImage) -> Result<Option<[Point; 4]>> {
            panic!("single-region must not run after a hard failure");
        }
    }

    fn corners(x: f32) -> [Point; 4] {
        [
            Point::new(x, 0.0),
            Point::new(x + 10.0, 0.0),
            Point::new(x + 10.0, 10.0),
            Point::new(x, 10.0),
        ]
    }

    #[test]
    fn test_multi_region_wins_without_fallback() {
        let d = Detector::with_locator(Scripted {
            all: vec![corners(0.0).to_vec(), corners(50.0).to_vec()],
            one: Some(corners(100.0)),
            single_calls: AtomicUsize::new(0),
        });
        let found = d.detect(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(d.locator().single_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_falls_back_to_single_region() {
        let d = Detector::with_locator(Scripted {
            all: Vec::new(),
            one: Some(corners(100.0)),
            single_calls: AtomicUsize::new(0),
        });
        let found = d.detect(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(found, vec![RawQuad::new(corners(100.0))]);
    }

    #[test]
    fn test_nothing_found_is_empty_not_error() {
        let d = Detector::with_locator(Scripted {
            all: Vec::new(),
            one: None,
            single_calls: AtomicUsize::new(0),
        });
        assert!(d.detect(&RgbImage::new(4, 4)).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_region_is_invalid_geometry() {
        let d = Detector::with_locator(Scripted {
            all: vec![corners(0.0)[..3].to_vec()],
            one: None,
            single_calls: AtomicUsize::new(0),
        });
        assert!(matches!(
            d.detect(&RgbImage::new(4, 4)),
            Err(ReplaceError::InvalidGeometry { count: 3 })
        ));
    }

    #[test]
    fn test_unavailable_backend_fails_fast() {
        let d = Detector::with_locator(Offline);
        assert!(matches!(
            d.detect(&RgbImage::new(4, 4)),
            Err(ReplaceError::DetectorUnavailable { .. })
        ));
    }

    #[test]
    fn test_finder_locator_rejects_empty_raster() {
        let d = Detector::new();
        assert!(matches!(
            d.detect(&RgbImage::new(0, 0)),
            Err(ReplaceError::DetectorUnavailable { .. })
        ));
    }

    #[test]
    fn test_finder_locator_blank_image() {
        let img = RgbImage::from_pixel(120, 90, image::Rgb([255, 255, 255]));
        assert!(Detector::new().detect(&img).unwrap().is_empty());
    }
}
