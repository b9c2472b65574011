//! Detection → canonicalization → deduplication → selection → compositing
//!
//! The stages are plain functions over owned values; [`Replacer`] wires them
//! together with a [`ReplaceConfig`] for single images, and
//! [`crate::document`] drives it per page.

/// Near-duplicate suppression
pub mod dedup;
/// Placing replacements into quads
pub mod composite;
/// Area ranking and pairing
pub mod select;

pub use composite::{Placement, REPLACEMENT_FILTER, composite, composite_scaled};
pub use dedup::dedupe;
pub use select::{Assignment, Condition, Selection, select};

use image::RgbImage;

use crate::config::ReplaceConfig;
use crate::detector::{CodeLocator, Detector, FinderLocator};
use crate::error::{ReplaceError, Result};
use crate::models::{Quad, ReplacementImage};

/// Outcome of one single-image replacement
#[derive(Debug, Clone)]
pub struct ReplaceReport {
    /// The modified image
    pub image: RgbImage,
    /// Quads left after deduplication
    pub detected: usize,
    /// Quads that received a replacement
    pub replaced: usize,
    /// Non-fatal conditions recorded along the way
    pub conditions: Vec<Condition>,
}

/// Canonical, deduplicated detections for one raster frame.
pub fn detection_set<L: CodeLocator>(
    detector: &Detector<L>,
    image: &RgbImage,
    tolerance: f32,
) -> Result<Vec<Quad>> {
    let raw = detector.detect(image)?;
    let canonical: Vec<Quad> = raw.iter().map(|r| r.canonical()).collect();
    let quads = dedupe(&canonical, tolerance);
    tracing::debug!(raw = raw.len(), unique = quads.len(), "detection set");
    Ok(quads)
}

/// Single-image replacement with the built-in detector.
pub fn replace_in_image(
    image: &RgbImage,
    replacements: &[ReplacementImage],
    config: &ReplaceConfig,
) -> Result<RgbImage> {
    Replacer::new(*config).replace(image, replacements)
}

/// Configured replacement pipeline over a detection backend
#[derive(Debug, Clone)]
pub struct Replacer<L = FinderLocator> {
    detector: Detector<L>,
    config: ReplaceConfig,
}

impl Replacer<FinderLocator> {
    /// Pipeline over the built-in finder-pattern detector
    pub fn new(config: ReplaceConfig) -> Self {
        Self {
            detector: Detector::new(),
            config,
        }
    }
}

impl Default for Replacer<FinderLocator> {
    fn default() -> Self {
        Self::new(ReplaceConfig::default())
    }
}

impl<L: CodeLocator> Replacer<L> {
    /// Pipeline over a custom detection backend
    pub fn with_locator(locator: L, config: ReplaceConfig) -> Self {
        Self {
            detector: Detector::with_locator(locator),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ReplaceConfig {
        &self.config
    }

    /// The detector in use
    pub fn detector(&self) -> &Detector<L> {
        &self.detector
    }

    /// Replace codes in `image`, returning only the new raster.
    pub fn replace(&self, image: &RgbImage, replacements: &[ReplacementImage]) -> Result<RgbImage> {
        self.replace_with_report(image, replacements)
            .map(|report| report.image)
    }

    /// Replace codes in `image` and report what happened.
    ///
    /// `replacements` must be non-empty; with `replace_all` each retained
    /// code, largest first, takes the next replacement in order.
    pub fn replace_with_report(
        &self,
        image: &RgbImage,
        replacements: &[ReplacementImage],
    ) -> Result<ReplaceReport> {
        self.config.validate()?;
        if replacements.is_empty() {
            return Err(ReplaceError::replacement_invalid(
                "no replacement images supplied",
            ));
        }

        let quads = detection_set(&self.detector, image, self.config.tolerance)?;
        let selection = select(&quads, replacements, self.config.replace_all)?;
        let image = composite_scaled(
            image,
            &selection.assignments,
            self.config.placement,
            self.config.scale,
        );

        Ok(ReplaceReport {
            image,
            detected: quads.len(),
            replaced: selection.assignments.len(),
            conditions: selection.conditions,
        })
    }
}
