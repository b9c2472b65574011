//! Replacement configuration.
//!
//! Every stage takes its parameters from a [`ReplaceConfig`] passed in by the
//! caller. [`ReplaceConfig::from_env`] is the only place environment variables
//! are read, and only when a caller asks for it.

use crate::error::{ReplaceError, Result};
use crate::pipeline::Placement;

/// Corner tolerance (pixels) under which two detections are the same code.
pub const DEFAULT_TOLERANCE: f32 = 3.0;
/// Zoom factor used to rasterize document pages before detection.
pub const DEFAULT_ZOOM: f32 = 3.0;

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

/// Parameters threaded through detection, selection and compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplaceConfig {
    /// Componentwise corner tolerance used by deduplication.
    pub tolerance: f32,
    /// Page rasterization zoom for document mode.
    pub zoom: f32,
    /// How replacements are placed into their target quads.
    pub placement: Placement,
    /// Replace every detected code instead of only the largest.
    pub replace_all: bool,
    /// Growth of the axis-aligned target box about its centre (1.0 = exact fit).
    pub scale: f32,
    /// Process document pages on the rayon pool.
    pub parallel_pages: bool,
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            zoom: DEFAULT_ZOOM,
            placement: Placement::AxisAligned,
            replace_all: false,
            scale: 1.0,
            parallel_pages: true,
        }
    }
}

impl ReplaceConfig {
    /// Defaults overridden by `QR_SWAP_TOLERANCE`, `QR_SWAP_ZOOM`,
    /// `QR_SWAP_SCALE` and `QR_SWAP_REPLACE_ALL` when set.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            tolerance: parse_env_f32("QR_SWAP_TOLERANCE", base.tolerance),
            zoom: parse_env_f32("QR_SWAP_ZOOM", base.zoom),
            scale: parse_env_f32("QR_SWAP_SCALE", base.scale),
            replace_all: parse_env_bool_u8("QR_SWAP_REPLACE_ALL", base.replace_all),
            ..base
        }
    }

    /// Set the deduplication tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the page zoom factor.
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the placement strategy.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the replace-all policy.
    pub fn with_replace_all(mut self, replace_all: bool) -> Self {
        self.replace_all = replace_all;
        self
    }

    /// Set the box growth factor for axis-aligned placement.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel_pages(mut self, parallel: bool) -> Self {
        self.parallel_pages = parallel;
        self
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ReplaceError::invalid_config(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(ReplaceError::invalid_config(format!(
                "zoom must be positive, got {}",
                self.zoom
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ReplaceError::invalid_config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}
