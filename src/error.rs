//! Error types for the replacement pipeline.

use thiserror::Error;

/// Errors that abort a replacement call.
///
/// A shortage of replacement images is not an error; it is recorded as a
/// [`Condition`](crate::pipeline::Condition) on the selection instead.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// A point set handed to canonicalization did not have exactly 4 points.
    #[error("invalid geometry: expected 4 points, got {count}")]
    InvalidGeometry {
        /// Number of points actually supplied.
        count: usize,
    },

    /// Nothing was left after detection and deduplication.
    #[error("no QR code detected")]
    NoCodeDetected,

    /// A replacement image was missing, empty or could not be decoded.
    #[error("replacement image invalid: {reason}")]
    ReplacementImageInvalid {
        /// What was wrong with it.
        reason: String,
    },

    /// The document renderer could not produce a raster for a page.
    #[error("page {page} could not be rendered: {reason}")]
    PageRenderFailure {
        /// Zero-based page index.
        page: usize,
        /// Renderer-supplied reason.
        reason: String,
    },

    /// The detection capability is not usable for this input.
    #[error("detector unavailable: {reason}")]
    DetectorUnavailable {
        /// Why the locator refused to run.
        reason: String,
    },

    /// The document writer failed to assemble the output frames.
    #[error("document assembly failed: {reason}")]
    DocumentWriteFailure {
        /// Writer-supplied reason.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Which value and why.
        message: String,
    },

    /// Image encode/decode error.
    #[error("image")]
    Image(#[from] image::ImageError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl ReplaceError {
    /// Shorthand for [`ReplaceError::ReplacementImageInvalid`].
    pub fn replacement_invalid(reason: impl Into<String>) -> Self {
        Self::ReplacementImageInvalid {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ReplaceError::PageRenderFailure`].
    pub fn page_render(page: usize, reason: impl Into<String>) -> Self {
        Self::PageRenderFailure {
            page,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ReplaceError::DetectorUnavailable`].
    pub fn detector_unavailable(reason: impl Into<String>) -> Self {
        Self::DetectorUnavailable {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ReplaceError::InvalidConfig`].
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReplaceError>;
