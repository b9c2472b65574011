//! Core data structures

/// Thresholded rasters
pub mod binary;
/// Document pages and processed output
pub mod page;
/// 2D points
pub mod point;
/// Raw and canonical quads
pub mod quad;
/// Caller-supplied replacement images
pub mod replacement;

pub use binary::BinaryImage;
pub use page::{OutputSequence, PageFrame};
pub use point::Point;
pub use quad::{BoundingBox, PixelRect, Quad, RawQuad, canonicalize};
pub use replacement::ReplacementImage;
