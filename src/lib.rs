//! qr_swap - find QR codes and swap them for another code
//!
//! Locates QR symbols in a raster image (or every page of a rendered
//! document) and places a replacement code image into each located region,
//! leaving the rest of the image untouched.
//!
//! ```no_run
//! use qr_swap::{ReplaceConfig, ReplacementImage, Replacer};
//!
//! let ticket = image::open("ticket.png").unwrap().to_rgb8();
//! let code = ReplacementImage::from_bytes(&std::fs::read("new_code.png").unwrap()).unwrap();
//! let replacer = Replacer::new(ReplaceConfig::default().with_replace_all(true));
//! let swapped = replacer.replace(&ticket, &[code]).unwrap();
//! swapped.save("ticket_swapped.png").unwrap();
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Replacement parameters
pub mod config;
/// QR symbol location (finder patterns, grouping, backends)
pub mod detector;
/// Multi-page documents
pub mod document;
/// Error types
pub mod error;
/// Core data structures (Point, Quad, ReplacementImage, PageFrame, ...)
pub mod models;
/// Per-image stages: dedupe, select, composite
pub mod pipeline;
/// File helpers used by the CLI
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::ReplaceConfig;
pub use detector::{CodeLocator, Detector, FinderLocator};
pub use document::{DocumentWriter, ImageSequenceWriter, PageRenderer, process_document};
pub use error::{ReplaceError, Result};
pub use models::{OutputSequence, PageFrame, Point, Quad, RawQuad, ReplacementImage, canonicalize};
pub use pipeline::{
    Assignment, Condition, Placement, ReplaceReport, Replacer, Selection, composite, dedupe,
    replace_in_image, select,
};
