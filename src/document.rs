//! Multi-page documents
//!
//! Rendering and writing are external collaborators behind [`PageRenderer`]
//! and [`DocumentWriter`]. Every page must contain a code: one page failing
//! fails the whole document, and no partial output is ever returned.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use rayon::prelude::*;

use crate::config::ReplaceConfig;
use crate::detector::{CodeLocator, Detector};
use crate::error::{ReplaceError, Result};
use crate::models::{OutputSequence, PageFrame, ReplacementImage};
use crate::pipeline::{Placement, Replacer, composite_scaled, detection_set, select};

/// Filter used to bring zoomed pages back to native size
pub const PAGE_FILTER: FilterType = FilterType::Triangle;

/// Rasterizes document pages
pub trait PageRenderer {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Render page `index` at `zoom`, reporting its unzoomed size
    fn render_page(&self, index: usize, zoom: f32) -> Result<PageFrame>;
}

/// Reassembles processed pages into a document byte stream
pub trait DocumentWriter {
    /// Encode all frames, in order
    fn assemble(&self, pages: &OutputSequence) -> Result<Vec<u8>>;
}

/// Replace the code on every page with the same `replacement`.
///
/// Detection runs with `replace_all` and axis-aligned placement regardless of
/// `config`; each frame is then resized to its page's native dimensions.
pub fn process_document<L: CodeLocator>(
    detector: &Detector<L>,
    pages: Vec<PageFrame>,
    replacement: &ReplacementImage,
    config: &ReplaceConfig,
) -> Result<OutputSequence> {
    config.validate()?;
    if pages.is_empty() {
        return Err(ReplaceError::page_render(0, "document has no pages"));
    }

    let page_count = pages.len();
    let frames: Vec<RgbImage> = if config.parallel_pages {
        // Ordered collect; the first error stops remaining pages.
        pages
            .into_par_iter()
            .map(|page| process_page(detector, page, replacement, config))
            .collect::<Result<Vec<_>>>()?
    } else {
        pages
            .into_iter()
            .map(|page| process_page(detector, page, replacement, config))
            .collect::<Result<Vec<_>>>()?
    };

    tracing::info!(pages = page_count, "document processed");
    Ok(OutputSequence::new(frames))
}

fn process_page<L: CodeLocator>(
    detector: &Detector<L>,
    page: PageFrame,
    replacement: &ReplacementImage,
    config: &ReplaceConfig,
) -> Result<RgbImage> {
    let quads = detection_set(detector, &page.raster, config.tolerance)
        .inspect_err(|e| tracing::warn!(page = page.index, error = %e, "detection failed"))?;
    let selection = select(&quads, std::slice::from_ref(replacement), true)
        .inspect_err(|e| tracing::warn!(page = page.index, error = %e, "page has no code"))?;
    let composited = composite_scaled(
        &page.raster,
        &selection.assignments,
        Placement::AxisAligned,
        config.scale,
    );
    tracing::info!(
        page = page.index,
        detected = quads.len(),
        replaced = selection.assignments.len(),
        "page composited"
    );

    let (w, h) = (page.native_width.max(1), page.native_height.max(1));
    if composited.dimensions() == (w, h) {
        return Ok(composited);
    }
    Ok(imageops::resize(&composited, w, h, PAGE_FILTER))
}

impl<L: CodeLocator> Replacer<L> {
    /// [`process_document`] with this pipeline's detector and configuration.
    pub fn process_document(
        &self,
        pages: Vec<PageFrame>,
        replacement: &ReplacementImage,
    ) -> Result<OutputSequence> {
        process_document(self.detector(), pages, replacement, self.config())
    }

    /// Render every page, replace its code and assemble the result.
    pub fn replace_in_document<R, W>(
        &self,
        renderer: &R,
        writer: &W,
        replacement: &ReplacementImage,
    ) -> Result<Vec<u8>>
    where
        R: PageRenderer + ?Sized,
        W: DocumentWriter + ?Sized,
    {
        let zoom = self.config().zoom;
        let pages = (0..renderer.page_count())
            .map(|index| renderer.render_page(index, zoom))
            .collect::<Result<Vec<_>>>()?;
        let output = self.process_document(pages, replacement)?;
        writer.assemble(&output)
    }
}

const SEQUENCE_MAGIC: &[u8; 4] = b"QRSW";

/// Writes pages as PNG frames in a small length-prefixed container:
/// `"QRSW"`, frame count (u32 LE), then per frame its length (u32 LE) and PNG bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSequenceWriter;

impl ImageSequenceWriter {
    /// Split a container produced by [`DocumentWriter::assemble`] back into frames.
    pub fn read(bytes: &[u8]) -> Result<Vec<RgbImage>> {
        let malformed = |what: &str| ReplaceError::DocumentWriteFailure {
            reason: format!("malformed image sequence: {what}"),
        };
        let rest = bytes
            .strip_prefix(SEQUENCE_MAGIC.as_slice())
            .ok_or_else(|| malformed("bad magic"))?;
        let (count, mut rest) = take_u32(rest).ok_or_else(|| malformed("missing frame count"))?;

        let mut frames = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (len, tail) = take_u32(rest).ok_or_else(|| malformed("missing frame length"))?;
            let len = len as usize;
            if tail.len() < len {
                return Err(malformed("truncated frame"));
            }
            let (png, tail) = tail.split_at(len);
            frames.push(image::load_from_memory(png)?.to_rgb8());
            rest = tail;
        }
        Ok(frames)
    }
}

fn take_u32(bytes: &[u8]) -> Option<(u32, &[u8])> {
    let (head, tail) = bytes.split_first_chunk::<4>()?;
    Some((u32::from_le_bytes(*head), tail))
}

impl DocumentWriter for ImageSequenceWriter {
    fn assemble(&self, pages: &OutputSequence) -> Result<Vec<u8>> {
        let count = u32::try_from(pages.len()).map_err(|_| ReplaceError::DocumentWriteFailure {
            reason: "too many pages".to_string(),
        })?;
        let mut out = Vec::new();
        out.extend_from_slice(SEQUENCE_MAGIC);
        out.extend_from_slice(&count.to_le_bytes());

        for frame in pages.frames() {
            let mut png = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(frame.clone()).write_to(&mut png, ImageOutputFormat::Png)?;
            let png = png.into_inner();
            let len = u32::try_from(png.len()).map_err(|_| ReplaceError::DocumentWriteFailure {
                reason: "frame too large".to_string(),
            })?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(&png);
        }
        Ok(out)
    }
}
