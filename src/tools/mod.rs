//! File helpers for the command-line tool.
//!
//! The library core never touches the filesystem; these wrappers load and
//! save rasters and expose a folder of page images as a [`PageRenderer`].

use std::path::{Path, PathBuf};

use image::RgbImage;
use image::imageops;

use crate::document::{PAGE_FILTER, PageRenderer};
use crate::error::{ReplaceError, Result};
use crate::models::{OutputSequence, PageFrame, ReplacementImage};

/// Load an image file as RGB.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Load a replacement image; any read or decode failure is `ReplacementImageInvalid`.
pub fn load_replacement<P: AsRef<Path>>(path: P) -> Result<ReplacementImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        ReplaceError::replacement_invalid(format!("cannot read {}: {e}", path.display()))
    })?;
    ReplacementImage::from_bytes(&bytes)
}

/// Save a raster; the format follows the file extension.
pub fn save_rgb<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    image.save(path)?;
    Ok(())
}

/// Write each frame as `page_NNN.png` under `dir`, returning the paths in page order.
pub fn save_pages<P: AsRef<Path>>(pages: &OutputSequence, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    pages
        .frames()
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let path = dir.join(format!("page_{i:03}.png"));
            save_rgb(frame, &path)?;
            Ok(path)
        })
        .collect()
}

/// Treats image files as already-flattened pages.
///
/// Each file's own size is the native page size; rendering at `zoom` upsamples it.
#[derive(Debug, Clone)]
pub struct ImageFilePages {
    paths: Vec<PathBuf>,
}

impl ImageFilePages {
    /// Pages in the given order
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl PageRenderer for ImageFilePages {
    fn page_count(&self) -> usize {
        self.paths.len()
    }

    fn render_page(&self, index: usize, zoom: f32) -> Result<PageFrame> {
        let path = self
            .paths
            .get(index)
            .ok_or_else(|| ReplaceError::page_render(index, "no such page"))?;
        let native = image::open(path)
            .map_err(|e| ReplaceError::page_render(index, format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (w, h) = native.dimensions();
        let zw = ((w as f32 * zoom).round() as u32).max(1);
        let zh = ((h as f32 * zoom).round() as u32).max(1);
        let raster = if (zw, zh) == (w, h) {
            native
        } else {
            imageops::resize(&native, zw, zh, PAGE_FILTER)
        };
        Ok(PageFrame::new(index, raster, w, h))
    }
}
