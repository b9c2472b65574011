use image::RgbImage;

/// One document page rasterized at some zoom factor.
#[derive(Debug, Clone)]
pub struct PageFrame {
    /// Zero-based page index
    pub index: usize,
    /// Zoomed raster
    pub raster: RgbImage,
    /// Page width at zoom 1.0, in pixels
    pub native_width: u32,
    /// Page height at zoom 1.0, in pixels
    pub native_height: u32,
}

impl PageFrame {
    /// Bundle a rendered page
    pub fn new(index: usize, raster: RgbImage, native_width: u32, native_height: u32) -> Self {
        Self {
            index,
            raster,
            native_width,
            native_height,
        }
    }
}

/// Modified page rasters in original page order, at native size.
#[derive(Debug, Clone, Default)]
pub struct OutputSequence {
    frames: Vec<RgbImage>,
}

impl OutputSequence {
    /// Wrap frames already in page order
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self { frames }
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no pages
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in page order
    pub fn frames(&self) -> &[RgbImage] {
        &self.frames
    }

    /// Take ownership of the frames
    pub fn into_frames(self) -> Vec<RgbImage> {
        self.frames
    }
}
