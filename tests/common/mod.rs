//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use image::{Rgb, RgbImage};
use qr_swap::{CodeLocator, PageFrame, PageRenderer, Point, ReplaceError, ReplacementImage, Result};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// White canvas with a gentle gradient so untouched pixels are distinguishable.
pub fn textured_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([200 + (x % 50) as u8, 200 + (y % 50) as u8, 230])
    })
}

/// Fill `[x0, x1) x [y0, y1)` with `color`.
pub fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Paint a 21-module symbol outline (three finders, everything else light)
/// with its top-left module at `(x0, y0)`.
pub fn draw_symbol(img: &mut RgbImage, x0: u32, y0: u32, module: u32) {
    for (fx, fy) in [(0, 0), (14, 0), (0, 14)] {
        for my in 0..7u32 {
            for mx in 0..7u32 {
                let ring = mx == 0 || mx == 6 || my == 0 || my == 6;
                let core = (2..=4).contains(&mx) && (2..=4).contains(&my);
                let color = if ring || core { BLACK } else { WHITE };
                let px = x0 + (fx + mx) * module;
                let py = y0 + (fy + my) * module;
                fill_rect(img, px, py, px + module, py + module, color);
            }
        }
    }
}

/// Axis-aligned corner polygon with its corners in a scrambled order.
pub fn square_region(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point> {
    vec![
        Point::new(x1, y1),
        Point::new(x0, y0),
        Point::new(x0, y1),
        Point::new(x1, y0),
    ]
}

pub fn solid_replacement(width: u32, height: u32, color: [u8; 3]) -> ReplacementImage {
    ReplacementImage::from_rgb(RgbImage::from_pixel(width, height, Rgb(color))).unwrap()
}

/// A replacement whose every pixel differs so misplaced resampling shows up.
pub fn patterned_replacement(width: u32, height: u32) -> ReplacementImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) * 3 % 256) as u8])
    });
    ReplacementImage::from_rgb(img).unwrap()
}

/// Backend that ignores the raster and reports fixed regions.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLocator {
    pub all: Vec<Vec<Point>>,
    pub one: Option<[Point; 4]>,
}

impl ScriptedLocator {
    pub fn regions(all: Vec<Vec<Point>>) -> Self {
        Self { all, one: None }
    }
}

impl CodeLocator for ScriptedLocator {
    fn locate_all(&self, _image: &RgbImage) -> Result<Vec<Vec<Point>>> {
        Ok(self.all.clone())
    }

    fn locate_one(&self, _image: &RgbImage) -> Result<Option<[Point; 4]>> {
        Ok(self.one)
    }
}

/// Backend that reports the bounding box of near-black pixels, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct DarkBlockLocator;

impl CodeLocator for DarkBlockLocator {
    fn locate_all(&self, image: &RgbImage) -> Result<Vec<Vec<Point>>> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, px) in image.enumerate_pixels() {
            if px.0.iter().all(|&c| c < 16) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        Ok(bounds
            .map(|(x0, y0, x1, y1)| {
                vec![square_region(x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32)]
            })
            .unwrap_or_default())
    }

    fn locate_one(&self, _image: &RgbImage) -> Result<Option<[Point; 4]>> {
        Ok(None)
    }
}

/// In-memory document: page `i` has background level `shades[i]` and,
/// when `with_code[i]`, a dark block at a fixed native position.
pub struct SyntheticPages {
    pub width: u32,
    pub height: u32,
    pub shades: Vec<u8>,
    pub with_code: Vec<bool>,
    pub fail_on: Option<usize>,
}

impl SyntheticPages {
    pub fn new(width: u32, height: u32, shades: Vec<u8>) -> Self {
        let with_code = vec![true; shades.len()];
        Self {
            width,
            height,
            shades,
            with_code,
            fail_on: None,
        }
    }

    /// Native-coordinate box of the dark block
    pub fn code_box(&self) -> (u32, u32, u32, u32) {
        (self.width / 4, self.height / 4, self.width / 2, self.height / 2)
    }
}

impl PageRenderer for SyntheticPages {
    fn page_count(&self) -> usize {
        self.shades.len()
    }

    fn render_page(&self, index: usize, zoom: f32) -> Result<PageFrame> {
        if self.fail_on == Some(index) {
            return Err(ReplaceError::page_render(index, "renderer crashed"));
        }
        let shade = self.shades[index];
        let w = (self.width as f32 * zoom).round() as u32;
        let h = (self.height as f32 * zoom).round() as u32;
        let mut raster = RgbImage::from_pixel(w, h, Rgb([shade, shade, shade]));
        if self.with_code[index] {
            let (x0, y0, x1, y1) = self.code_box();
            let z = |v: u32| (v as f32 * zoom).round() as u32;
            fill_rect(&mut raster, z(x0), z(y0), z(x1), z(y1), BLACK);
        }
        Ok(PageFrame::new(index, raster, self.width, self.height))
    }
}
