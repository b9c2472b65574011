//! Rendering replacements into their target quads.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::models::{Point, Quad, ReplacementImage};
use crate::pipeline::select::Assignment;
use crate::utils::geometry::{PerspectiveTransform, bilinear_sample_rgba};

/// Filter used when resizing a replacement to its target box
pub const REPLACEMENT_FILTER: FilterType = FilterType::CatmullRom;

/// How a replacement is fitted to its quad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Resize to the quad's bounding box and paste opaquely. For flat,
    /// unrotated content such as rendered document pages.
    #[default]
    AxisAligned,
    /// Warp onto the exact quad and alpha-blend inside the polygon only.
    /// For photographs where the code is seen at an angle.
    Perspective,
}

/// Place every assignment, in order, onto a copy of `background`.
pub fn composite(
    background: &RgbImage,
    assignments: &[Assignment<'_>],
    placement: Placement,
) -> RgbImage {
    composite_scaled(background, assignments, placement, 1.0)
}

/// Like [`composite`], growing each axis-aligned target box by `scale` about
/// its centre first. `scale` has no effect on perspective placement.
pub fn composite_scaled(
    background: &RgbImage,
    assignments: &[Assignment<'_>],
    placement: Placement,
    scale: f32,
) -> RgbImage {
    let mut canvas = background.clone();
    for assignment in assignments {
        let square = assignment.replacement.square_cropped();
        match placement {
            Placement::AxisAligned => {
                place_axis_aligned(&mut canvas, &assignment.quad, &square, scale)
            }
            Placement::Perspective => place_perspective(&mut canvas, &assignment.quad, &square),
        }
    }
    canvas
}

fn place_axis_aligned(canvas: &mut RgbImage, quad: &Quad, square: &ReplacementImage, scale: f32) {
    let Some(rect) = quad.bounding_box().scaled_about_center(scale).to_pixel_rect() else {
        tracing::warn!(?quad, "target box collapses to nothing, skipping");
        return;
    };
    let resized = imageops::resize(&square.to_rgb(), rect.width, rect.height, REPLACEMENT_FILTER);
    imageops::replace(canvas, &resized, rect.x, rect.y);
}

fn place_perspective(canvas: &mut RgbImage, quad: &Quad, square: &ReplacementImage) {
    let src = square.rgba();
    let (w, h) = (src.width() as f32, src.height() as f32);
    let src_corners = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    // Quad -> replacement, so every canvas pixel looks up its source.
    let Some(inverse) = PerspectiveTransform::from_points(quad.corners(), &src_corners) else {
        tracing::warn!(?quad, "degenerate quad has no perspective mapping, skipping");
        return;
    };

    let bb = quad.bounding_box();
    let clamp_x = |v: f32| (v as i64).clamp(0, canvas.width() as i64) as u32;
    let clamp_y = |v: f32| (v as i64).clamp(0, canvas.height() as i64) as u32;
    let (x_lo, x_hi) = (clamp_x(bb.x_min.floor()), clamp_x(bb.x_max.ceil()));
    let (y_lo, y_hi) = (clamp_y(bb.y_min.floor()), clamp_y(bb.y_max.ceil()));

    for y in y_lo..y_hi {
        for x in x_lo..x_hi {
            let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if !quad.contains(&centre) {
                continue;
            }
            let Some((u, v)) = inverse.map(centre.x as f64, centre.y as f64) else {
                continue;
            };
            if u < 0.0 || v < 0.0 || u > w as f64 || v > h as f64 {
                continue;
            }
            let sample = bilinear_sample_rgba(src, u - 0.5, v - 0.5);
            let alpha = sample[3] / 255.0;
            if alpha <= 0.0 {
                continue;
            }
            let dst = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                let blended = sample[c] * alpha + dst.0[c] as f64 * (1.0 - alpha);
                dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
