//! Geometry utilities for perspective placement

use crate::models::Point;
use image::RgbaImage;

/// Perspective transformation matrix (3x3, `a33` fixed to 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
}

impl PerspectiveTransform {
    /// Create transform from 4 source points to 4 destination points.
    ///
    /// Returns `None` when the correspondence is degenerate (three collinear corners).
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform: two equations per correspondence.
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x as f64, src[i].y as f64);
            let (dx, dy) = (dst[i].x as f64, dst[i].y as f64);

            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;
            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        solve_linear_system(&a, &b).map(|s| Self {
            a11: s[0],
            a12: s[1],
            a13: s[2],
            a21: s[3],
            a22: s[4],
            a23: s[5],
            a31: s[6],
            a32: s[7],
        })
    }

    /// Map `(x, y)`; `None` on the line at infinity
    #[inline]
    pub fn map(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let denominator = self.a31 * x + self.a32 * y + 1.0;
        if denominator.abs() < 1e-12 {
            return None;
        }
        Some((
            (self.a11 * x + self.a12 * y + self.a13) / denominator,
            (self.a21 * x + self.a22 * y + self.a23) / denominator,
        ))
    }

    /// Transform a point using this perspective matrix
    pub fn transform(&self, p: &Point) -> Option<Point> {
        self.map(p.x as f64, p.y as f64)
            .map(|(x, y)| Point::new(x as f32, y as f32))
    }
}

/// Solve 8x8 linear system using Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &[[f64; 8]; 8], b: &[f64; 8]) -> Option<[f64; 8]> {
    let mut a = *a;
    let mut b = *b;
    let n = 8;

    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        if max_val < 1e-10 {
            return None;
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// Bilinear RGBA sample at a sub-pixel position (pixel centres at integer
/// coordinates), clamping to the image edge.
pub fn bilinear_sample_rgba(img: &RgbaImage, x: f64, y: f64) -> [f64; 4] {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return [0.0; 4];
    }
    let max_x = (w - 1) as f64;
    let max_y = (h - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = img.get_pixel(x0, y0).0;
    let p10 = img.get_pixel(x1, y0).0;
    let p01 = img.get_pixel(x0, y1).0;
    let p11 = img.get_pixel(x1, y1).0;

    let mut out = [0.0f64; 4];
    for c in 0..4 {
        out[c] = (1.0 - fx) * (1.0 - fy) * p00[c] as f64
            + fx * (1.0 - fy) * p10[c] as f64
            + (1.0 - fx) * fy * p01[c] as f64
            + fx * fy * p11[c] as f64;
    }
    out
}
