//! Four-corner code regions and their canonical winding.

use crate::error::{ReplaceError, Result};
use crate::models::Point;

/// Four corners exactly as a detector reported them, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawQuad {
    /// Corner points in detection order
    pub points: [Point; 4],
}

impl RawQuad {
    /// Wrap four points
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Order the corners into the canonical winding
    pub fn canonical(&self) -> Quad {
        canonical_from_array(&self.points)
    }
}

impl TryFrom<&[Point]> for RawQuad {
    type Error = ReplaceError;

    fn try_from(points: &[Point]) -> Result<Self> {
        let points: [Point; 4] = points
            .try_into()
            .map_err(|_| ReplaceError::InvalidGeometry {
                count: points.len(),
            })?;
        Ok(Self { points })
    }
}

/// Quad in canonical winding: `[top-left, top-right, bottom-right, bottom-left]`.
///
/// Area is always recomputed from the corners, never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    corners: [Point; 4],
}

/// Axis-aligned bounds of a quad in floating point pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Left edge
    pub x_min: f32,
    /// Top edge
    pub y_min: f32,
    /// Right edge
    pub x_max: f32,
    /// Bottom edge
    pub y_max: f32,
}

/// Integer paste rectangle; the origin may lie outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left column
    pub x: i64,
    /// Top row
    pub y: i64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl BoundingBox {
    /// Width (`x_max - x_min`)
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Height (`y_max - y_min`)
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Grow (or shrink) the box by `factor` about its centre.
    pub fn scaled_about_center(&self, factor: f32) -> BoundingBox {
        let cx = (self.x_min + self.x_max) / 2.0;
        let cy = (self.y_min + self.y_max) / 2.0;
        let hw = self.width() * factor / 2.0;
        let hh = self.height() * factor / 2.0;
        BoundingBox {
            x_min: cx - hw,
            y_min: cy - hh,
            x_max: cx + hw,
            y_max: cy + hh,
        }
    }

    /// Snap edges to whole pixels. `None` if the box collapses to nothing.
    pub fn to_pixel_rect(&self) -> Option<PixelRect> {
        let x0 = self.x_min.round() as i64;
        let y0 = self.y_min.round() as i64;
        let x1 = self.x_max.round() as i64;
        let y1 = self.y_max.round() as i64;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: x0,
            y: y0,
            width: u32::try_from(x1 - x0).ok()?,
            height: u32::try_from(y1 - y0).ok()?,
        })
    }
}

impl PixelRect {
    /// Whether pixel `(x, y)` lies inside the rectangle
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x + self.width as i64
            && y < self.y + self.height as i64
    }
}

/// Order four arbitrary points as `[top-left, top-right, bottom-right, bottom-left]`.
///
/// Top-left has the smallest `x + y`, bottom-right the largest; top-right has
/// the smallest `y - x`, bottom-left the largest. When ties make two roles pick
/// the same point (a square standing on a corner), the points are ordered
/// clockwise around their centroid starting from the top-left pick instead.
pub fn canonicalize(points: &[Point]) -> Result<Quad> {
    let raw = RawQuad::try_from(points)?;
    Ok(raw.canonical())
}

fn argmin_by(points: &[Point; 4], key: impl Fn(&Point) -> f32) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if key(&points[i]) < key(&points[best]) {
            best = i;
        }
    }
    best
}

fn argmax_by(points: &[Point; 4], key: impl Fn(&Point) -> f32) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if key(&points[i]) > key(&points[best]) {
            best = i;
        }
    }
    best
}

fn canonical_from_array(points: &[Point; 4]) -> Quad {
    let tl = argmin_by(points, Point::coord_sum);
    let br = argmax_by(points, Point::coord_sum);
    let tr = argmin_by(points, Point::coord_diff);
    let bl = argmax_by(points, Point::coord_diff);

    let roles = [tl, tr, br, bl];
    let distinct = (0..4).all(|i| (i + 1..4).all(|j| roles[i] != roles[j]));
    if distinct {
        return Quad {
            corners: roles.map(|i| points[i]),
        };
    }

    // Clockwise in image coordinates (y down) is increasing atan2 angle.
    let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;
    let angle = |p: &Point| (p.y - cy).atan2(p.x - cx);
    let start = angle(&points[tl]);
    let mut order = [0usize, 1, 2, 3];
    order.sort_by(|&a, &b| {
        let ka = (angle(&points[a]) - start).rem_euclid(std::f32::consts::TAU);
        let kb = (angle(&points[b]) - start).rem_euclid(std::f32::consts::TAU);
        ka.total_cmp(&kb).then(a.cmp(&b))
    });
    // The start point must lead even if float wrap puts it last.
    if let Some(pos) = order.iter().position(|&i| i == tl) {
        order.rotate_left(pos);
    }
    Quad {
        corners: order.map(|i| points[i]),
    }
}

impl Quad {
    /// Corners in canonical order
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Top-left corner
    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    /// Top-right corner
    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    /// Bottom-right corner
    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    /// Bottom-left corner
    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Polygon area by the shoelace formula over the canonical order
    pub fn area(&self) -> f32 {
        let mut twice = 0.0f64;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
        }
        (twice.abs() / 2.0) as f32
    }

    /// Axis-aligned bounding box of the four corners
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox {
            x_min: f32::INFINITY,
            y_min: f32::INFINITY,
            x_max: f32::NEG_INFINITY,
            y_max: f32::NEG_INFINITY,
        };
        for p in &self.corners {
            bb.x_min = bb.x_min.min(p.x);
            bb.y_min = bb.y_min.min(p.y);
            bb.x_max = bb.x_max.max(p.x);
            bb.y_max = bb.y_max.max(p.y);
        }
        bb
    }

    /// Even-odd point-in-polygon test
    pub fn contains(&self, p: &Point) -> bool {
        let mut inside = false;
        let mut j = 3;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// True when every corresponding corner differs by at most `tolerance`
    /// in both x and y.
    pub fn is_duplicate_of(&self, other: &Quad, tolerance: f32) -> bool {
        self.corners
            .iter()
            .zip(other.corners.iter())
            .all(|(a, b)| (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> [Point; 4] {
        [
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        ]
    }

    #[test]
    fn test_canonicalize_orders_shuffled_corners() {
        let [tl, tr, br, bl] = square(10.0, 20.0, 50.0);
        let q = canonicalize(&[br, tl, bl, tr]).unwrap();
        assert_eq!(q.top_left(), tl);
        assert_eq!(q.top_right(), tr);
        assert_eq!(q.bottom_right(), br);
        assert_eq!(q.bottom_left(), bl);
    }

    #[test]
    fn test_canonicalize_rejects_wrong_count() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        assert!(matches!(
            canonicalize(&pts),
            Err(ReplaceError::InvalidGeometry { count: 3 })
        ));
        let five = [Point::default(); 5];
        assert!(matches!(
            canonicalize(&five),
            Err(ReplaceError::InvalidGeometry { count: 5 })
        ));
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let pts = [
            Point::new(212.0, 95.0),
            Point::new(118.0, 102.0),
            Point::new(110.0, 201.0),
            Point::new(205.0, 190.0),
        ];
        let once = canonicalize(&pts).unwrap();
        let twice = canonicalize(once.corners()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_area_invariant_under_rotation_and_mirror() {
        let pts = [
            Point::new(100.0, 90.0),
            Point::new(310.0, 105.0),
            Point::new(300.0, 320.0),
            Point::new(95.0, 298.0),
        ];
        let reference = canonicalize(&pts).unwrap().area();
        for shift in 0..4 {
            let mut rotated = pts;
            rotated.rotate_left(shift);
            assert_eq!(canonicalize(&rotated).unwrap().area(), reference);

            let mut mirrored = rotated;
            mirrored.reverse();
            assert_eq!(canonicalize(&mirrored).unwrap().area(), reference);
        }
    }

    #[test]
    fn test_area_of_square() {
        let q = canonicalize(&square(100.0, 100.0, 200.0)).unwrap();
        assert!((q.area() - 40000.0).abs() < 1e-3);
    }

    #[test]
    fn test_diamond_falls_back_to_clockwise_order() {
        let top = Point::new(50.0, 0.0);
        let right = Point::new(100.0, 50.0);
        let bottom = Point::new(50.0, 100.0);
        let left = Point::new(0.0, 50.0);
        let q = canonicalize(&[top, right, bottom, left]).unwrap();
        let corners = q.corners();
        for p in [top, right, bottom, left] {
            assert!(corners.contains(&p));
        }
        assert!((q.area() - 5000.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounding_box_and_pixel_rect() {
        let q = canonicalize(&[
            Point::new(100.4, 102.0),
            Point::new(299.6, 98.0),
            Point::new(301.0, 300.0),
            Point::new(97.0, 299.0),
        ])
        .unwrap();
        let bb = q.bounding_box();
        assert_eq!(bb.x_min, 97.0);
        assert_eq!(bb.y_min, 98.0);
        assert_eq!(bb.x_max, 301.0);
        assert_eq!(bb.y_max, 300.0);

        let rect = bb.to_pixel_rect().unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (97, 98, 204, 202));
        assert!(rect.contains(97, 98));
        assert!(!rect.contains(301, 150));
    }

    #[test]
    fn test_scaled_box_keeps_center() {
        let bb = canonicalize(&square(100.0, 100.0, 200.0))
            .unwrap()
            .bounding_box()
            .scaled_about_center(1.05);
        assert!((bb.x_min - 95.0).abs() < 1e-3);
        assert!((bb.x_max - 305.0).abs() < 1e-3);
    }

    #[test]
    fn test_contains_only_polygon_interior() {
        let q = canonicalize(&[
            Point::new(50.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 50.0),
        ])
        .unwrap();
        assert!(q.contains(&Point::new(50.0, 50.0)));
        // Inside the bounding box but outside the diamond.
        assert!(!q.contains(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_duplicate_is_componentwise() {
        let a = canonicalize(&square(0.0, 0.0, 100.0)).unwrap();
        let b = canonicalize(&square(2.0, 2.0, 100.0)).unwrap();
        let c = canonicalize(&square(4.0, 0.0, 100.0)).unwrap();
        assert!(a.is_duplicate_of(&b, 3.0));
        // Euclidean distance 2.83 per corner would also pass, but 4.0 on x must fail.
        assert!(!a.is_duplicate_of(&c, 3.0));
    }
}
