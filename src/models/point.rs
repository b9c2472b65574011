use std::ops::{Add, Mul, Sub};

/// 2D point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Translate point by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Unit vector pointing from `self` towards `other` (zero if coincident)
    pub fn direction_to(&self, other: &Point) -> Point {
        let d = self.distance(other);
        if d == 0.0 {
            return Point::default();
        }
        Point::new((other.x - self.x) / d, (other.y - self.y) / d)
    }

    /// x + y, minimal at the top-left of an upright shape
    pub(crate) fn coord_sum(&self) -> f32 {
        self.x + self.y
    }

    /// y - x, minimal at the top-right of an upright shape
    pub(crate) fn coord_diff(&self) -> f32 {
        self.y - self.x
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}
