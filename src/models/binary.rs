/// Thresholded image used by finder scanning: `true` = dark, `false` = light
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl BinaryImage {
    /// All-light image of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    /// Build by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y); out of bounds reads as light
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x]
    }

    /// Set pixel at (x, y); out of bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, dark: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = dark;
    }

    /// One row as a slice
    pub fn row(&self, y: usize) -> &[bool] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Fraction of dark pixels
    pub fn dark_ratio(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().filter(|&&d| d).count() as f64 / self.data.len() as f64
    }
}

impl Default for BinaryImage {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_row() {
        let mut img = BinaryImage::new(4, 3);
        img.set(2, 1, true);
        assert!(img.get(2, 1));
        assert_eq!(img.row(1), &[false, false, true, false]);
        assert!((img.dark_ratio() - 1.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut img = BinaryImage::from_fn(2, 2, |_, _| true);
        img.set(10, 10, false);
        assert!(!img.get(10, 10));
        assert_eq!(img.dark_ratio(), 1.0);
    }
}
