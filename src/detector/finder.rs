//! Finder pattern detection using 1:1:3:1:1 ratio scanning with a vertical cross-check

use crate::models::{BinaryImage, Point};

/// Centre of one of the three square markers in a QR symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Pattern centre
    pub center: Point,
    /// Estimated module (cell) size in pixels
    pub module_size: f32,
}

impl FinderPattern {
    /// Create a pattern
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
        }
    }
}

/// Row/column run-length scanner for finder patterns
pub struct FinderDetector;

impl FinderDetector {
    /// Scan every row, confirm each hit along its column and merge hits
    /// that belong to the same marker.
    pub fn detect(matrix: &BinaryImage) -> Vec<FinderPattern> {
        let mut candidates = Vec::new();

        for y in 0..matrix.height() {
            if !Self::has_significant_edges(matrix.row(y)) {
                continue;
            }
            for row_hit in Self::scan_row(matrix.row(y), y) {
                if let Some(confirmed) = Self::cross_check_vertical(matrix, &row_hit) {
                    candidates.push(confirmed);
                }
            }
        }

        Self::merge_candidates(candidates)
    }

    /// Check if row has enough edge transitions to potentially contain patterns
    fn has_significant_edges(row: &[bool]) -> bool {
        let Some(&first) = row.first() else {
            return false;
        };
        let mut transitions = 0;
        let mut prev_color = first;

        for &color in row.iter().step_by(4).skip(1) {
            if color != prev_color {
                transitions += 1;
                prev_color = color;
                if transitions >= 3 {
                    return true;
                }
            }
        }

        transitions >= 2
    }

    fn scan_row(row: &[bool], y: usize) -> Vec<FinderPattern> {
        const MAX_PATTERNS_PER_ROW: usize = 8;

        let mut candidates = Vec::new();
        let Some(&first) = row.first() else {
            return candidates;
        };
        let mut run_lengths: Vec<usize> = Vec::new();
        let mut run_colors: Vec<bool> = Vec::new();
        let mut run_start = 0usize;
        let mut current_color = first;

        for (x, &color) in row.iter().enumerate().skip(1) {
            if color == current_color {
                continue;
            }
            run_lengths.push(x - run_start);
            run_colors.push(current_color);
            run_start = x;
            current_color = color;

            if run_colors.len() < 5 {
                continue;
            }
            let end_idx = run_colors.len();
            let colors = &run_colors[end_idx - 5..end_idx];
            let lengths = &run_lengths[end_idx - 5..end_idx];

            // dark-light-dark-light-dark
            if colors[0] && !colors[1] && colors[2] && !colors[3] && colors[4] {
                if Self::quick_ratio_check(lengths) {
                    if let Some((center, unit)) = Self::check_pattern(lengths, x) {
                        candidates.push(FinderPattern::new(center, y as f32, unit));
                        if candidates.len() >= MAX_PATTERNS_PER_ROW {
                            break;
                        }
                    }
                }
            }
        }

        candidates
    }

    /// Integer pre-check before the floating point ratio test
    fn quick_ratio_check(lengths: &[usize]) -> bool {
        let b1 = lengths[0];
        let w1 = lengths[1];
        let b2 = lengths[2];
        let w2 = lengths[3];
        let b3 = lengths[4];

        let total = b1 + w1 + b2 + w2 + b3;
        if total < 7 {
            return false;
        }

        let b2_min = b1.min(b3);
        if b2 < b2_min * 2 || b2 > b2_min * 5 {
            return false;
        }

        let outer_avg = (b1 + b3 + w1 + w2) / 4;
        let w1_ok = w1 * 2 >= outer_avg && w1 <= outer_avg * 2;
        let w2_ok = w2 * 2 >= outer_avg && w2 <= outer_avg * 2;

        w1_ok && w2_ok
    }

    /// Full ratio test; returns the centre along the scan axis and the module size.
    /// `end` is the index one past the last dark run.
    fn check_pattern(lengths: &[usize], end: usize) -> Option<(f32, f32)> {
        if lengths.len() != 5 {
            return None;
        }

        let total: usize = lengths.iter().sum();
        let unit = total as f32 / 7.0;
        let expected = [1.0f32, 1.0, 3.0, 1.0, 1.0];

        const TOL: f32 = 0.5;
        let ok = lengths
            .iter()
            .zip(expected.iter())
            .all(|(&len, &exp)| (len as f32 / unit - exp).abs() <= TOL * exp.max(1.0));
        if !ok {
            return None;
        }

        let center = end as f32 - lengths[4] as f32 - lengths[3] as f32 - lengths[2] as f32 / 2.0;
        Some((center, unit))
    }

    /// Re-run the ratio test down the column through a row hit
    fn cross_check_vertical(matrix: &BinaryImage, hit: &FinderPattern) -> Option<FinderPattern> {
        let x = hit.center.x.floor() as usize;
        let y = hit.center.y as usize;
        let height = matrix.height();
        if !matrix.get(x, y) {
            return None;
        }

        // Walk up through dark, light, dark.
        let mut counts = [0usize; 5];
        let mut up = y as isize;
        for (slot, dark) in [(2usize, true), (1, false), (0, true)] {
            while up >= 0 && matrix.get(x, up as usize) == dark {
                counts[slot] += 1;
                up -= 1;
            }
        }
        // Walk down through dark (rest of centre), light, dark.
        let mut down = y + 1;
        for (slot, dark) in [(2usize, true), (3, false), (4, true)] {
            while down < height && matrix.get(x, down) == dark {
                counts[slot] += 1;
                down += 1;
            }
        }
        if counts.iter().any(|&c| c == 0) {
            return None;
        }
        if !Self::quick_ratio_check(&counts) {
            return None;
        }
        let (center_y, unit_y) = Self::check_pattern(&counts, down)?;

        let module_size = (hit.module_size + unit_y) / 2.0;
        if unit_y > hit.module_size * 2.0 || hit.module_size > unit_y * 2.0 {
            return None;
        }
        Some(FinderPattern::new(hit.center.x, center_y, module_size))
    }

    /// Average all confirmed hits within a few modules of each other
    fn merge_candidates(candidates: Vec<FinderPattern>) -> Vec<FinderPattern> {
        struct Cluster {
            sum_x: f32,
            sum_y: f32,
            sum_module: f32,
            count: f32,
        }

        impl Cluster {
            fn mean(&self) -> FinderPattern {
                FinderPattern::new(
                    self.sum_x / self.count,
                    self.sum_y / self.count,
                    self.sum_module / self.count,
                )
            }
        }

        let mut clusters: Vec<Cluster> = Vec::new();
        for candidate in candidates {
            let existing = clusters.iter_mut().find(|c| {
                let mean = c.mean();
                let merge_dist = mean.module_size.max(candidate.module_size) * 2.0;
                mean.center.distance(&candidate.center) < merge_dist
            });
            match existing {
                Some(c) => {
                    c.sum_x += candidate.center.x;
                    c.sum_y += candidate.center.y;
                    c.sum_module += candidate.module_size;
                    c.count += 1.0;
                }
                None => clusters.push(Cluster {
                    sum_x: candidate.center.x,
                    sum_y: candidate.center.y,
                    sum_module: candidate.module_size,
                    count: 1.0,
                }),
            }
        }

        // A single stray row hit is noise.
        clusters
            .iter()
            .filter(|c| c.count >= 2.0)
            .map(Cluster::mean)
            .collect()
    }
}
