//! Turning loose finder patterns into symbol outlines.

use crate::detector::finder::FinderPattern;
use crate::models::Point;

/// Three finder centres of one symbol, oriented, plus its module size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderTriple {
    /// Corner marker at the right angle
    pub top_left: Point,
    /// Marker along the first symbol axis
    pub top_right: Point,
    /// Marker along the second symbol axis
    pub bottom_left: Point,
    /// Module size in pixels
    pub module_size: f32,
}

impl FinderTriple {
    /// Outer symbol corners in `[tl, tr, br, bl]` order.
    ///
    /// The missing fourth centre is the parallelogram completion of the other
    /// three; each corner sits 3.5 modules outward from its centre along both axes.
    pub fn outer_corners(&self) -> [Point; 4] {
        let ux = self.top_left.direction_to(&self.top_right);
        let uy = self.top_left.direction_to(&self.bottom_left);
        let half = 3.5 * self.module_size;
        let bottom_right = self.top_right + self.bottom_left - self.top_left;

        [
            self.top_left - ux * half - uy * half,
            self.top_right + ux * half - uy * half,
            bottom_right + ux * half + uy * half,
            self.bottom_left - ux * half + uy * half,
        ]
    }
}

/// Orient three patterns: the right-angle corner is top-left, and the
/// cross product decides which neighbour is top-right.
pub fn order_finder_patterns(
    a: &FinderPattern,
    b: &FinderPattern,
    c: &FinderPattern,
    min_module: f32,
) -> Option<FinderTriple> {
    let patterns = [a, b, c];

    if patterns.iter().any(|p| p.module_size < min_module) {
        return None;
    }

    let mut best_idx = 0usize;
    let mut best_cos = f32::INFINITY;
    for i in 0..3 {
        let p = &patterns[i].center;
        let p1 = &patterns[(i + 1) % 3].center;
        let p2 = &patterns[(i + 2) % 3].center;

        let v1 = *p1 - *p;
        let v2 = *p2 - *p;
        let denom = p.distance(p1) * p.distance(p2);
        if denom == 0.0 {
            continue;
        }
        let cos = ((v1.x * v2.x + v1.y * v2.y) / denom).abs();
        if cos < best_cos {
            best_cos = cos;
            best_idx = i;
        }
    }

    let tl = patterns[best_idx];
    let p1 = patterns[(best_idx + 1) % 3];
    let p2 = patterns[(best_idx + 2) % 3];

    let v1 = p1.center - tl.center;
    let v2 = p2.center - tl.center;
    let cross = v1.x * v2.y - v1.y * v2.x;

    // y grows downward, so a positive cross product means p1 is clockwise of p2.
    let (tr, bl) = if cross > 0.0 { (p1, p2) } else { (p2, p1) };
    let avg_module = (tl.module_size + tr.module_size + bl.module_size) / 3.0;
    let d_tr = tl.center.distance(&tr.center);
    let d_bl = tl.center.distance(&bl.center);

    let dim1 = estimate_dimension_from_distance(d_tr, avg_module)?;
    let dim2 = estimate_dimension_from_distance(d_bl, avg_module)?;
    let dim = if dim1 == dim2 {
        dim1
    } else if (dim1 as isize - dim2 as isize).abs() <= 4 {
        ((dim1 + dim2) / 2).max(21)
    } else {
        return None;
    };

    let module_size = (d_tr + d_bl) / 2.0 / (dim as f32 - 7.0);
    let module_ratio = module_size / avg_module;
    if !(0.7..=1.3).contains(&module_ratio) {
        return None;
    }

    Some(FinderTriple {
        top_left: tl.center,
        top_right: tr.center,
        bottom_left: bl.center,
        module_size,
    })
}

fn estimate_dimension_from_distance(distance: f32, module_size: f32) -> Option<usize> {
    if module_size <= 0.0 {
        return None;
    }
    let raw_dim = distance / module_size + 7.0;
    if raw_dim < 19.0 {
        return None;
    }
    let version = ((raw_dim - 17.0) / 4.0).round() as i32;
    if !(1..=40).contains(&version) {
        return None;
    }
    Some(17 + 4 * version as usize)
}

/// Bin patterns by module size and collect plausible right-angle triples.
///
/// With `exclusive`, each pattern joins at most one triple (first fit wins),
/// which keeps several symbols on one page from borrowing each other's markers.
pub fn group_finder_patterns(patterns: &[FinderPattern], exclusive: bool) -> Vec<[usize; 3]> {
    if patterns.len() < 3 {
        return Vec::new();
    }

    let mut indexed: Vec<(usize, f32)> = patterns
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.module_size))
        .collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut bins: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut bin_min = 0.0f32;
    let bin_ratio = 1.25f32;

    for (idx, size) in indexed {
        if current.is_empty() {
            current.push(idx);
            bin_min = size;
        } else if size <= bin_min * bin_ratio {
            current.push(idx);
        } else {
            bins.push(std::mem::take(&mut current));
            current.push(idx);
            bin_min = size;
        }
    }
    if !current.is_empty() {
        bins.push(current);
    }

    tracing::trace!(bins = bins.len(), "binned finder patterns by module size");

    let mut used = vec![false; patterns.len()];
    let mut groups = Vec::new();
    for i in 0..bins.len() {
        let mut indices = bins[i].clone();
        if i + 1 < bins.len() {
            indices.extend_from_slice(&bins[i + 1]);
        }
        if indices.len() < 3 {
            continue;
        }
        for group in build_groups(patterns, &indices, exclusive.then_some(&mut used)) {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }

    groups
}

fn build_groups(
    patterns: &[FinderPattern],
    indices: &[usize],
    mut used: Option<&mut Vec<bool>>,
) -> Vec<[usize; 3]> {
    let mut groups = Vec::new();
    let is_used = |used: &Option<&mut Vec<bool>>, i: usize| used.as_ref().is_some_and(|u| u[i]);

    for idx_i in 0..indices.len() {
        let i = indices[idx_i];
        if is_used(&used, i) {
            continue;
        }
        'pairs: for idx_j in (idx_i + 1)..indices.len() {
            let j = indices[idx_j];
            if is_used(&used, j) {
                continue;
            }
            for &k in indices.iter().skip(idx_j + 1) {
                if is_used(&used, k) {
                    continue;
                }
                if !is_plausible_triple(&patterns[i], &patterns[j], &patterns[k]) {
                    continue;
                }

                let mut group = [i, j, k];
                group.sort_unstable();
                groups.push(group);
                if let Some(u) = used.as_deref_mut() {
                    u[i] = true;
                    u[j] = true;
                    u[k] = true;
                    break 'pairs;
                }
            }
        }
    }

    groups
}

/// Size and shape measures of the triangle formed by three pattern centres
struct TriangleShape {
    size_ratio: f32,
    avg_module: f32,
    min_side: f32,
    max_side: f32,
    /// Smallest |cos| over the three corners; 0 for a perfect right angle
    best_cos: f32,
}

impl TriangleShape {
    fn of(p: [&FinderPattern; 3]) -> Self {
        let sizes = p.map(|f| f.module_size);
        let min_size = sizes.iter().copied().fold(f32::INFINITY, f32::min);
        let max_size = sizes.iter().copied().fold(0.0, f32::max);

        // Side i is opposite corner i.
        let sides = [
            p[1].center.distance(&p[2].center),
            p[0].center.distance(&p[2].center),
            p[0].center.distance(&p[1].center),
        ];
        let sq = sides.map(|d| d * d);
        let best_cos = (0..3)
            .map(|i| {
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                ((sq[j] + sq[k] - sq[i]) / (2.0 * sides[j] * sides[k])).abs()
            })
            .fold(f32::INFINITY, f32::min);

        Self {
            size_ratio: max_size / min_size,
            avg_module: sizes.iter().sum::<f32>() / 3.0,
            min_side: sides.iter().copied().fold(f32::INFINITY, f32::min),
            max_side: sides.iter().copied().fold(0.0, f32::max),
            best_cos,
        }
    }

    fn distortion(&self) -> f32 {
        self.max_side / self.min_side
    }
}

fn is_plausible_triple(pi: &FinderPattern, pj: &FinderPattern, pk: &FinderPattern) -> bool {
    let t = TriangleShape::of([pi, pj, pk]);
    t.size_ratio <= 2.0
        && t.min_side >= t.avg_module * 2.5
        && t.max_side <= 3000.0
        && t.distortion() <= 5.0
        && t.best_cos < 0.4
}

/// Lower is better: size consistency, low distortion and a clean right angle
pub fn group_score(patterns: &[FinderPattern], group: &[usize; 3]) -> f32 {
    let t = TriangleShape::of(group.map(|i| &patterns[i]));
    t.size_ratio * 2.0 + t.distortion() + t.best_cos
}
