use crate::models::Quad;

/// Drop near-identical detections, keeping the first occurrence.
///
/// Two quads are duplicates when every corresponding canonical corner differs
/// by at most `tolerance` in x and in y. Input order is preserved.
pub fn dedupe(quads: &[Quad], tolerance: f32) -> Vec<Quad> {
    let mut kept: Vec<Quad> = Vec::with_capacity(quads.len());
    for quad in quads {
        if !kept.iter().any(|k| k.is_duplicate_of(quad, tolerance)) {
            kept.push(*quad);
        }
    }
    kept
}
