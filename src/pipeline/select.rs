use crate::error::{ReplaceError, Result};
use crate::models::{Quad, ReplacementImage};

/// A target quad paired with the image that will be placed into it
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    /// Where the replacement goes
    pub quad: Quad,
    /// What goes there
    pub replacement: &'a ReplacementImage,
}

/// Non-fatal outcomes recorded during selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// More quads were retained than replacement images were supplied;
    /// the surplus quads are left as they are.
    InsufficientReplacements {
        /// Quads retained for replacement
        retained: usize,
        /// Replacement images available
        available: usize,
    },
}

/// Result of ranking detections against the available replacements
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    /// Quads that receive a replacement, largest first
    pub assignments: Vec<Assignment<'a>>,
    /// Retained quads left without a replacement
    pub unmatched: Vec<Quad>,
    /// Recorded non-fatal conditions
    pub conditions: Vec<Condition>,
}

/// Rank quads by area (largest first, stable on ties) and pair them with
/// replacements in order.
///
/// Without `replace_all` only the largest quad is kept. Fails with
/// `NoCodeDetected` when `quads` is empty.
pub fn select<'a>(
    quads: &[Quad],
    replacements: &'a [ReplacementImage],
    replace_all: bool,
) -> Result<Selection<'a>> {
    if quads.is_empty() {
        return Err(ReplaceError::NoCodeDetected);
    }

    let mut ranked = quads.to_vec();
    ranked.sort_by(|a, b| b.area().total_cmp(&a.area()));
    if !replace_all {
        ranked.truncate(1);
    }

    let paired = ranked.len().min(replacements.len());
    let unmatched = ranked.split_off(paired);
    let assignments = ranked
        .into_iter()
        .zip(replacements.iter())
        .map(|(quad, replacement)| Assignment { quad, replacement })
        .collect();

    let mut conditions = Vec::new();
    if !unmatched.is_empty() {
        let condition = Condition::InsufficientReplacements {
            retained: paired + unmatched.len(),
            available: replacements.len(),
        };
        tracing::warn!(?condition, "leaving surplus codes unmodified");
        conditions.push(condition);
    }

    Ok(Selection {
        assignments,
        unmatched,
        conditions,
    })
}
