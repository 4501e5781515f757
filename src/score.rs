use crate::tokenize::{TokenRepr, TokenSet};

/// Jaccard index of two token sets, scaled to 0-100.
///
/// Two empty sets score 0 rather than dividing by zero.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    (intersection as f64 / union as f64 * 100.0).clamp(0.0, 100.0)
}

/// Dice-style line overlap, scaled to 0-100.
///
/// Every line of `a` that appears anywhere in `b` counts once, so the score
/// is taken from `a`'s side: when the two sequences repeat a line a different
/// number of times, `line_overlap(a, b)` and `line_overlap(b, a)` differ.
/// Repeated matching lines in `a` could push the raw value past 100, hence
/// the clamp.
pub fn line_overlap(a: &[String], b: &[String]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let matching = a.iter().filter(|line| b.contains(*line)).count();
    (2.0 * matching as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

impl TokenRepr {
    /// Score two representations from the same tokenizer.
    ///
    /// Returns `None` when a token set is compared against a line sequence.
    pub fn similarity(&self, other: &TokenRepr) -> Option<f64> {
        match (self, other) {
            (TokenRepr::Set(a), TokenRepr::Set(b)) => Some(jaccard(a, b)),
            (TokenRepr::Lines(a), TokenRepr::Lines(b)) => Some(line_overlap(a, b)),
            _ => None,
        }
    }
}
