use crate::models::RetrievedDocument;

/// Confidence reported when retrieval found nothing.
pub const NO_CONTEXT_CONFIDENCE: f32 = 0.3;

const QUALITY_WEIGHT: f32 = 0.7;
const TOP_N: usize = 3;

pub fn confidence(documents: &[RetrievedDocument]) -> f32 {
    let scores: Vec<f32> = documents.iter().map(|d| d.score).collect();
    confidence_from_scores(&scores)
}

/// `0.7 * mean(first three scores)` plus a bonus for breadth: `+0.2` from five
/// results, `+0.1` from three. Clamped to `[0, 1]`.
///
/// `scores` is taken in retrieval order, nearest first.
pub fn confidence_from_scores(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return NO_CONTEXT_CONFIDENCE;
    }

    let top = &scores[..scores.len().min(TOP_N)];
    let mean = top.iter().sum::<f32>() / top.len() as f32;

    let bonus = match scores.len() {
        n if n >= 5 => 0.2,
        n if n >= 3 => 0.1,
        _ => 0.0,
    };

    (QUALITY_WEIGHT * mean + bonus).clamp(0.0, 1.0)
}
