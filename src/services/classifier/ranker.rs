use crate::models::classify_types::ClassificationResult;
use std::cmp::Ordering;

pub const TOP_K: usize = 3;

/// Sorts label scores descending and keeps the first `k`.
///
/// The sort is stable, so equal scores keep the order in which the labels
/// were enumerated (label-file order for model output).
pub fn rank<I, S>(scores: I, k: usize) -> Vec<ClassificationResult>
where
    I: IntoIterator<Item = (S, f32)>,
    S: Into<String>,
{
    let mut results: Vec<ClassificationResult> = scores
        .into_iter()
        .map(|(label, score)| ClassificationResult::new(label, score))
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(k);
    results
}

pub fn top_results<I, S>(scores: I) -> Vec<ClassificationResult>
where
    I: IntoIterator<Item = (S, f32)>,
    S: Into<String>,
{
    rank(scores, TOP_K)
}
