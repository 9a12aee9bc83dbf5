//! Shared ranking contract for every scorer

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::RecommendationScore;

/// Descending score order; NaN sorts last
fn by_score_desc(a: &RecommendationScore, b: &RecommendationScore) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (false, false) => b.score.total_cmp(&a.score),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Stable descending sort, then deduplication by title
///
/// Equal scores keep their input order, and the first (highest-scoring)
/// occurrence of a title wins.
pub fn rank(mut items: Vec<RecommendationScore>) -> Vec<RecommendationScore> {
    items.sort_by(by_score_desc);

    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.title.clone()));
    items
}

/// [`rank`] followed by truncation to `top_n`
///
/// Returns every candidate when fewer than `top_n` exist.
pub fn top_n(items: Vec<RecommendationScore>, top_n: usize) -> Vec<RecommendationScore> {
    let mut ranked = rank(items);
    ranked.truncate(top_n);
    ranked
}
