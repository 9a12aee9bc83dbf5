//! Knowledge-based scoring: category overlap and author match against history

use std::collections::HashSet;

use crate::{
    models::{Book, BookFeatures, EmployeeId, RecommendationScore, Recommendations, Strategy},
    services::{catalog::CatalogSnapshot, categories::tag_set, ranking},
};

const CATEGORY_WEIGHT: f64 = 0.6;
const AUTHOR_WEIGHT: f64 = 0.4;

/// Share of the candidate's tags that the borrowed book also carries
///
/// A candidate without tags scores 0 instead of dividing by zero.
fn category_overlap(borrowed: &HashSet<&str>, candidate: &HashSet<&str>) -> f64 {
    if candidate.is_empty() {
        return 0.0;
    }
    borrowed.intersection(candidate).count() as f64 / candidate.len() as f64
}

/// Scores one candidate against every borrowed book
///
/// Both terms are means over the history, so the total stays within [0, 1].
pub fn score_candidate(history: &[BookFeatures<'_>], candidate: &Book) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    let candidate_tags = tag_set(&candidate.categories);
    let n = history.len() as f64;

    let category_score = history
        .iter()
        .map(|borrowed| category_overlap(&tag_set(borrowed.categories), &candidate_tags))
        .sum::<f64>()
        / n;

    let author_score = history
        .iter()
        .filter(|borrowed| borrowed.author == candidate.author)
        .count() as f64
        / n;

    CATEGORY_WEIGHT * category_score + AUTHOR_WEIGHT * author_score
}

/// Recommends unborrowed catalog books by rule-weighted similarity to history
pub fn recommend(snapshot: &CatalogSnapshot, employee_id: EmployeeId, top_n: usize) -> Recommendations {
    let history = snapshot.borrowed_features(employee_id);
    if history.is_empty() {
        tracing::info!(employee_id = %employee_id, "No borrow history for knowledge-based scoring");
        return Recommendations::no_history(Strategy::KnowledgeBased);
    }

    let borrowed: HashSet<&str> = history.iter().map(|features| features.title).collect();

    let candidates: Vec<RecommendationScore> = snapshot
        .books()
        .iter()
        .filter(|book| !borrowed.contains(book.title.as_str()))
        .map(|book| RecommendationScore::for_book(book, score_candidate(&history, book)))
        .collect();

    tracing::debug!(
        employee_id = %employee_id,
        history = history.len(),
        candidates = candidates.len(),
        "Knowledge-based candidates scored"
    );

    Recommendations::ok(Strategy::KnowledgeBased, ranking::top_n(candidates, top_n))
}
