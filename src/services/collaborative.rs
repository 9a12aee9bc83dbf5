//! Collaborative filtering over employee/book interaction counts
//!
//! Interaction matrices are never built over the full history. The user-based
//! variant only counts records of the titles the target employee borrowed; the
//! item-based variant counts the full histories of employees who co-borrowed
//! at least one of those titles.

use std::collections::{HashMap, HashSet};

use crate::{
    models::{EmployeeId, RecommendationScore, Recommendations, Strategy},
    services::{catalog::CatalogSnapshot, ranking, similarity::CountMatrix},
};

/// Rows most similar to `key`, self and zero-similarity rows excluded
///
/// Equal similarities keep matrix row order.
fn nearest<'a, R: Ord + Clone, C: Ord + Clone>(
    matrix: &'a CountMatrix<R, C>,
    key: &R,
    limit: usize,
) -> Option<Vec<(&'a R, f64)>> {
    let mut similar: Vec<(&R, f64)> = matrix
        .similarities_to(key)?
        .into_iter()
        .filter(|(row, similarity)| *row != key && *similarity > 0.0)
        .collect();

    similar.sort_by(|a, b| b.1.total_cmp(&a.1));
    similar.truncate(limit);
    Some(similar)
}

/// Recommends books borrowed by the employees most similar to the target
///
/// Candidates are ranked by how often the neighbours borrowed them.
pub fn recommend_user_based(
    snapshot: &CatalogSnapshot,
    employee_id: EmployeeId,
    top_n: usize,
) -> Recommendations {
    let borrowed = snapshot.borrowed_titles(employee_id);
    if borrowed.is_empty() {
        tracing::info!(employee_id = %employee_id, "No borrow history for user-based scoring");
        return Recommendations::no_history(Strategy::UserBased);
    }
    let borrowed: HashSet<&str> = borrowed.into_iter().collect();

    let matrix = CountMatrix::from_pairs(
        snapshot
            .records()
            .iter()
            .filter(|record| borrowed.contains(record.title.as_str()))
            .map(|record| (record.employee_id, record.title.as_str())),
    );

    let Some(neighbours) = nearest(&matrix, &employee_id, top_n) else {
        tracing::warn!(employee_id = %employee_id, "Employee missing from interaction matrix");
        return Recommendations::no_similar_peers(Strategy::UserBased);
    };
    if neighbours.is_empty() {
        tracing::info!(employee_id = %employee_id, "No similar employees found");
        return Recommendations::no_similar_peers(Strategy::UserBased);
    }

    tracing::debug!(
        employee_id = %employee_id,
        matrix_rows = matrix.rows().len(),
        matrix_columns = matrix.columns().len(),
        neighbours = ?neighbours,
        "Similar employees selected"
    );

    let neighbours: HashSet<EmployeeId> = neighbours.into_iter().map(|(id, _)| *id).collect();

    // Title frequency among the neighbours' records, in first-seen order
    let mut frequency: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for record in snapshot.records() {
        let title = record.title.as_str();
        if !neighbours.contains(&record.employee_id) || borrowed.contains(title) {
            continue;
        }
        match positions.get(title) {
            Some(&position) => frequency[position].1 += 1,
            None => {
                positions.insert(title, frequency.len());
                frequency.push((title, 1));
            }
        }
    }

    let candidates: Vec<RecommendationScore> = frequency
        .into_iter()
        .filter_map(|(title, count)| match snapshot.book_by_title(title) {
            Some(book) => Some(RecommendationScore::for_book(book, count as f64)),
            None => {
                tracing::debug!(title = %title, "Neighbour title not in catalog");
                None
            }
        })
        .collect();

    Recommendations::ok(Strategy::UserBased, ranking::top_n(candidates, top_n))
}

/// Recommends books most similar, by co-borrowing, to the employee's books
///
/// Each borrowed book contributes its `top_n` nearest books. The lists are
/// merged in borrow order; a title seen more than once keeps its highest
/// similarity, and equal similarities keep first-seen order.
pub fn recommend_item_based(
    snapshot: &CatalogSnapshot,
    employee_id: EmployeeId,
    top_n: usize,
) -> Recommendations {
    let borrowed = snapshot.borrowed_titles(employee_id);
    if borrowed.is_empty() {
        tracing::info!(employee_id = %employee_id, "No borrow history for item-based scoring");
        return Recommendations::no_history(Strategy::ItemBased);
    }
    let borrowed_set: HashSet<&str> = borrowed.iter().copied().collect();

    let co_borrowers: HashSet<EmployeeId> = snapshot
        .records()
        .iter()
        .filter(|record| borrowed_set.contains(record.title.as_str()))
        .map(|record| record.employee_id)
        .collect();

    let matrix = CountMatrix::from_pairs(
        snapshot
            .records()
            .iter()
            .filter(|record| co_borrowers.contains(&record.employee_id))
            .map(|record| (record.title.as_str(), record.employee_id)),
    );

    let mut merged: Vec<RecommendationScore> = Vec::new();
    for title in &borrowed {
        let Some(similar) = nearest(&matrix, title, top_n) else {
            continue;
        };
        for (other, similarity) in similar {
            if borrowed_set.contains(*other) {
                continue;
            }
            if let Some(book) = snapshot.book_by_title(other) {
                merged.push(RecommendationScore::for_book(book, similarity));
            }
        }
    }

    tracing::debug!(
        employee_id = %employee_id,
        matrix_rows = matrix.rows().len(),
        co_borrowers = co_borrowers.len(),
        merged = merged.len(),
        "Item neighbour lists merged"
    );

    if merged.is_empty() && co_borrowers.len() <= 1 {
        tracing::info!(employee_id = %employee_id, "No co-borrowed books found");
        return Recommendations::no_similar_peers(Strategy::ItemBased);
    }

    Recommendations::ok(Strategy::ItemBased, ranking::top_n(merged, top_n))
}
