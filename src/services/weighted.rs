//! Weighted multi-criteria scoring over exploded (entity, tag) rows

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    models::{Book, BorrowRecord, Criteria, CriteriaWeights, EmployeeId, RecommendationScore},
    services::{
        categories::{self, TagRow},
        ranking,
    },
};

/// Tag occurrence counts, optionally split per employee
#[derive(Debug, Clone, Default)]
pub struct CategoryFrequency {
    counts: BTreeMap<(Option<EmployeeId>, String), usize>,
}

impl CategoryFrequency {
    /// Counts rows per `(employee, tag)`; catalog rows have no employee
    pub fn from_rows(rows: &[TagRow<'_>]) -> Self {
        let mut counts = BTreeMap::new();
        for row in rows {
            if let Some(tag) = row.tag {
                *counts.entry((row.employee_id, tag.to_string())).or_default() += 1;
            }
        }
        Self { counts }
    }

    /// Count of a tag summed over every employee, `None` if it never occurs
    pub fn count(&self, tag: &str) -> Option<usize> {
        let total: usize = self
            .counts
            .iter()
            .filter(|((_, key), _)| key == tag)
            .map(|(_, count)| count)
            .sum();
        (total > 0).then_some(total)
    }
}

/// Ranked weighted scores plus the criteria that matched nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedScores {
    /// Sorted by score and deduplicated by title, not truncated
    pub items: Vec<RecommendationScore>,
    pub unmatched_authors: Vec<String>,
    pub unmatched_categories: Vec<String>,
}

/// Scores rows by author preference and frequency-weighted category preference
///
/// A row gets `author` weight when its author is requested, plus
/// `category * count(tag)` for every requested category equal to its tag.
/// A category requested twice counts twice. A book's score is that of its
/// best row.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedCriteriaScorer {
    weights: CriteriaWeights,
}

impl WeightedCriteriaScorer {
    pub fn new(weights: CriteriaWeights) -> Self {
        Self { weights }
    }

    /// Scores catalog books, with tag frequency counted over the whole catalog
    pub fn score_global(&self, books: &[Book], criteria: &Criteria) -> WeightedScores {
        let rows = categories::explode_books(books);
        let frequency = CategoryFrequency::from_rows(&rows);
        self.score_rows(&rows, &frequency, criteria)
    }

    /// Scores borrow records, with tag frequency grouped per employee and
    /// summed across employees on lookup
    pub fn score_for_employee(&self, records: &[BorrowRecord], criteria: &Criteria) -> WeightedScores {
        let rows = categories::explode_records(records);
        let frequency = CategoryFrequency::from_rows(&rows);
        self.score_rows(&rows, &frequency, criteria)
    }

    fn score_rows(
        &self,
        rows: &[TagRow<'_>],
        frequency: &CategoryFrequency,
        criteria: &Criteria,
    ) -> WeightedScores {
        let authors: HashSet<&str> = criteria.authors.iter().map(String::as_str).collect();

        let mut category_bonus: HashMap<&str, f64> = HashMap::new();
        let mut unmatched_categories: Vec<String> = Vec::new();
        for category in &criteria.categories {
            match frequency.count(category) {
                Some(count) => {
                    *category_bonus.entry(category.as_str()).or_default() +=
                        self.weights.category * count as f64;
                }
                None if !unmatched_categories.contains(category) => {
                    unmatched_categories.push(category.clone());
                }
                None => {}
            }
        }

        let known_authors: HashSet<&str> = rows.iter().map(|row| row.features.author).collect();
        let mut unmatched_authors: Vec<String> = Vec::new();
        for author in &criteria.authors {
            if !known_authors.contains(author.as_str()) && !unmatched_authors.contains(author) {
                unmatched_authors.push(author.clone());
            }
        }

        let scored: Vec<RecommendationScore> = rows
            .iter()
            .map(|row| {
                let mut score = 0.0;
                if authors.contains(row.features.author) {
                    score += self.weights.author;
                }
                if let Some(bonus) = row.tag.and_then(|tag| category_bonus.get(tag)) {
                    score += bonus;
                }

                let mut item = RecommendationScore::for_features(row.features, score);
                item.book_id = row.book_id.map(str::to_string);
                item
            })
            .collect();

        if !unmatched_authors.is_empty() || !unmatched_categories.is_empty() {
            tracing::debug!(
                unmatched_authors = ?unmatched_authors,
                unmatched_categories = ?unmatched_categories,
                "Criteria matched nothing"
            );
        }

        WeightedScores {
            items: ranking::rank(scored),
            unmatched_authors,
            unmatched_categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::fixtures::scenario_catalog;

    const EPSILON: f64 = 1e-9;

    fn criteria(authors: &[&str], categories: &[&str]) -> Criteria {
        Criteria {
            authors: authors.iter().map(|a| a.to_string()).collect(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn score_of(scores: &WeightedScores, title: &str) -> f64 {
        scores
            .items
            .iter()
            .find(|item| item.title == title)
            .map(|item| item.score)
            .unwrap()
    }

    #[test]
    fn test_author_and_frequency_weighted_category() {
        let scorer = WeightedCriteriaScorer::default();
        let scores = scorer.score_global(&scenario_catalog(), &criteria(&["Alice"], &["Fiction"]));

        // "Fiction" occurs twice in the catalog
        assert!((score_of(&scores, "X") - 1.6).abs() < EPSILON);
        assert!((score_of(&scores, "Y") - 1.2).abs() < EPSILON);
        assert!((score_of(&scores, "Z") - 0.4).abs() < EPSILON);
        assert_eq!(
            scores.items.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(),
            vec!["X", "Y", "Z"]
        );
    }

    #[test]
    fn test_never_returns_duplicate_titles() {
        let scorer = WeightedCriteriaScorer::default();
        let scores = scorer.score_global(&scenario_catalog(), &criteria(&[], &["Fiction", "Drama"]));
        let titles: HashSet<&str> = scores.items.iter().map(|i| i.title.as_str()).collect();

        assert_eq!(titles.len(), scores.items.len());
        assert_eq!(scores.items.len(), 3);
    }

    #[test]
    fn test_repeated_category_counts_twice() {
        let scorer = WeightedCriteriaScorer::default();
        let once = scorer.score_global(&scenario_catalog(), &criteria(&[], &["Drama"]));
        let twice = scorer.score_global(&scenario_catalog(), &criteria(&[], &["Drama", "Drama"]));

        assert!((score_of(&twice, "Z") - 2.0 * score_of(&once, "Z")).abs() < EPSILON);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = WeightedCriteriaScorer::new(CriteriaWeights {
            author: 1.0,
            category: 0.0,
        });
        let scores = scorer.score_global(&scenario_catalog(), &criteria(&["Bob"], &["Fiction"]));

        assert_eq!(scores.items[0].title, "Y");
        assert_eq!(scores.items[0].score, 1.0);
    }

    #[test]
    fn test_unknown_criteria_contribute_nothing() {
        let scorer = WeightedCriteriaScorer::default();
        let scores = scorer.score_global(&scenario_catalog(), &criteria(&["Nobody"], &["Horror", "Horror"]));

        assert!(scores.items.iter().all(|item| item.score == 0.0));
        assert_eq!(scores.unmatched_authors, vec!["Nobody"]);
        assert_eq!(scores.unmatched_categories, vec!["Horror"]);
    }

    #[test]
    fn test_catalog_rows_keep_book_id() {
        let scorer = WeightedCriteriaScorer::default();
        let scores = scorer.score_global(&scenario_catalog(), &criteria(&["Alice"], &[]));
        assert_eq!(scores.items[0].book_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_score_for_employee_sums_across_employees() {
        let records = vec![
            BorrowRecord::new(1, "Sari", "X", "Alice", "Fiction"),
            BorrowRecord::new(1, "Sari", "Y", "Bob", "Fiction, Drama"),
            BorrowRecord::new(2, "Budi", "X", "Alice", "Fiction"),
        ];
        let rows = categories::explode_records(&records);
        let frequency = CategoryFrequency::from_rows(&rows);
        assert_eq!(frequency.counts[&(Some(EmployeeId(1)), "Fiction".to_string())], 2);
        assert_eq!(frequency.counts[&(Some(EmployeeId(2)), "Fiction".to_string())], 1);
        assert_eq!(frequency.count("Fiction"), Some(3));
        assert_eq!(frequency.count("Poetry"), None);

        let scorer = WeightedCriteriaScorer::default();
        let scores = scorer.score_for_employee(&records, &criteria(&[], &["Fiction"]));

        assert_eq!(scores.items.len(), 2);
        assert!((score_of(&scores, "X") - 0.6 * 3.0).abs() < EPSILON);
        assert!(scores.items.iter().all(|item| item.book_id.is_none()));
    }

    #[test]
    fn test_untagged_book_can_still_match_author() {
        let books = vec![Book::new("1", "Bare", "Alice", "")];
        let scorer = WeightedCriteriaScorer::default();
        let scores = scorer.score_global(&books, &criteria(&["Alice"], &["Fiction"]));

        assert_eq!(scores.items.len(), 1);
        assert!((scores.items[0].score - 0.4).abs() < EPSILON);
    }
}
