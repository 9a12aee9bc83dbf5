use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookFeatures};

/// Scoring strategy behind a recommendation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rule-weighted category overlap and author match
    #[default]
    KnowledgeBased,
    /// TF-IDF cosine similarity over author and categories
    ContentBased,
    /// Neighbouring employees with similar borrowing
    UserBased,
    /// Books co-borrowed with the employee's books
    ItemBased,
    /// Weighted author/category criteria
    WeightedCriteria,
}

/// Informational signal returned next to the (possibly empty) item list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Ok,
    /// The employee has no borrow records
    NoHistory,
    /// No other employee or book shares an interaction with the target
    NoSimilarPeers,
}

/// A scored candidate book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationScore {
    /// Absent when the row came from the borrow table and the title is not in the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    pub title: String,
    pub author: String,
    pub categories: Vec<String>,
    pub score: f64,
}

impl RecommendationScore {
    pub fn for_book(book: &Book, score: f64) -> Self {
        Self {
            book_id: Some(book.id.clone()),
            title: book.title.clone(),
            author: book.author.clone(),
            categories: book.categories.clone(),
            score,
        }
    }

    pub fn for_features(features: BookFeatures<'_>, score: f64) -> Self {
        Self {
            book_id: None,
            title: features.title.to_string(),
            author: features.author.to_string(),
            categories: features.categories.to_vec(),
            score,
        }
    }
}

/// Result of one recommendation call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendations {
    pub strategy: Strategy,
    pub status: RecommendationStatus,
    pub items: Vec<RecommendationScore>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendations {
    pub fn new(strategy: Strategy, status: RecommendationStatus, items: Vec<RecommendationScore>) -> Self {
        Self {
            strategy,
            status,
            items,
            generated_at: Utc::now(),
        }
    }

    pub fn ok(strategy: Strategy, items: Vec<RecommendationScore>) -> Self {
        Self::new(strategy, RecommendationStatus::Ok, items)
    }

    pub fn no_history(strategy: Strategy) -> Self {
        Self::new(strategy, RecommendationStatus::NoHistory, Vec::new())
    }

    pub fn no_similar_peers(strategy: Strategy) -> Self {
        Self::new(strategy, RecommendationStatus::NoSimilarPeers, Vec::new())
    }

    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.title.as_str()).collect()
    }
}

/// Relative weights of the two criteria in weighted scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaWeights {
    pub author: f64,
    pub category: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            author: 0.4,
            category: 0.6,
        }
    }
}

/// Explicit author and category preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub authors: Vec<String>,
    /// May repeat a tag; each repetition adds the category weight again
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Which table weighted scoring runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaScope {
    /// Catalog rows, category frequency counted over the whole catalog
    #[default]
    Catalog,
    /// Borrow-record rows, category frequency counted per employee
    History,
}

/// Weighted-criteria result with the criteria that matched nothing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CriteriaRecommendations {
    #[serde(flatten)]
    pub recommendations: Recommendations,
    pub unmatched_authors: Vec<String>,
    pub unmatched_categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&Strategy::UserBased).unwrap();
        assert_eq!(json, "\"user_based\"");

        let parsed: Strategy = serde_json::from_str("\"weighted_criteria\"").unwrap();
        assert_eq!(parsed, Strategy::WeightedCriteria);
    }

    #[test]
    fn test_default_strategy_is_knowledge_based() {
        assert_eq!(Strategy::default(), Strategy::KnowledgeBased);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RecommendationStatus::NoHistory).unwrap();
        assert_eq!(json, "\"no_history\"");
    }

    #[test]
    fn test_default_weights() {
        let weights = CriteriaWeights::default();
        assert_eq!(weights.author, 0.4);
        assert_eq!(weights.category, 0.6);
    }

    #[test]
    fn test_score_without_book_id_skips_field() {
        let score = RecommendationScore {
            book_id: None,
            title: "X".to_string(),
            author: "Alice".to_string(),
            categories: vec!["Fiction".to_string()],
            score: 0.5,
        };
        let json = serde_json::to_value(&score).unwrap();
        assert!(json.get("book_id").is_none());
        assert_eq!(json["score"], 0.5);
    }

    #[test]
    fn test_no_history_has_no_items() {
        let result = Recommendations::no_history(Strategy::ContentBased);
        assert_eq!(result.status, RecommendationStatus::NoHistory);
        assert!(result.items.is_empty());
    }
}
