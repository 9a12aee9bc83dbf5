//! Entry points for every recommendation strategy

use std::collections::HashSet;

use crate::{
    models::{
        Criteria, CriteriaRecommendations, CriteriaScope, CriteriaWeights, EmployeeId,
        Recommendations, Strategy,
    },
    services::{
        catalog::CatalogSnapshot,
        collaborative,
        content::{self, ContentOptions},
        knowledge,
        weighted::WeightedCriteriaScorer,
    },
};

/// Tunables shared by every recommendation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSettings {
    /// Result size for employee strategies when the caller gives none
    pub default_top_n: usize,
    /// Result size for weighted-criteria requests when the caller gives none
    pub criteria_top_n: usize,
    pub weights: CriteriaWeights,
    pub content: ContentOptions,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_top_n: 3,
            criteria_top_n: 5,
            weights: CriteriaWeights::default(),
            content: ContentOptions::default(),
        }
    }
}

/// Runs recommendation strategies against one snapshot
pub struct Recommender<'a> {
    snapshot: &'a CatalogSnapshot,
    settings: &'a RecommendationSettings,
}

impl<'a> Recommender<'a> {
    pub fn new(snapshot: &'a CatalogSnapshot, settings: &'a RecommendationSettings) -> Self {
        Self { snapshot, settings }
    }

    /// Dispatches an employee-centred request to its strategy
    pub fn recommend(&self, strategy: Strategy, employee_id: EmployeeId, top_n: usize) -> Recommendations {
        let result = match strategy {
            Strategy::KnowledgeBased => self.knowledge_based(employee_id, top_n),
            Strategy::ContentBased => self.content_based(employee_id, top_n),
            Strategy::UserBased => self.user_based_collaborative(employee_id, top_n),
            Strategy::ItemBased => self.item_based_collaborative(employee_id, top_n),
            Strategy::WeightedCriteria => self.weighted_for_employee(employee_id, top_n),
        };

        tracing::info!(
            employee_id = %employee_id,
            strategy = ?strategy,
            status = ?result.status,
            count = result.items.len(),
            "Recommendations computed"
        );
        result
    }

    pub fn knowledge_based(&self, employee_id: EmployeeId, top_n: usize) -> Recommendations {
        knowledge::recommend(self.snapshot, employee_id, top_n)
    }

    pub fn content_based(&self, employee_id: EmployeeId, top_n: usize) -> Recommendations {
        content::recommend(self.snapshot, employee_id, top_n, self.settings.content)
    }

    pub fn user_based_collaborative(&self, employee_id: EmployeeId, top_n: usize) -> Recommendations {
        collaborative::recommend_user_based(self.snapshot, employee_id, top_n)
    }

    pub fn item_based_collaborative(&self, employee_id: EmployeeId, top_n: usize) -> Recommendations {
        collaborative::recommend_item_based(self.snapshot, employee_id, top_n)
    }

    /// Weighted scoring with explicit criteria
    pub fn weighted_criteria(
        &self,
        criteria: &Criteria,
        weights: CriteriaWeights,
        scope: CriteriaScope,
        top_n: usize,
    ) -> CriteriaRecommendations {
        let scorer = WeightedCriteriaScorer::new(weights);
        let mut scores = match scope {
            CriteriaScope::Catalog => scorer.score_global(self.snapshot.books(), criteria),
            CriteriaScope::History => scorer.score_for_employee(self.snapshot.records(), criteria),
        };

        for item in scores.items.iter_mut().filter(|item| item.book_id.is_none()) {
            item.book_id = self.snapshot.book_by_title(&item.title).map(|book| book.id.clone());
        }
        scores.items.truncate(top_n);

        tracing::info!(
            authors = criteria.authors.len(),
            categories = criteria.categories.len(),
            scope = ?scope,
            count = scores.items.len(),
            "Weighted criteria computed"
        );

        CriteriaRecommendations {
            recommendations: Recommendations::ok(Strategy::WeightedCriteria, scores.items),
            unmatched_authors: scores.unmatched_authors,
            unmatched_categories: scores.unmatched_categories,
        }
    }

    /// Weighted scoring with criteria derived from one employee's history
    ///
    /// Every tag of every borrow record becomes a category criterion, so tags
    /// borrowed repeatedly weigh more. No author criterion is applied, and
    /// books the employee already borrowed are left out.
    pub fn weighted_for_employee(&self, employee_id: EmployeeId, top_n: usize) -> Recommendations {
        let records = self.snapshot.borrowed_by(employee_id);
        if records.is_empty() {
            tracing::info!(employee_id = %employee_id, "No borrow history for weighted criteria");
            return Recommendations::no_history(Strategy::WeightedCriteria);
        }

        let criteria = Criteria {
            authors: Vec::new(),
            categories: records
                .iter()
                .flat_map(|record| record.categories.iter().cloned())
                .collect(),
        };
        let borrowed: HashSet<&str> = records.iter().map(|record| record.title.as_str()).collect();

        let scores = WeightedCriteriaScorer::new(self.settings.weights)
            .score_global(self.snapshot.books(), &criteria);
        let items = scores
            .items
            .into_iter()
            .filter(|item| !borrowed.contains(item.title.as_str()))
            .take(top_n)
            .collect();

        Recommendations::ok(Strategy::WeightedCriteria, items)
    }
}
