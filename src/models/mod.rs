pub mod book;
pub mod recommendation;

pub use book::{Book, BookFeatures, BookRow, BorrowRecord, BorrowRow, EmployeeId};
pub use recommendation::{
    Criteria, CriteriaRecommendations, CriteriaScope, CriteriaWeights, RecommendationScore,
    RecommendationStatus, Recommendations, Strategy,
};

use serde::Serialize;

/// Employee listed in the borrowing history
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
}
