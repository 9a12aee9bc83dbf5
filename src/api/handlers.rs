use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        Criteria, CriteriaRecommendations, CriteriaScope, CriteriaWeights, Employee, EmployeeId,
        Recommendations, Strategy,
    },
    services::recommender::Recommender,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub strategy: Strategy,
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CriteriaRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub author_weight: Option<f64>,
    pub category_weight: Option<f64>,
    pub top_n: Option<usize>,
    #[serde(default)]
    pub scope: CriteriaScope,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub books: usize,
    pub borrow_records: usize,
    pub loaded_at: DateTime<Utc>,
}

fn resolve_top_n(requested: Option<usize>, default: usize) -> AppResult<usize> {
    match requested {
        Some(0) => Err(AppError::InvalidInput("top_n must be at least 1".to_string())),
        Some(top_n) => Ok(top_n),
        None => Ok(default),
    }
}

fn resolve_weight(requested: Option<f64>, default: f64, name: &str) -> AppResult<f64> {
    match requested {
        Some(weight) if !weight.is_finite() || weight < 0.0 => Err(AppError::InvalidInput(format!(
            "{name} must be a non-negative number"
        ))),
        Some(weight) => Ok(weight),
        None => Ok(default),
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// List employees present in the borrowing history
pub async fn list_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.snapshot().await.employees())
}

/// List distinct catalog authors
pub async fn list_authors(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.snapshot().await.authors())
}

/// List distinct catalog category tags
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.snapshot().await.categories())
}

/// Recommend books for one employee with the requested strategy
pub async fn employee_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(employee_id): Path<u64>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Recommendations>> {
    let top_n = resolve_top_n(query.top_n, state.settings.default_top_n)?;
    let employee_id = EmployeeId(employee_id);

    tracing::info!(
        request_id = %request_id,
        employee_id = %employee_id,
        strategy = ?query.strategy,
        top_n,
        "Processing recommendation request"
    );

    let snapshot = state.snapshot().await;
    let result = Recommender::new(&snapshot, &state.settings).recommend(query.strategy, employee_id, top_n);

    Ok(Json(result))
}

/// Recommend books for explicit author and category criteria
pub async fn criteria_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CriteriaRequest>,
) -> AppResult<Json<CriteriaRecommendations>> {
    let top_n = resolve_top_n(request.top_n, state.settings.criteria_top_n)?;
    let weights = CriteriaWeights {
        author: resolve_weight(request.author_weight, state.settings.weights.author, "author_weight")?,
        category: resolve_weight(
            request.category_weight,
            state.settings.weights.category,
            "category_weight",
        )?,
    };

    tracing::info!(
        request_id = %request_id,
        authors = request.criteria.authors.len(),
        categories = request.criteria.categories.len(),
        scope = ?request.scope,
        "Processing criteria request"
    );

    let snapshot = state.snapshot().await;
    let result = Recommender::new(&snapshot, &state.settings).weighted_criteria(
        &request.criteria,
        weights,
        request.scope,
        top_n,
    );

    Ok(Json(result))
}

/// Reload the catalog and borrowing history from the data source
pub async fn reload_catalog(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ReloadResponse>> {
    tracing::info!(request_id = %request_id, "Reloading catalog");

    let snapshot = state.reload().await?;
    Ok(Json(ReloadResponse {
        books: snapshot.books().len(),
        borrow_records: snapshot.records().len(),
        loaded_at: snapshot.loaded_at(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_top_n() {
        assert_eq!(resolve_top_n(None, 3).unwrap(), 3);
        assert_eq!(resolve_top_n(Some(7), 3).unwrap(), 7);
        assert!(matches!(resolve_top_n(Some(0), 3), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_weight() {
        assert_eq!(resolve_weight(None, 0.4, "w").unwrap(), 0.4);
        assert_eq!(resolve_weight(Some(1.5), 0.4, "w").unwrap(), 1.5);
        assert!(resolve_weight(Some(-0.1), 0.4, "w").is_err());
        assert!(resolve_weight(Some(f64::NAN), 0.4, "w").is_err());
    }

    #[test]
    fn test_criteria_request_defaults() {
        let request: CriteriaRequest = serde_json::from_str(r#"{"authors": ["Alice"]}"#).unwrap();
        assert_eq!(request.criteria.authors, vec!["Alice"]);
        assert!(request.criteria.categories.is_empty());
        assert_eq!(request.scope, CriteriaScope::Catalog);
        assert!(request.top_n.is_none());
    }
}
