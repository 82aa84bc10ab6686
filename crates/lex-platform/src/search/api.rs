//! Search API Endpoints
//!
//! Free-text search over the public advocate directory and published
//! internships. Query input is regex-escaped before it reaches MongoDB.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::internship::entity::Internship;
use crate::internship::repository::{InternshipFilter, InternshipRepository};
use crate::shared::api_common::{parse_sort, string_or_number, ApiResponse, PaginationParams};
use crate::shared::error::PlatformError;
use crate::user::repository::{AdvocateFilter, UserRepository};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocateSearchQuery {
    /// Free-text match over name and specialization
    pub q: Option<String>,
    pub city: Option<String>,
    /// Practice area, matched against specialization
    pub category: Option<String>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
    pub min_fee: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
    pub max_fee: Option<f64>,
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipSearchQuery {
    /// Free-text match over title and description
    pub q: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub internship_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
    pub min_stipend: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
    pub max_stipend: Option<f64>,
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Search service state
#[derive(Clone)]
pub struct SearchState {
    pub user_repo: Arc<UserRepository>,
    pub internship_repo: Arc<InternshipRepository>,
}

pub async fn search_advocates(
    State(state): State<SearchState>,
    Query(query): Query<AdvocateSearchQuery>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, PlatformError> {
    let filter = AdvocateFilter {
        city: query.city,
        specialization: query.category,
        min_fee: query.min_fee,
        max_fee: query.max_fee,
        query: query.q,
    };
    let sort = parse_sort(query.sort.as_deref(), "-ratings");

    let (advocates, total) = state
        .user_repo
        .list_advocates(&filter, sort, &query.pagination)
        .await?;

    let data = advocates
        .iter()
        .map(|a| a.to_public())
        .collect::<Result<Vec<_>, _>>()?;
    let count = data.len() as u64;

    Ok(Json(ApiResponse::paginated(data, count, &query.pagination, total)))
}

pub async fn search_internships(
    State(state): State<SearchState>,
    Query(query): Query<InternshipSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Internship>>>, PlatformError> {
    let filter = InternshipFilter {
        location: query.location,
        internship_type: query.internship_type,
        min_stipend: query.min_stipend,
        max_stipend: query.max_stipend,
        query: query.q,
    };
    let sort = parse_sort(query.sort.as_deref(), "-createdAt");

    let (internships, total) = state
        .internship_repo
        .list_published(&filter, sort, &query.pagination)
        .await?;
    let count = internships.len() as u64;

    Ok(Json(ApiResponse::paginated(
        internships,
        count,
        &query.pagination,
        total,
    )))
}

/// Create the search router
pub fn search_router(state: SearchState) -> Router {
    Router::new()
        .route("/advocates", get(search_advocates))
        .route("/internships", get(search_internships))
        .with_state(state)
}
