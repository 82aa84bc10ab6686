//! Admin API Endpoints
//!
//! Moderation and oversight: advocate verification, internship approval,
//! account listings, and platform analytics. Every route requires the
//! admin role.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::appointment::repository::AppointmentRepository;
use crate::internship::entity::Internship;
use crate::internship::repository::InternshipRepository;
use crate::notification::entity::{Notification, NotificationType, RelatedModel};
use crate::notification::repository::NotificationRepository;
use crate::shared::api_common::{ApiResponse, PaginationParams};
use crate::shared::authorization::checks;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::entity::VerificationStatus;
use crate::user::repository::UserRepository;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardStats {
    pub total_users: i64,
    /// Account counts keyed by role
    pub users_by_role: HashMap<String, i64>,
    pub pending_verifications: u64,
    pub total_appointments: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPoint {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthVolumePoint {
    pub year: i32,
    pub month: i32,
    pub count: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAdvocateEntry {
    pub advocate: String,
    pub name: Option<String>,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub registrations_by_month: Vec<MonthPoint>,
    pub appointments_by_month: Vec<MonthVolumePoint>,
    pub top_advocates: Vec<TopAdvocateEntry>,
}

/// Admin service state
#[derive(Clone)]
pub struct AdminState {
    pub user_repo: Arc<UserRepository>,
    pub appointment_repo: Arc<AppointmentRepository>,
    pub internship_repo: Arc<InternshipRepository>,
    pub notification_repo: Arc<NotificationRepository>,
}

pub async fn dashboard_stats(
    State(state): State<AdminState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<AdminDashboardStats>>, PlatformError> {
    checks::require_admin(&auth)?;

    let role_counts = state.user_repo.count_by_role().await?;
    let total_users = role_counts.iter().map(|r| r.count).sum();
    let users_by_role = role_counts.into_iter().map(|r| (r.role, r.count)).collect();

    let pending_verifications = state.user_repo.count_pending_verifications().await?;
    let total_appointments = state.appointment_repo.count_all().await?;
    let total_revenue = state.appointment_repo.total_revenue().await?;

    Ok(Json(ApiResponse::new(AdminDashboardStats {
        total_users,
        users_by_role,
        pending_verifications,
        total_appointments,
        total_revenue,
    })))
}

/// Advocates awaiting verification, oldest first
pub async fn pending_verifications(
    State(state): State<AdminState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, PlatformError> {
    checks::require_admin(&auth)?;

    let advocates = state.user_repo.find_pending_advocates().await?;
    let data = advocates
        .iter()
        .map(|a| a.to_public())
        .collect::<Result<Vec<_>, _>>()?;
    let count = data.len() as u64;

    Ok(Json(ApiResponse::list(data, count)))
}

pub async fn verify_advocate(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    decide_verification(state, auth, id, VerificationStatus::Approved).await
}

pub async fn reject_advocate(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    decide_verification(state, auth, id, VerificationStatus::Rejected).await
}

async fn decide_verification(
    state: AdminState,
    auth: Authenticated,
    id: String,
    status: VerificationStatus,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    checks::require_admin(&auth)?;

    let matched = state.user_repo.set_verification(&id, status).await?;
    if !matched {
        return Err(PlatformError::not_found("Advocate", &id));
    }

    let (title, body) = match status {
        VerificationStatus::Approved => (
            "Verification Approved",
            "Your advocate account has been verified. Clients can now find and book you.",
        ),
        _ => (
            "Verification Rejected",
            "Your advocate verification was rejected. Contact support for details.",
        ),
    };
    let notification = Notification::new(&id, title, body, NotificationType::Verification)
        .with_related(&id, RelatedModel::User);
    state.notification_repo.insert(&notification).await?;

    info!(advocate_id = %id, ?status, "Advocate verification decided");

    let user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Advocate", &id))?;

    Ok(Json(ApiResponse::new(user.to_public()?)))
}

/// Paginated listing of every account
pub async fn list_users(
    State(state): State<AdminState>,
    auth: Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, PlatformError> {
    checks::require_admin(&auth)?;

    let (users, total) = state.user_repo.list_all(&pagination).await?;
    let data = users
        .iter()
        .map(|u| u.to_public())
        .collect::<Result<Vec<_>, _>>()?;
    let count = data.len() as u64;

    Ok(Json(ApiResponse::paginated(data, count, &pagination, total)))
}

/// Paginated listing of internships in any lifecycle state
pub async fn list_internships(
    State(state): State<AdminState>,
    auth: Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Internship>>>, PlatformError> {
    checks::require_admin(&auth)?;

    let (internships, total) = state.internship_repo.list_all(&pagination).await?;
    let count = internships.len() as u64;

    Ok(Json(ApiResponse::paginated(
        internships,
        count,
        &pagination,
        total,
    )))
}

pub async fn approve_internship(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Internship>>, PlatformError> {
    decide_internship(state, auth, id, true).await
}

pub async fn reject_internship(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Internship>>, PlatformError> {
    decide_internship(state, auth, id, false).await
}

async fn decide_internship(
    state: AdminState,
    auth: Authenticated,
    id: String,
    approve: bool,
) -> Result<Json<ApiResponse<Internship>>, PlatformError> {
    checks::require_admin(&auth)?;

    let mut internship = state
        .internship_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Internship", &id))?;

    internship.review(approve)?;

    let (title, body) = if approve {
        (
            "Internship Approved",
            format!("Your internship '{}' is now published", internship.title),
        )
    } else {
        (
            "Internship Rejected",
            format!("Your internship '{}' was not approved", internship.title),
        )
    };
    state.internship_repo.update(&internship).await?;

    let notification = Notification::new(
        &internship.advocate,
        title,
        body,
        NotificationType::Internship,
    )
    .with_related(&internship.id, RelatedModel::Internship);
    state.notification_repo.insert(&notification).await?;

    info!(internship_id = %internship.id, approve, "Internship reviewed");

    Ok(Json(ApiResponse::new(internship)))
}

/// Platform analytics: registrations and appointment volume per month,
/// plus the busiest advocates with names resolved.
pub async fn analytics(
    State(state): State<AdminState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<AnalyticsResponse>>, PlatformError> {
    checks::require_admin(&auth)?;

    let registrations_by_month = state
        .user_repo
        .monthly_registrations()
        .await?
        .into_iter()
        .map(|m| MonthPoint {
            year: m.month.year,
            month: m.month.month,
            count: m.count,
        })
        .collect();

    let appointments_by_month = state
        .appointment_repo
        .monthly_volume()
        .await?
        .into_iter()
        .map(|m| MonthVolumePoint {
            year: m.month.year,
            month: m.month.month,
            count: m.count,
            revenue: m.revenue,
        })
        .collect();

    let mut top_advocates = Vec::new();
    for entry in state.appointment_repo.top_advocates(10).await? {
        let name = state
            .user_repo
            .find_by_id(&entry.advocate)
            .await?
            .map(|u| u.name);
        top_advocates.push(TopAdvocateEntry {
            advocate: entry.advocate,
            name,
            count: entry.count,
        });
    }

    Ok(Json(ApiResponse::new(AnalyticsResponse {
        registrations_by_month,
        appointments_by_month,
        top_advocates,
    })))
}

/// Create the admin router
pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/advocates/pending-verification", get(pending_verifications))
        .route("/advocates/:id/verify", put(verify_advocate))
        .route("/advocates/:id/reject", put(reject_advocate))
        .route("/users", get(list_users))
        .route("/internships", get(list_internships))
        .route("/internships/:id/approve", put(approve_internship))
        .route("/internships/:id/reject", put(reject_internship))
        .route("/analytics", get(analytics))
        .with_state(state)
}
