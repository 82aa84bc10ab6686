//! Advocate API Endpoints
//!
//! The public advocate directory plus the advocate's own workspace:
//! incoming case requests, appointments, availability, and dashboard.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::appointment::entity::{Appointment, AppointmentStatus};
use crate::appointment::repository::AppointmentRepository;
use crate::notification::entity::{Notification, NotificationType, RelatedModel};
use crate::notification::repository::NotificationRepository;
use crate::shared::api_common::{parse_sort, string_or_number, ApiResponse, PaginationParams};
use crate::shared::authorization::checks;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::entity::{DayAvailability, Location, RoleProfile, VerificationStatus};
use crate::user::repository::{AdvocateFilter, UserRepository};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocateListQuery {
    pub city: Option<String>,
    pub specialization: Option<String>,
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
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdvocateProfileRequest {
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub consultation_fee: Option<f64>,
    pub location: Option<Location>,
    pub availability: Option<Vec<DayAvailability>>,
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocateDashboardStats {
    pub total_appointments: u64,
    pub upcoming_appointments: u64,
    pub pending_requests: u64,
    pub appointments_this_month: u64,
    pub total_earnings: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatusResponse {
    pub verified: bool,
    pub verification_status: VerificationStatus,
}

/// Advocate service state
#[derive(Clone)]
pub struct AdvocatesState {
    pub user_repo: Arc<UserRepository>,
    pub appointment_repo: Arc<AppointmentRepository>,
    pub notification_repo: Arc<NotificationRepository>,
}

/// Public directory of approved advocates
pub async fn list_advocates(
    State(state): State<AdvocatesState>,
    Query(query): Query<AdvocateListQuery>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, PlatformError> {
    let filter = AdvocateFilter {
        city: query.city,
        specialization: query.specialization,
        min_fee: query.min_fee,
        max_fee: query.max_fee,
        query: None,
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

/// Public advocate detail
pub async fn get_advocate(
    State(state): State<AdvocatesState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    let user = state
        .user_repo
        .find_by_id(&id)
        .await?
        .filter(|u| u.advocate_profile().is_some())
        .ok_or_else(|| PlatformError::not_found("Advocate", &id))?;

    Ok(Json(ApiResponse::new(user.to_public()?)))
}

/// Incoming pending case requests for the authenticated advocate
pub async fn list_case_requests(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let requests = state.appointment_repo.pending_for_advocate(&auth.user_id).await?;
    let count = requests.len() as u64;

    Ok(Json(ApiResponse::list(requests, count)))
}

pub async fn accept_case_request(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Appointment>>, PlatformError> {
    decide_case_request(state, auth, id, true).await
}

pub async fn reject_case_request(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Appointment>>, PlatformError> {
    decide_case_request(state, auth, id, false).await
}

/// Accept or reject a pending case request
async fn decide_case_request(
    state: AdvocatesState,
    auth: Authenticated,
    id: String,
    accept: bool,
) -> Result<Json<ApiResponse<Appointment>>, PlatformError> {
    checks::require_advocate(&auth)?;

    // Owner scoping: a request belonging to another advocate reads as absent
    let mut appointment = state
        .appointment_repo
        .find_by_id(&id)
        .await?
        .filter(|a| a.advocate == auth.user_id)
        .ok_or_else(|| PlatformError::not_found("Case request", &id))?;

    if !appointment.is_pending() {
        return Err(PlatformError::validation("Case request has already been decided"));
    }

    let outcome = if accept {
        appointment.confirm();
        "accepted"
    } else {
        appointment.cancel();
        "rejected"
    };
    state.appointment_repo.update(&appointment).await?;

    let notification = Notification::new(
        &appointment.client,
        "Case Request Update",
        format!("{} has {} your case request", auth.name, outcome),
        NotificationType::CaseRequest,
    )
    .with_related(&appointment.id, RelatedModel::Appointment);
    state.notification_repo.insert(&notification).await?;

    info!(appointment_id = %appointment.id, outcome, "Case request decided");

    Ok(Json(ApiResponse::new(appointment)))
}

/// The advocate's appointments with optional status/date filters
pub async fn list_appointments(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let appointments = state
        .appointment_repo
        .list_for_advocate(&auth.user_id, query.status, query.date.as_deref())
        .await?;
    let count = appointments.len() as u64;

    Ok(Json(ApiResponse::list(appointments, count)))
}

pub async fn dashboard_stats(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<AdvocateDashboardStats>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let now = Utc::now();
    let today = now.format("%Y-%m-%d").to_string();
    let month_start = format!("{:04}-{:02}-01", now.year(), now.month());

    let total_appointments = state.appointment_repo.count_for("advocate", &auth.user_id).await?;
    let upcoming_appointments = state
        .appointment_repo
        .count_upcoming("advocate", &auth.user_id, &today)
        .await?;
    let pending_requests = state
        .appointment_repo
        .count_with_status("advocate", &auth.user_id, AppointmentStatus::Pending)
        .await?;
    let appointments_this_month = state
        .appointment_repo
        .count_since("advocate", &auth.user_id, &month_start)
        .await?;
    let total_earnings = state
        .appointment_repo
        .completed_fee_total("advocate", &auth.user_id)
        .await?;

    Ok(Json(ApiResponse::new(AdvocateDashboardStats {
        total_appointments,
        upcoming_appointments,
        pending_requests,
        appointments_this_month,
        total_earnings,
    })))
}

/// The advocate's own verification state
pub async fn verification_status(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<VerificationStatusResponse>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let user = state
        .user_repo
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &auth.user_id))?;

    Ok(Json(ApiResponse::new(VerificationStatusResponse {
        verified: user.verified,
        verification_status: user.verification_status,
    })))
}

/// Update the advocate's professional profile. Identity fields and the
/// bar council number are not editable here.
pub async fn update_profile(
    State(state): State<AdvocatesState>,
    auth: Authenticated,
    Json(request): Json<UpdateAdvocateProfileRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let mut user = state
        .user_repo
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &auth.user_id))?;

    let RoleProfile::Advocate(ref mut profile) = user.profile else {
        return Err(PlatformError::forbidden("Requires advocate role"));
    };

    if let Some(specialization) = request.specialization {
        profile.specialization = specialization;
    }
    if let Some(experience) = request.experience {
        profile.experience = experience;
    }
    if let Some(fee) = request.consultation_fee {
        if fee < 0.0 {
            return Err(PlatformError::validation("Consultation fee cannot be negative"));
        }
        profile.consultation_fee = fee;
    }
    if let Some(location) = request.location {
        profile.location = Some(location);
    }
    if let Some(availability) = request.availability {
        profile.availability = availability;
    }
    if let Some(languages) = request.languages {
        profile.languages = languages;
    }
    user.updated_at = Utc::now();

    state.user_repo.update(&user).await?;

    Ok(Json(ApiResponse::new(user.to_public()?)))
}

/// Create the advocates router
pub fn advocates_router(state: AdvocatesState) -> Router {
    Router::new()
        .route("/", get(list_advocates))
        .route("/case-requests", get(list_case_requests))
        .route("/case-requests/:id/accept", put(accept_case_request))
        .route("/case-requests/:id/reject", put(reject_case_request))
        .route("/appointments", get(list_appointments))
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/verification-status", get(verification_status))
        .route("/profile", put(update_profile))
        .route("/:id", get(get_advocate))
        .with_state(state)
}
