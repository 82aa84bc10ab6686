//! Client API Endpoints
//!
//! Case requests, slot booking, and the client dashboard. Every route
//! requires the client role.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::appointment::entity::{weekday_name, Appointment, AppointmentStatus, AppointmentType};
use crate::appointment::repository::AppointmentRepository;
use crate::notification::entity::{Notification, NotificationType, RelatedModel};
use crate::notification::repository::NotificationRepository;
use crate::shared::api_common::ApiResponse;
use crate::shared::authorization::checks;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::repository::UserRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRequestBody {
    pub advocate: String,
    pub date: String,
    pub start_time: String,
    #[serde(default, rename = "type")]
    pub appointment_type: Option<AppointmentType>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentBody {
    pub advocate: String,
    pub date: String,
    pub start_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDashboardStats {
    pub total_appointments: u64,
    pub upcoming_appointments: u64,
    pub total_spent: f64,
}

/// Client service state
#[derive(Clone)]
pub struct ClientsState {
    pub user_repo: Arc<UserRepository>,
    pub appointment_repo: Arc<AppointmentRepository>,
    pub notification_repo: Arc<NotificationRepository>,
}

/// Create a pending case request against a verified advocate
pub async fn create_case_request(
    State(state): State<ClientsState>,
    auth: Authenticated,
    Json(body): Json<CaseRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<Appointment>>), PlatformError> {
    checks::require_client(&auth)?;

    let advocate = state
        .user_repo
        .find_by_id(&body.advocate)
        .await?
        .ok_or_else(|| PlatformError::not_found("Advocate", &body.advocate))?;

    let profile = advocate
        .advocate_profile()
        .ok_or_else(|| PlatformError::not_found("Advocate", &body.advocate))?;

    if !advocate.verified {
        return Err(PlatformError::UnverifiedAdvocate);
    }

    // Validates the date format as a side effect
    weekday_name(&body.date)?;

    let mut appointment = Appointment::new(
        &auth.user_id,
        &advocate.id,
        &body.date,
        &body.start_time,
        body.appointment_type.unwrap_or(AppointmentType::Consultation),
        profile.consultation_fee,
    );
    if let Some(notes) = body.notes {
        appointment = appointment.with_notes(notes);
    }

    state.appointment_repo.insert(&appointment).await?;

    let notification = Notification::new(
        &advocate.id,
        "New Case Request",
        format!("{} sent you a case request", auth.name),
        NotificationType::CaseRequest,
    )
    .with_related(&appointment.id, RelatedModel::Appointment);
    state.notification_repo.insert(&notification).await?;

    info!(appointment_id = %appointment.id, advocate_id = %advocate.id, "Case request created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(appointment))))
}

/// Book a confirmed appointment into an open availability slot
pub async fn book_appointment(
    State(state): State<ClientsState>,
    auth: Authenticated,
    Json(body): Json<BookAppointmentBody>,
) -> Result<(StatusCode, Json<ApiResponse<Appointment>>), PlatformError> {
    checks::require_client(&auth)?;

    let advocate = state
        .user_repo
        .find_by_id(&body.advocate)
        .await?
        .ok_or_else(|| PlatformError::not_found("Advocate", &body.advocate))?;

    let profile = advocate
        .advocate_profile()
        .ok_or_else(|| PlatformError::not_found("Advocate", &body.advocate))?;

    if !advocate.verified {
        return Err(PlatformError::UnverifiedAdvocate);
    }

    let day = weekday_name(&body.date)?;
    let slot = profile
        .find_open_slot(day, &body.start_time)
        .ok_or(PlatformError::SlotUnavailable)?;
    let end_time = slot.end_time.clone();

    let mut appointment = Appointment::new(
        &auth.user_id,
        &advocate.id,
        &body.date,
        &body.start_time,
        AppointmentType::Consultation,
        profile.consultation_fee,
    )
    .with_end_time(end_time)
    .confirmed();
    if let Some(notes) = body.notes {
        appointment = appointment.with_notes(notes);
    }

    // The (advocate, date, startTime) unique index is the double-booking
    // guard; a lost race surfaces as a duplicate-key write error
    state
        .appointment_repo
        .insert(&appointment)
        .await
        .map_err(|e| match e {
            PlatformError::Duplicate { .. } => PlatformError::SlotUnavailable,
            other => other,
        })?;

    // Advisory bookkeeping; not rolled back if the process dies here
    if let Err(e) = state
        .user_repo
        .mark_slot_booked(&advocate.id, day, &body.start_time, true)
        .await
    {
        warn!(advocate_id = %advocate.id, error = %e, "Failed to flag availability slot");
    }

    let notification = Notification::new(
        &advocate.id,
        "New Appointment",
        format!("{} booked an appointment on {}", auth.name, appointment.date),
        NotificationType::Appointment,
    )
    .with_related(&appointment.id, RelatedModel::Appointment);
    state.notification_repo.insert(&notification).await?;

    info!(appointment_id = %appointment.id, advocate_id = %advocate.id, "Appointment booked");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(appointment))))
}

/// The client's case history
pub async fn list_cases(
    State(state): State<ClientsState>,
    auth: Authenticated,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, PlatformError> {
    checks::require_client(&auth)?;

    let cases = state
        .appointment_repo
        .list_for_client(&auth.user_id, query.status, None)
        .await?;
    let count = cases.len() as u64;

    Ok(Json(ApiResponse::list(cases, count)))
}

/// The client's appointments with optional status/date filters
pub async fn list_appointments(
    State(state): State<ClientsState>,
    auth: Authenticated,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, PlatformError> {
    checks::require_client(&auth)?;

    let appointments = state
        .appointment_repo
        .list_for_client(&auth.user_id, query.status, query.date.as_deref())
        .await?;
    let count = appointments.len() as u64;

    Ok(Json(ApiResponse::list(appointments, count)))
}

pub async fn dashboard_stats(
    State(state): State<ClientsState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<ClientDashboardStats>>, PlatformError> {
    checks::require_client(&auth)?;

    let today = Utc::now().format("%Y-%m-%d").to_string();

    let total_appointments = state.appointment_repo.count_for("client", &auth.user_id).await?;
    let upcoming_appointments = state
        .appointment_repo
        .count_upcoming("client", &auth.user_id, &today)
        .await?;
    let total_spent = state
        .appointment_repo
        .completed_fee_total("client", &auth.user_id)
        .await?;

    Ok(Json(ApiResponse::new(ClientDashboardStats {
        total_appointments,
        upcoming_appointments,
        total_spent,
    })))
}

/// Create the clients router
pub fn clients_router(state: ClientsState) -> Router {
    Router::new()
        .route("/case-requests", post(create_case_request))
        .route("/book-appointment", post(book_appointment))
        .route("/cases", get(list_cases))
        .route("/appointments", get(list_appointments))
        .route("/dashboard-stats", get(dashboard_stats))
        .with_state(state)
}
