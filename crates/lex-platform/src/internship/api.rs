//! Internship API Endpoints
//!
//! Advocates post positions (drafts until an admin approves), interns
//! browse published positions and apply before the deadline.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::internship::entity::{Internship, InternshipStatus, InternshipType};
use crate::internship::repository::{InternshipFilter, InternshipRepository};
use crate::notification::entity::{Notification, NotificationType, RelatedModel};
use crate::notification::repository::NotificationRepository;
use crate::shared::api_common::{
    parse_sort, string_or_number, ApiResponse, PaginationParams, SuccessResponse,
};
use crate::shared::authorization::checks;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::repository::UserRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInternshipRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub duration: u32,
    pub stipend: f64,
    pub location: String,
    #[serde(rename = "type")]
    pub internship_type: InternshipType,
    pub start_date: DateTime<Utc>,
    pub application_deadline: DateTime<Utc>,
    pub number_of_openings: u32,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CreateInternshipRequest {
    fn validate(&self) -> Result<(), PlatformError> {
        if self.title.trim().is_empty() {
            return Err(PlatformError::validation("Please add a title"));
        }
        if self.description.trim().is_empty() {
            return Err(PlatformError::validation("Please add a description"));
        }
        if self.stipend < 0.0 {
            return Err(PlatformError::validation("Stipend cannot be negative"));
        }
        if self.number_of_openings == 0 {
            return Err(PlatformError::validation("Number of openings must be at least 1"));
        }
        if self.application_deadline > self.start_date {
            return Err(PlatformError::validation(
                "Application deadline must be before the start date",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInternshipRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub duration: Option<u32>,
    pub stipend: Option<f64>,
    pub location: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub number_of_openings: Option<u32>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipListQuery {
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

/// Internship service state
#[derive(Clone)]
pub struct InternshipsState {
    pub internship_repo: Arc<InternshipRepository>,
    pub user_repo: Arc<UserRepository>,
    pub notification_repo: Arc<NotificationRepository>,
}

/// Post a new internship. It stays a draft until an admin approves it.
pub async fn create_internship(
    State(state): State<InternshipsState>,
    auth: Authenticated,
    Json(request): Json<CreateInternshipRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Internship>>), PlatformError> {
    checks::require_advocate(&auth)?;
    request.validate()?;

    let mut internship = Internship::new(
        &auth.user_id,
        request.title,
        request.description,
        request.duration,
        request.stipend,
        request.location,
        request.internship_type,
        request.start_date,
        request.application_deadline,
        request.number_of_openings,
    );
    internship.requirements = request.requirements;
    internship.skills = request.skills;

    state.internship_repo.insert(&internship).await?;

    info!(internship_id = %internship.id, advocate_id = %auth.user_id, "Internship posted");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(internship))))
}

/// Public listing of published internships
pub async fn list_internships(
    State(state): State<InternshipsState>,
    Query(query): Query<InternshipListQuery>,
) -> Result<Json<ApiResponse<Vec<Internship>>>, PlatformError> {
    let filter = InternshipFilter {
        location: query.location,
        internship_type: query.internship_type,
        min_stipend: query.min_stipend,
        max_stipend: query.max_stipend,
        query: None,
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

/// The advocate's own posts, drafts included
pub async fn my_posts(
    State(state): State<InternshipsState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<Internship>>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let internships = state.internship_repo.list_for_advocate(&auth.user_id).await?;
    let count = internships.len() as u64;

    Ok(Json(ApiResponse::list(internships, count)))
}

/// Internships the intern has applied to
pub async fn my_applications(
    State(state): State<InternshipsState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<Internship>>>, PlatformError> {
    checks::require_intern(&auth)?;

    let internships = state.internship_repo.list_applied_by(&auth.user_id).await?;
    let count = internships.len() as u64;

    Ok(Json(ApiResponse::list(internships, count)))
}

pub async fn get_internship(
    State(state): State<InternshipsState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Internship>>, PlatformError> {
    let internship = state
        .internship_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Internship", &id))?;

    Ok(Json(ApiResponse::new(internship)))
}

/// Apply to a published internship
pub async fn apply(
    State(state): State<InternshipsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Internship>>, PlatformError> {
    checks::require_intern(&auth)?;

    let mut internship = state
        .internship_repo
        .find_by_id(&id)
        .await?
        .filter(|i| i.status == InternshipStatus::Published)
        .ok_or_else(|| PlatformError::not_found("Internship", &id))?;

    internship.apply(&auth.user_id)?;
    state.internship_repo.update(&internship).await?;

    // Mirror the application on the intern's profile
    state
        .user_repo
        .add_intern_application(&auth.user_id, &internship.id)
        .await?;

    let notification = Notification::new(
        &internship.advocate,
        "New Internship Application",
        format!("{} applied to {}", auth.name, internship.title),
        NotificationType::Internship,
    )
    .with_related(&internship.id, RelatedModel::Internship);
    state.notification_repo.insert(&notification).await?;

    info!(internship_id = %internship.id, intern_id = %auth.user_id, "Internship application recorded");

    Ok(Json(ApiResponse::new(internship)))
}

/// Update an internship post. Only the posting advocate may edit it.
pub async fn update_internship(
    State(state): State<InternshipsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<UpdateInternshipRequest>,
) -> Result<Json<ApiResponse<Internship>>, PlatformError> {
    checks::require_advocate(&auth)?;

    let mut internship = state
        .internship_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Internship", &id))?;

    if !internship.is_owned_by(&auth.user_id) {
        return Err(PlatformError::forbidden("Not the owner of this internship"));
    }

    if let Some(title) = request.title {
        internship.title = title;
    }
    if let Some(description) = request.description {
        internship.description = description;
    }
    if let Some(requirements) = request.requirements {
        internship.requirements = requirements;
    }
    if let Some(duration) = request.duration {
        internship.duration = duration;
    }
    if let Some(stipend) = request.stipend {
        if stipend < 0.0 {
            return Err(PlatformError::validation("Stipend cannot be negative"));
        }
        internship.stipend = stipend;
    }
    if let Some(location) = request.location {
        internship.location = location;
    }
    if let Some(deadline) = request.application_deadline {
        internship.application_deadline = deadline;
    }
    if let Some(openings) = request.number_of_openings {
        internship.number_of_openings = openings;
    }
    if let Some(skills) = request.skills {
        internship.skills = skills;
    }
    internship.updated_at = Utc::now();

    state.internship_repo.update(&internship).await?;

    Ok(Json(ApiResponse::new(internship)))
}

/// Delete an internship post. Only the posting advocate may delete it.
pub async fn delete_internship(
    State(state): State<InternshipsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    checks::require_advocate(&auth)?;

    let internship = state
        .internship_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Internship", &id))?;

    if !internship.is_owned_by(&auth.user_id) {
        return Err(PlatformError::forbidden("Not the owner of this internship"));
    }

    state.internship_repo.delete(&id).await?;

    info!(internship_id = %id, "Internship deleted");

    Ok(Json(SuccessResponse::ok()))
}

/// Create the internships router
pub fn internships_router(state: InternshipsState) -> Router {
    Router::new()
        .route("/", post(create_internship).get(list_internships))
        // Static segments before the id catch-all
        .route("/my-posts", get(my_posts))
        .route("/my-applications", get(my_applications))
        .route(
            "/:id",
            get(get_internship)
                .put(update_internship)
                .delete(delete_internship),
        )
        .route("/:id/apply", post(apply))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_request() -> CreateInternshipRequest {
        CreateInternshipRequest {
            title: "Litigation Intern".to_string(),
            description: "Assist with trial preparation".to_string(),
            requirements: vec![],
            duration: 6,
            stipend: 15000.0,
            location: "Delhi".to_string(),
            internship_type: InternshipType::FullTime,
            start_date: Utc::now() + Duration::days(30),
            application_deadline: Utc::now() + Duration::days(14),
            number_of_openings: 2,
            skills: vec![],
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(valid_request().validate().is_ok());

        let mut req = valid_request();
        req.title = " ".to_string();
        assert!(req.validate().is_err());

        let mut req = valid_request();
        req.stipend = -1.0;
        assert!(req.validate().is_err());

        let mut req = valid_request();
        req.number_of_openings = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_deadline_must_precede_start() {
        let mut req = valid_request();
        req.application_deadline = req.start_date + Duration::days(1);
        assert!(matches!(
            req.validate(),
            Err(PlatformError::Validation { .. })
        ));
    }
}
