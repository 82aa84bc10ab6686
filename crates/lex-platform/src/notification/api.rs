//! Notification API Endpoints
//!
//! A user's inbox. Entries referencing another entity are returned with
//! the referenced entity resolved inline, dispatched on the `onModel` tag.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::appointment::repository::AppointmentRepository;
use crate::internship::repository::InternshipRepository;
use crate::messaging::repository::ConversationRepository;
use crate::notification::entity::{Notification, RelatedModel};
use crate::notification::repository::NotificationRepository;
use crate::shared::api_common::{ApiResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::repository::UserRepository;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    pub read: Option<bool>,
}

/// Inbox entry with the referenced entity resolved inline
#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<serde_json::Value>,
}

/// Notification service state
#[derive(Clone)]
pub struct NotificationsState {
    pub notification_repo: Arc<NotificationRepository>,
    pub appointment_repo: Arc<AppointmentRepository>,
    pub internship_repo: Arc<InternshipRepository>,
    pub conversation_repo: Arc<ConversationRepository>,
    pub user_repo: Arc<UserRepository>,
}

impl NotificationsState {
    /// Resolve the referenced entity. A dangling reference resolves to
    /// nothing rather than failing the whole listing.
    async fn resolve_related(
        &self,
        notification: &Notification,
    ) -> Result<Option<serde_json::Value>, PlatformError> {
        let (Some(related_id), Some(model)) = (&notification.related_id, notification.on_model)
        else {
            return Ok(None);
        };

        let value = match model {
            RelatedModel::Appointment => self
                .appointment_repo
                .find_by_id(related_id)
                .await?
                .map(serde_json::to_value)
                .transpose()?,
            RelatedModel::Internship => self
                .internship_repo
                .find_by_id(related_id)
                .await?
                .map(serde_json::to_value)
                .transpose()?,
            RelatedModel::Conversation => self
                .conversation_repo
                .find_by_id(related_id)
                .await?
                .map(serde_json::to_value)
                .transpose()?,
            RelatedModel::User => match self.user_repo.find_by_id(related_id).await? {
                Some(user) => Some(user.to_public()?),
                None => None,
            },
        };
        Ok(value)
    }
}

/// The caller's inbox, newest first
pub async fn list_notifications(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, PlatformError> {
    let notifications = state
        .notification_repo
        .list_for_user(&auth.user_id, query.read)
        .await?;

    let mut views = Vec::with_capacity(notifications.len());
    for notification in notifications {
        let related = state.resolve_related(&notification).await?;
        views.push(NotificationView {
            notification,
            related,
        });
    }
    let count = views.len() as u64;

    Ok(Json(ApiResponse::list(views, count)))
}

pub async fn unread_count(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<u64>>, PlatformError> {
    let count = state.notification_repo.count_unread(&auth.user_id).await?;
    Ok(Json(ApiResponse::new(count)))
}

/// Mark one notification as read. Owner-scoped.
pub async fn mark_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let matched = state.notification_repo.mark_read(&id, &auth.user_id).await?;
    if !matched {
        return Err(PlatformError::not_found("Notification", &id));
    }
    Ok(Json(SuccessResponse::ok()))
}

pub async fn mark_all_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let modified = state.notification_repo.mark_all_read(&auth.user_id).await?;
    Ok(Json(SuccessResponse::with_message(format!(
        "{modified} notifications marked as read"
    ))))
}

/// Create the notifications router
pub fn notifications_router(state: NotificationsState) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", put(mark_all_read))
        .route("/:id/read", put(mark_read))
        .with_state(state)
}
