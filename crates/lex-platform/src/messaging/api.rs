//! Messaging API Endpoints
//!
//! Conversations and messages between any two (or more) authenticated
//! users. Opening a conversation marks its messages read and resets the
//! caller's unread counter.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::messaging::entity::{Conversation, Message};
use crate::messaging::repository::{ConversationRepository, MessageRepository};
use crate::notification::entity::{Notification, NotificationType, RelatedModel};
use crate::notification::repository::NotificationRepository;
use crate::shared::api_common::ApiResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::repository::UserRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// Other participants; the caller is always included
    pub participants: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// A conversation opened for reading: the thread plus its history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// Messaging service state
#[derive(Clone)]
pub struct MessagingState {
    pub conversation_repo: Arc<ConversationRepository>,
    pub message_repo: Arc<MessageRepository>,
    pub user_repo: Arc<UserRepository>,
    pub notification_repo: Arc<NotificationRepository>,
}

/// Start a conversation. A direct conversation between the same two
/// users is reused instead of duplicated.
pub async fn create_conversation(
    State(state): State<MessagingState>,
    auth: Authenticated,
    Json(request): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Conversation>>), PlatformError> {
    let mut participants = request.participants;
    participants.push(auth.user_id.clone());

    for id in &participants {
        if state.user_repo.find_by_id(id).await?.is_none() {
            return Err(PlatformError::not_found("User", id));
        }
    }

    let conversation = Conversation::new(participants);
    if conversation.participants.len() < 2 {
        return Err(PlatformError::validation(
            "A conversation needs at least two participants",
        ));
    }

    if conversation.participants.len() == 2 {
        let pair = [
            conversation.participants[0].clone(),
            conversation.participants[1].clone(),
        ];
        if let Some(existing) = state.conversation_repo.find_direct(&pair).await? {
            return Ok((StatusCode::OK, Json(ApiResponse::new(existing))));
        }
    }

    state.conversation_repo.insert(&conversation).await?;

    info!(conversation_id = %conversation.id, "Conversation created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(conversation))))
}

/// The caller's conversations, most recent activity first
pub async fn list_conversations(
    State(state): State<MessagingState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<Conversation>>>, PlatformError> {
    let conversations = state.conversation_repo.list_for_user(&auth.user_id).await?;
    let count = conversations.len() as u64;

    Ok(Json(ApiResponse::list(conversations, count)))
}

/// Open a conversation: returns the thread and marks it read for the caller
pub async fn get_conversation(
    State(state): State<MessagingState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ConversationDetail>>, PlatformError> {
    let mut conversation = state
        .conversation_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Conversation", &id))?;

    if !conversation.is_participant(&auth.user_id) {
        return Err(PlatformError::forbidden("Not a participant in this conversation"));
    }

    state.message_repo.mark_read(&id, &auth.user_id).await?;
    state.conversation_repo.reset_unread(&id, &auth.user_id).await?;
    // The document was fetched before the reset; mirror it in the response
    conversation.clear_unread(&auth.user_id);

    let messages = state.message_repo.list_for_conversation(&id).await?;

    Ok(Json(ApiResponse::new(ConversationDetail {
        conversation,
        messages,
    })))
}

/// Send a message into a conversation the caller participates in
pub async fn send_message(
    State(state): State<MessagingState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), PlatformError> {
    if request.content.trim().is_empty() {
        return Err(PlatformError::validation("Message content cannot be empty"));
    }

    let conversation = state
        .conversation_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Conversation", &id))?;

    if !conversation.is_participant(&auth.user_id) {
        return Err(PlatformError::forbidden("Not a participant in this conversation"));
    }

    let mut message = Message::new(&conversation.id, &auth.user_id, request.content);
    if !request.attachments.is_empty() {
        message = message.with_attachments(request.attachments);
    }
    state.message_repo.insert(&message).await?;

    let others = conversation.others(&auth.user_id);
    state
        .conversation_repo
        .record_message(&conversation.id, &message.id, &auth.user_id, &others)
        .await?;

    let notifications: Vec<Notification> = others
        .iter()
        .map(|recipient| {
            Notification::new(
                *recipient,
                "New Message",
                format!("{} sent you a message", auth.name),
                NotificationType::Message,
            )
            .with_related(&conversation.id, RelatedModel::Conversation)
        })
        .collect();
    state.notification_repo.insert_many(&notifications).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(message))))
}

/// Create the messaging router
pub fn messaging_router(state: MessagingState) -> Router {
    Router::new()
        .route(
            "/conversations",
            post(create_conversation).get(list_conversations),
        )
        .route("/conversations/:id", get(get_conversation))
        .route("/conversations/:id/messages", post(send_message))
        .with_state(state)
}
