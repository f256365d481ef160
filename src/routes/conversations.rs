use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::social_dto::{
        ConversationListResponse, ConversationSummary, SendMessagePayload,
        StartConversationPayload,
    },
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/conversations",
    responses(
        (status = 200, description = "Inbox ordered by last activity", body = Json<ConversationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_conversations(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let snapshot = state.chat_store.snapshot();
    let now = state.clock.now();
    let items = snapshot
        .conversations
        .iter()
        .map(|c| ConversationSummary::for_user(c, &state.session.user_id, now))
        .collect();
    Ok(Json(ConversationListResponse {
        items,
        analytics: snapshot.analytics,
    }))
}

#[utoipa::path(
    post,
    path = "/api/conversations",
    request_body = StartConversationPayload,
    responses(
        (status = 200, description = "Existing or newly opened conversation", body = Json<Conversation>),
        (status = 404, description = "Unknown user")
    )
)]
#[axum::debug_handler]
pub async fn start_conversation(
    State(state): State<AppState>,
    Json(payload): Json<StartConversationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let conversation = state
        .chat_store
        .start_conversation(&payload.user_id)
        .ok_or_else(|| Error::NotFound(format!("User {} not found", payload.user_id)))?;
    Ok(Json(conversation))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{id}",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Full conversation", body = Json<Conversation>),
        (status = 404, description = "Conversation not found")
    )
)]
#[axum::debug_handler]
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let conversation = state
        .chat_store
        .get_by_id(&id)
        .ok_or_else(|| Error::NotFound(format!("Conversation {} not found", id)))?;
    Ok(Json(conversation))
}

#[utoipa::path(
    post,
    path = "/api/conversations/{id}/messages",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Message sent", body = Json<ChatMessage>),
        (status = 404, description = "Conversation not found"),
        (status = 422, description = "Invalid message body")
    )
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state.chat_store.send_message(&id, &payload.body)?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    post,
    path = "/api/conversations/{id}/read",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let outcome = state.chat_store.mark_read(&id);
    Ok(Json(json!({ "outcome": outcome })))
}

#[utoipa::path(
    delete,
    path = "/api/conversations/{id}",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let outcome = state.chat_store.delete_conversation(&id);
    Ok(Json(json!({ "outcome": outcome })))
}
