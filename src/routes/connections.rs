use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::social_dto::{ConnectionSearchQuery, RequestAction, SendConnectionRequestPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/connections",
    params(
        ("keyword" = Option<String>, Query, description = "Narrow connections by name, headline or company")
    ),
    responses(
        (status = 200, description = "Connections, pending requests and suggestions", body = Json<ConnectionSnapshot>)
    )
)]
#[axum::debug_handler]
pub async fn list_connections(
    State(state): State<AppState>,
    Query(query): Query<ConnectionSearchQuery>,
) -> Result<impl IntoResponse> {
    let mut snapshot = state.connection_store.snapshot();
    if !query.keyword.trim().is_empty() {
        snapshot.connections = state.connection_store.search(&query.keyword);
    }
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/api/connections/requests",
    request_body = SendConnectionRequestPayload,
    responses(
        (status = 200, description = "Request outcome; only suggested users can be invited"),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn send_request(
    State(state): State<AppState>,
    Json(payload): Json<SendConnectionRequestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .connection_store
        .send_request(&payload.user_id, payload.message);
    Ok(Json(json!({ "outcome": outcome })))
}

#[utoipa::path(
    post,
    path = "/api/connections/requests/{id}/{action}",
    params(
        ("id" = String, Path, description = "Request ID"),
        ("action" = String, Path, description = "accept, decline or withdraw")
    ),
    responses(
        (status = 200, description = "Request outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn respond_to_request(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, RequestAction)>,
) -> Result<impl IntoResponse> {
    let outcome = state.connection_store.respond(&id, action);
    Ok(Json(json!({ "outcome": outcome })))
}

#[utoipa::path(
    delete,
    path = "/api/connections/{user_id}",
    params(
        ("user_id" = String, Path, description = "Connected user ID")
    ),
    responses(
        (status = 200, description = "Removal outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn remove_connection(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let outcome = state.connection_store.remove_connection(&user_id);
    Ok(Json(json!({ "outcome": outcome })))
}
