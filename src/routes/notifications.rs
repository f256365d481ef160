use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::social_dto::{NotificationListResponse, NotificationQuery, NotificationView},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(
        ("kind" = Option<String>, Query, description = "Only this notification kind"),
        ("unread_only" = Option<bool>, Query, description = "Hide read notifications")
    ),
    responses(
        (status = 200, description = "Notifications, newest first", body = Json<NotificationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse> {
    let now = state.clock.now();
    let items = state
        .notification_store
        .list(&query)
        .into_iter()
        .map(|n| NotificationView::new(n, now))
        .collect();
    Ok(Json(NotificationListResponse {
        items,
        analytics: state.notification_store.snapshot().analytics,
    }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Outcome; unknown or already read ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let outcome = state.notification_store.mark_read(&id);
    Ok(Json(json!({ "outcome": outcome })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications marked read")
    )
)]
#[axum::debug_handler]
pub async fn mark_all_read(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let updated = state.notification_store.mark_all_read();
    Ok(Json(json!({ "updated": updated })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let outcome = state.notification_store.delete(&id);
    Ok(Json(json!({ "outcome": outcome })))
}
