use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "session_user_id": state.session.user_id,
        "jobs": state.job_store.analytics().total_jobs,
        "posts": state.feed_store.snapshot().analytics.total_posts,
    });
    (StatusCode::OK, Json(body))
}
