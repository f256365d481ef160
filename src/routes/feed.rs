use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::post_dto::{CreatePostPayload, FeedFilter, FeedResponse, PostMutation},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/feed/refresh",
    request_body = FeedFilter,
    responses(
        (status = 200, description = "First page of the feed", body = Json<FeedResponse>)
    )
)]
#[axum::debug_handler]
pub async fn refresh_feed(
    State(state): State<AppState>,
    Json(filter): Json<FeedFilter>,
) -> Result<impl IntoResponse> {
    let snapshot = state.feed_store.refresh(filter).await;
    Ok(Json(FeedResponse::from(snapshot)))
}

#[utoipa::path(
    post,
    path = "/api/feed/load-more",
    responses(
        (status = 200, description = "Feed with the next page appended", body = Json<FeedResponse>)
    )
)]
#[axum::debug_handler]
pub async fn load_more_feed(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let snapshot = state.feed_store.load_more().await;
    Ok(Json(FeedResponse::from(snapshot)))
}

#[utoipa::path(
    get,
    path = "/api/feed",
    responses(
        (status = 200, description = "Currently visible posts", body = Json<FeedResponse>)
    )
)]
#[axum::debug_handler]
pub async fn get_feed(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(FeedResponse::from(state.feed_store.snapshot())))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostPayload,
    responses(
        (status = 201, description = "Post published", body = Json<Post>),
        (status = 422, description = "Invalid content")
    )
)]
#[axum::debug_handler]
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<impl IntoResponse> {
    let post = state.feed_store.create_post(payload)?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post found", body = Json<Post>),
        (status = 404, description = "Post not loaded")
    )
)]
#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let post = state
        .feed_store
        .get_by_id(&id)
        .ok_or_else(|| Error::NotFound(format!("Post {} not found", id)))?;
    Ok(Json(post))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/actions",
    params(
        ("id" = String, Path, description = "Post ID")
    ),
    request_body = PostMutation,
    responses(
        (status = 200, description = "Mutation outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn post_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mutation): Json<PostMutation>,
) -> Result<impl IntoResponse> {
    let outcome = state.feed_store.mutate(&id, mutation);
    Ok(Json(json!({
        "outcome": outcome,
        "post": state.feed_store.get_by_id(&id),
    })))
}
