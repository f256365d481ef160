use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    dto::job_dto::{
        ApplicationListResponse, JobFilterCriteria, JobListResponse, JobMutation, JobSummary,
        UpdateApplicationStatusPayload,
    },
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs/search",
    request_body = JobFilterCriteria,
    responses(
        (status = 200, description = "First page of matching jobs", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn search_jobs(
    State(state): State<AppState>,
    Json(criteria): Json<JobFilterCriteria>,
) -> Result<impl IntoResponse> {
    let snapshot = state.job_store.search(criteria).await;
    Ok(Json(JobListResponse::from_snapshot(
        snapshot,
        &state.session.user_id,
    )))
}

#[utoipa::path(
    post,
    path = "/api/jobs/load-more",
    responses(
        (status = 200, description = "Results with the next page appended", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn load_more_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let snapshot = state.job_store.load_more().await;
    Ok(Json(JobListResponse::from_snapshot(
        snapshot,
        &state.session.user_id,
    )))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "Currently visible results", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(JobListResponse::from_snapshot(
        state.job_store.snapshot(),
        &state.session.user_id,
    )))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Json<JobPosting>),
        (status = 404, description = "Job not loaded")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_store
        .get_by_id(&id)
        .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))?;
    Ok(Json(job))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/actions",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    request_body = JobMutation,
    responses(
        (status = 200, description = "Mutation outcome; unknown ids are ignored")
    )
)]
#[axum::debug_handler]
pub async fn job_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mutation): Json<JobMutation>,
) -> Result<impl IntoResponse> {
    let outcome = state.job_store.mutate(&id, mutation);
    let job = state
        .job_store
        .get_by_id(&id)
        .map(|job| JobSummary::for_user(&job, &state.session.user_id));
    Ok(Json(json!({ "outcome": outcome, "job": job })))
}

#[utoipa::path(
    get,
    path = "/api/jobs/saved",
    responses(
        (status = 200, description = "Jobs saved by the session user", body = Json<Vec<JobSummary>>)
    )
)]
#[axum::debug_handler]
pub async fn list_saved_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let saved: Vec<JobSummary> = state
        .job_store
        .saved_jobs()
        .iter()
        .map(|job| JobSummary::for_user(job, &state.session.user_id))
        .collect();
    Ok(Json(saved))
}

#[utoipa::path(
    get,
    path = "/api/jobs/analytics",
    responses(
        (status = 200, description = "Aggregates over the whole job dataset", body = Json<JobAnalytics>)
    )
)]
#[axum::debug_handler]
pub async fn job_analytics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.job_store.analytics()))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "Applications of the session user", body = Json<ApplicationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_applications(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(ApplicationListResponse::from(
        state.job_store.my_applications(),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = Json<JobApplication>),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .job_store
        .update_application_status(&id, payload.status)?;
    Ok(Json(application))
}
