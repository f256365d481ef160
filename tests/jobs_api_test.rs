use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use careernet_backend::{config::Config, routes, AppState};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

fn setup_app() -> Router {
    let state = AppState::new(Config::for_tests(42));
    routes::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_seeded_data() {
    let app = setup_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["jobs"], 100);
}

#[tokio::test]
async fn remote_easy_apply_search_end_to_end() {
    let app = setup_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/jobs/search",
        Some(json!({ "work_types": ["remote"], "easy_apply_only": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert!(items.len() <= 20);
    assert!(items
        .iter()
        .all(|job| job["work_type"] == "remote" && job["is_easy_apply"] == true));
    assert_eq!(body["is_loading"], false);
}

#[tokio::test]
async fn load_more_appends_the_next_page() {
    let app = setup_app();
    let (_, first) = send(&app, "POST", "/api/jobs/search", Some(json!({}))).await;
    assert_eq!(first["items"].as_array().unwrap().len(), 20);
    assert_eq!(first["total_matches"], 100);

    let (status, second) = send(&app, "POST", "/api/jobs/load-more", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = second["items"].as_array().unwrap();
    assert_eq!(items.len(), 40);
    assert_eq!(items[0]["id"], first["items"][0]["id"]);
    assert_eq!(second["page"], 2);
}

#[tokio::test]
async fn apply_updates_job_and_applications() {
    let app = setup_app();
    let (_, list) = send(&app, "GET", "/api/jobs", None).await;
    let job = list["items"][0].clone();
    let id = job["id"].as_str().unwrap();
    let before = job["applicant_count"].as_u64().unwrap();
    let (_, analytics_before) = send(&app, "GET", "/api/jobs/analytics", None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/jobs/{id}/actions"),
        Some(json!({ "action": "apply", "cover_letter": "Keen to help." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, analytics_after) = send(&app, "GET", "/api/jobs/analytics", None).await;
    let (_, applications) = send(&app, "GET", "/api/applications", None).await;

    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["job"]["applicant_count"].as_u64().unwrap(), before + 1);
    assert_eq!(
        analytics_after["total_applications"].as_u64().unwrap(),
        analytics_before["total_applications"].as_u64().unwrap() + 1
    );
    assert_eq!(applications["total"], 1);
    assert_eq!(applications["items"][0]["job_id"], id);
    assert_eq!(applications["items"][0]["status"], "submitted");

    let (_, again) = send(
        &app,
        "POST",
        &format!("/api/jobs/{id}/actions"),
        Some(json!({ "action": "apply" })),
    )
    .await;
    assert_eq!(again["outcome"], "ignored");
}

#[tokio::test]
async fn unknown_job_is_ignored_or_not_found() {
    let app = setup_app();
    let (_, before) = send(&app, "GET", "/api/jobs", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/jobs/no-such-job/actions",
        Some(json!({ "action": "save" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");
    assert!(body["job"].is_null());

    let (_, after) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(before["items"], after["items"]);

    let (status, body) = send(&app, "GET", "/api/jobs/no-such-job", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no-such-job"));
}

#[tokio::test]
async fn saved_jobs_are_listed() {
    let app = setup_app();
    let (_, list) = send(&app, "GET", "/api/jobs", None).await;
    let id = list["items"][3]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/jobs/{id}/actions"),
        Some(json!({ "action": "save" })),
    )
    .await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["job"]["saved"], true);

    let (status, saved) = send(&app, "GET", "/api/jobs/saved", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved.as_array().unwrap().len(), 1);
    assert_eq!(saved[0]["id"], id.as_str());
}

#[tokio::test]
async fn invalid_status_transition_is_rejected() {
    let app = setup_app();
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/applications/missing/status",
        Some(json!({ "status": "reviewing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/applications/missing/status",
        Some(json!({ "status": "withdrawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
