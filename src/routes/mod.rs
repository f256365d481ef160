pub mod auth;
pub mod connections;
pub mod conversations;
pub mod feed;
pub mod health;
pub mod jobs;
pub mod notifications;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::AppState;

/// Every endpoint, with state applied. Middleware layers are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let jobs_api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/search", post(jobs::search_jobs))
        .route("/api/jobs/load-more", post(jobs::load_more_jobs))
        .route("/api/jobs/analytics", get(jobs::job_analytics))
        .route("/api/jobs/saved", get(jobs::list_saved_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/jobs/:id/actions", post(jobs::job_action))
        .route("/api/applications", get(jobs::list_applications))
        .route(
            "/api/applications/:id/status",
            patch(jobs::update_application_status),
        );

    let feed_api = Router::new()
        .route("/api/feed", get(feed::get_feed))
        .route("/api/feed/refresh", post(feed::refresh_feed))
        .route("/api/feed/load-more", post(feed::load_more_feed))
        .route("/api/posts", post(feed::create_post))
        .route("/api/posts/:id", get(feed::get_post))
        .route("/api/posts/:id/actions", post(feed::post_action));

    let social_api = Router::new()
        .route("/api/connections", get(connections::list_connections))
        .route("/api/connections/requests", post(connections::send_request))
        .route(
            "/api/connections/requests/:id/:action",
            post(connections::respond_to_request),
        )
        .route(
            "/api/connections/:user_id",
            delete(connections::remove_connection),
        )
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id",
            delete(notifications::delete_notification),
        )
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route(
            "/api/conversations",
            get(conversations::list_conversations).post(conversations::start_conversation),
        )
        .route(
            "/api/conversations/:id",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route(
            "/api/conversations/:id/messages",
            post(conversations::send_message),
        )
        .route(
            "/api/conversations/:id/read",
            post(conversations::mark_conversation_read),
        );

    let auth_api = Router::new()
        .route("/api/auth/validate/login", post(auth::validate_login))
        .route("/api/auth/validate/register", post(auth::validate_register));

    base_routes
        .merge(jobs_api)
        .merge(feed_api)
        .merge(social_api)
        .merge(auth_api)
        .with_state(state)
}
