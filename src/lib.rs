pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::models::user::Session;
use crate::services::{
    chat_store::ChatStore, connection_store::ConnectionStore, feed_store::FeedStore,
    generator::DemoDataGenerator, job_store::JobStore, notification_store::NotificationStore,
};
use crate::utils::time::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Session,
    pub clock: Arc<dyn Clock>,
    pub job_store: JobStore,
    pub feed_store: FeedStore,
    pub connection_store: ConnectionStore,
    pub notification_store: NotificationStore,
    pub chat_store: ChatStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Seeds every store from one generator so a fixed `demo_seed` reproduces
    /// the whole demo world.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let session = Session::new(config.session_user_id.clone(), "You")
            .with_headline("Open to new opportunities");
        let mut generator = DemoDataGenerator::from_seed(config.demo_seed, clock.now());

        let jobs = generator.generate_jobs(config.seed_job_count);
        let users = generator.generate_users(config.seed_user_count);

        // First half connected, the next quarter sent invitations, the rest
        // end up as suggestions.
        let connected = users.len() / 2;
        let inviting = (connected + users.len() / 4).min(users.len());
        let connections = generator.generate_connections(&users[..connected]);
        let incoming =
            generator.generate_connection_requests(&users[connected..inviting], &session.user_id);

        let posts = generator.generate_posts(config.seed_post_count, &users);
        let notifications =
            generator.generate_notifications(config.seed_notification_count, &users);
        let conversations = generator.generate_conversations(
            config.seed_conversation_count,
            &users[..connected],
            &session.user_id,
        );

        tracing::info!(
            jobs = jobs.len(),
            users = users.len(),
            posts = posts.len(),
            seed = ?config.demo_seed,
            "seeded demo data"
        );

        let job_store = JobStore::new(
            jobs,
            session.clone(),
            config.job_page_size,
            clock.clone(),
            config.simulated_latency,
        );
        let feed_store = FeedStore::new(
            posts,
            session.clone(),
            config.feed_page_size,
            clock.clone(),
            config.simulated_latency,
        );
        let connection_store = ConnectionStore::new(
            users.clone(),
            connections,
            incoming,
            session.clone(),
            clock.clone(),
        );
        let notification_store = NotificationStore::new(notifications);
        let chat_store = ChatStore::new(conversations, users, session.clone(), clock.clone());

        Self {
            config: Arc::new(config),
            session,
            clock,
            job_store,
            feed_store,
            connection_store,
            notification_store,
            chat_store,
        }
    }
}
