use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_SESSION_USER_ID: &str = "demo-user";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub seed_job_count: usize,
    pub seed_user_count: usize,
    pub seed_post_count: usize,
    pub seed_notification_count: usize,
    pub seed_conversation_count: usize,
    pub job_page_size: usize,
    pub feed_page_size: usize,
    pub simulated_latency: Duration,
    pub demo_seed: Option<u64>,
    pub session_user_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:8080".to_string(),
            seed_job_count: 100,
            seed_user_count: 40,
            seed_post_count: 60,
            seed_notification_count: 25,
            seed_conversation_count: 8,
            job_page_size: 20,
            feed_page_size: 10,
            simulated_latency: Duration::ZERO,
            demo_seed: None,
            session_user_id: DEFAULT_SESSION_USER_ID.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", &defaults.server_address),
            seed_job_count: get_env_parse_or("SEED_JOB_COUNT", defaults.seed_job_count)?,
            seed_user_count: get_env_parse_or("SEED_USER_COUNT", defaults.seed_user_count)?,
            seed_post_count: get_env_parse_or("SEED_POST_COUNT", defaults.seed_post_count)?,
            seed_notification_count: get_env_parse_or(
                "SEED_NOTIFICATION_COUNT",
                defaults.seed_notification_count,
            )?,
            seed_conversation_count: get_env_parse_or(
                "SEED_CONVERSATION_COUNT",
                defaults.seed_conversation_count,
            )?,
            job_page_size: get_env_parse_or("JOB_PAGE_SIZE", defaults.job_page_size)?,
            feed_page_size: get_env_parse_or("FEED_PAGE_SIZE", defaults.feed_page_size)?,
            simulated_latency: Duration::from_millis(get_env_parse_or(
                "SIMULATED_LATENCY_MS",
                0u64,
            )?),
            demo_seed: get_env_parse_opt("DEMO_SEED")?,
            session_user_id: get_env_or("SESSION_USER_ID", &defaults.session_user_id),
        })
    }

    /// Small, deterministic configuration for tests.
    pub fn for_tests(seed: u64) -> Self {
        Self {
            seed_job_count: 100,
            seed_user_count: 12,
            seed_post_count: 30,
            seed_notification_count: 10,
            seed_conversation_count: 4,
            demo_seed: Some(seed),
            ..Self::default()
        }
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse_opt(name)?.unwrap_or(default))
}

fn get_env_parse_opt<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(None),
    }
}
