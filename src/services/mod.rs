pub mod chat_store;
pub mod connection_store;
pub mod feed_store;
pub mod filter;
pub mod generator;
pub mod job_store;
pub mod notification_store;
pub mod pagination;
pub mod store;
