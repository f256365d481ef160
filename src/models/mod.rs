pub mod connection;
pub mod job;
pub mod message;
pub mod notification;
pub mod post;
pub mod user;
