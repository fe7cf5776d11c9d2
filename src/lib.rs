// Cafe Gate - Library root for testing

pub mod auth;
pub mod cafe;
pub mod config;
pub mod error;
pub mod http_client;
pub mod transport;
