// src/lib.rs
pub mod client;
pub mod config;
pub mod metrics;
pub mod server;

pub use client::{ApiClient, ApiError, RequestError, API_BASE};
