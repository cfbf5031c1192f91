// src/client/mod.rs
mod api;
mod error;

pub use api::{ApiClient, API_BASE};
pub use error::{ApiError, RequestError};
