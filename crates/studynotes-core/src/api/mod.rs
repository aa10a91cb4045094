//! REST API client module for the study-notes backend.
//!
//! This module provides the `ApiClient` for logging in and for the
//! course, note, summary and practice-test resources.
//!
//! The API uses bearer token authentication obtained from the `/login`
//! endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
