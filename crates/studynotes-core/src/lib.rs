//! Core library for the study-notes client.
//!
//! - [`auth`]: the session manager, token store and durable storage
//! - [`routes`]: destinations, the route guard and navigation history
//! - [`api`]: the REST client for the study-notes backend
//! - [`models`]: courses, notes, summaries and practice tests
//! - [`config`]: configuration file and environment overrides

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod models;
pub mod routes;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionManager, SessionMode, TokenStore};
pub use clock::{Clock, SystemClock, TokioClock};
pub use config::Config;
pub use routes::{Decision, Navigator, Route};
