//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `SessionManager`: sole owner of the current `Session`, with automatic expiry
//! - `TokenStore`: the bearer token and its expiry in durable storage
//! - `KeyValueStore`: the per-origin storage the token store writes to
//!
//! Authenticated sessions expire 30 minutes after login.

pub mod manager;
pub mod session;
pub mod storage;
pub mod token_store;

pub use manager::{SessionError, SessionManager, SESSION_LIFETIME_MINUTES};
pub use session::{Session, SessionMode};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use token_store::{StoredToken, TokenStore};
