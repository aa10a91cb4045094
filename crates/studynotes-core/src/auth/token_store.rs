use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::storage::KeyValueStore;
use crate::clock::Clock;

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the expiry, in milliseconds since the Unix epoch
pub const EXPIRES_AT_KEY: &str = "expiresAt";

/// A bearer token read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Persists the bearer token and its absolute expiry.
///
/// Only the session manager writes through this type.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Read an unexpired token. Expired or malformed entries are purged.
    pub fn read(&self) -> Option<StoredToken> {
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let expires_at = self.storage.get(EXPIRES_AT_KEY);

        let (token, expires_at) = match (token, expires_at) {
            (Some(token), Some(expires_at)) => (token, expires_at),
            (None, None) => return None,
            _ => {
                debug!("Incomplete stored credential, purging");
                self.clear();
                return None;
            }
        };

        let expires_at = match expires_at
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
        {
            Some(expires_at) => expires_at,
            None => {
                debug!(value = %expires_at, "Unparseable stored expiry, purging");
                self.clear();
                return None;
            }
        };

        if self.clock.now() >= expires_at {
            debug!(%expires_at, "Stored credential expired, purging");
            self.clear();
            return None;
        }

        Some(StoredToken { token, expires_at })
    }

    pub fn write(&self, token: &str, expires_at: DateTime<Utc>) {
        self.storage.set(TOKEN_KEY, token);
        self.storage
            .set(EXPIRES_AT_KEY, &expires_at.timestamp_millis().to_string());
    }

    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(EXPIRES_AT_KEY);
    }
}
