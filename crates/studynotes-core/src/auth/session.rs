use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Guest,
    Authenticated,
    Demo,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Guest => "guest",
            SessionMode::Authenticated => "authenticated",
            SessionMode::Demo => "demo",
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the current session.
///
/// `token` and `expires_at` are present only in authenticated mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub mode: SessionMode,
    pub token: Option<String>,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        Self {
            mode: SessionMode::Demo,
            token: None,
            expires_at: None,
        }
    }

    pub fn authenticated(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            mode: SessionMode::Authenticated,
            token: Some(token),
            expires_at: Some(expires_at),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.mode == SessionMode::Guest
    }

    /// Time left before expiry, or `None` outside authenticated mode.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.expires_at.map(|expires_at| expires_at - now)
    }

    /// Minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.remaining(now).map(|d| d.num_minutes().max(0))
    }
}
