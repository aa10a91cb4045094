//! Session manager: the single owner of the current session.
//!
//! Every mutation follows cancel-then-arm: the pending expiry timer (if any)
//! is cancelled before a new one is armed, so at most one timer is live and
//! it always belongs to the current token.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::{Session, SessionMode};
use super::token_store::TokenStore;
use crate::clock::Clock;

/// Lifetime of an authenticated session in minutes. Not configurable.
pub const SESSION_LIFETIME_MINUTES: i64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot log in with an empty token")]
    EmptyToken,
}

/// A pending expiry. Dropping it cancels the timer.
struct ExpiryTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct State {
    session: Session,
    timer: Option<ExpiryTimer>,
    /// Incremented every time a timer is armed
    generation: u64,
}

struct Shared {
    state: Mutex<State>,
    store: TokenStore,
    clock: Arc<dyn Clock>,
    notify: watch::Sender<Session>,
}

/// Handle to the session. Clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Create a manager in guest mode. Call [`initialize`](Self::initialize)
    /// to hydrate from storage.
    pub fn new(store: TokenStore, clock: Arc<dyn Clock>) -> Self {
        let (notify, _) = watch::channel(Session::guest());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    session: Session::guest(),
                    timer: None,
                    generation: 0,
                }),
                store,
                clock,
                notify,
            }),
        }
    }

    /// Hydrate the session from storage and re-arm its expiry timer.
    pub fn initialize(&self) {
        let mut state = self.lock();
        state.timer = None;

        match self.shared.store.read() {
            Some(stored) => {
                info!(expires_at = %stored.expires_at, "Restored session from storage");
                self.establish(&mut state, stored.token, stored.expires_at);
            }
            None => {
                debug!("No stored session, starting as guest");
                state.session = Session::guest();
                self.publish(&state);
            }
        }
    }

    /// Start an authenticated session that expires after
    /// [`SESSION_LIFETIME_MINUTES`].
    pub fn login(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let expires_at = self.shared.clock.now() + Duration::minutes(SESSION_LIFETIME_MINUTES);
        let mut state = self.lock();
        state.timer = None;
        self.shared.store.write(&token, expires_at);
        info!(%expires_at, "Logged in");
        self.establish(&mut state, token, expires_at);
        Ok(())
    }

    /// Return to guest mode and forget the stored token. Safe to repeat.
    pub fn logout(&self) {
        let mut state = self.lock();
        self.reset(&mut state);
    }

    /// Enter demo mode. Demo sessions are not persisted and never expire.
    pub fn enter_demo(&self) {
        let mut state = self.lock();
        state.timer = None;
        self.shared.store.clear();
        state.session = Session::demo();
        info!("Entered demo mode");
        self.publish(&state);
    }

    /// The current session. An authenticated session whose expiry has
    /// passed is logged out before it is returned.
    pub fn current(&self) -> Session {
        let mut state = self.lock();
        if let Some(expires_at) = state.session.expires_at {
            if self.shared.clock.now() >= expires_at {
                debug!("Session expired before its timer ran");
                self.reset(&mut state);
            }
        }
        state.session.clone()
    }

    pub fn mode(&self) -> SessionMode {
        self.current().mode
    }

    /// Bearer token for API calls, when authenticated.
    pub fn token(&self) -> Option<String> {
        self.current().token
    }

    /// Watch session changes. The receiver starts with the current session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.notify.subscribe()
    }

    /// Whether an expiry timer is currently armed
    pub fn has_pending_expiry(&self) -> bool {
        self.lock().timer.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &State) {
        self.shared.notify.send_replace(state.session.clone());
    }

    fn reset(&self, state: &mut State) {
        state.timer = None;
        self.shared.store.clear();
        if state.session.is_guest() {
            return;
        }
        state.session = Session::guest();
        info!("Logged out");
        self.publish(state);
    }

    /// Enter authenticated mode and schedule the expiry. Expects the
    /// previous timer to have been cancelled.
    fn establish(&self, state: &mut State, token: String, expires_at: DateTime<Utc>) {
        state.session = Session::authenticated(token, expires_at);

        let remaining = expires_at - self.shared.clock.now();
        let remaining = match remaining.to_std() {
            Ok(remaining) if !remaining.is_zero() => remaining,
            _ => {
                debug!("Session already expired, logging out");
                self.reset(state);
                return;
            }
        };

        self.publish(state);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime, session will expire lazily");
                return;
            }
        };

        state.generation += 1;
        let generation = state.generation;
        let shared = Arc::downgrade(&self.shared);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            Self::expire(shared, generation);
        });
        debug!(generation, remaining_secs = remaining.as_secs(), "Expiry timer armed");
        state.timer = Some(ExpiryTimer { generation, handle });
    }

    fn expire(shared: Weak<Shared>, generation: u64) {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let manager = SessionManager { shared };
        let mut state = manager.lock();

        let current = state.timer.as_ref().map(|t| t.generation);
        if current != Some(generation) {
            debug!(generation, ?current, "Ignoring stale expiry timer");
            return;
        }

        info!("Session expired");
        manager.reset(&mut state);
    }
}
