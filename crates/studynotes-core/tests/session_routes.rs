//! Session expiry driving the route guard, on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use studynotes_core::auth::{MemoryStorage, SessionManager, SessionMode, TokenStore};
use studynotes_core::clock::{Clock, TokioClock};
use studynotes_core::routes::{Decision, Navigator, Route};

const T0_MS: i64 = 1_700_000_000_000;

fn manager() -> SessionManager {
    let t0 = DateTime::from_timestamp_millis(T0_MS).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(t0));
    let store = TokenStore::new(Arc::new(MemoryStorage::new()), clock.clone());
    SessionManager::new(store, clock)
}

#[tokio::test(start_paused = true)]
async fn test_expiry_sends_protected_page_home() {
    let session = manager();
    session.initialize();
    let mut rx = session.subscribe();

    session.login("abc123").unwrap();
    let mut nav = Navigator::new();
    nav.navigate(&session.current(), Route::Courses);
    nav.navigate(&session.current(), Route::CourseDetail("CS101".into()));
    let depth = nav.history().len();

    rx.borrow_and_update();
    tokio::time::advance(Duration::from_secs(30 * 60)).await;
    rx.changed().await.unwrap();

    let expired = rx.borrow_and_update().clone();
    assert_eq!(expired.mode, SessionMode::Guest);
    assert_eq!(nav.revalidate(&expired), Decision::Redirect(Route::Home));
    assert_eq!(nav.current(), &Route::Home);
    assert_eq!(nav.history().len(), depth);
}

#[tokio::test(start_paused = true)]
async fn test_page_survives_until_expiry() {
    let session = manager();
    session.initialize();
    session.login("abc123").unwrap();

    let mut nav = Navigator::new();
    nav.navigate(&session.current(), Route::Courses);

    tokio::time::advance(Duration::from_secs(30 * 60 - 1)).await;
    assert_eq!(
        nav.revalidate(&session.current()),
        Decision::Render(Route::Courses)
    );
}
