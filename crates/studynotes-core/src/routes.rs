//! Application destinations and the route guard.
//!
//! Every destination except the landing page requires an authenticated or
//! demo session. Denied navigations replace the current history entry with
//! the landing page so no back-button entry is left behind.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{Session, SessionMode};

/// A navigable destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Route {
    /// Public landing page
    Home,
    Dashboard,
    Courses,
    About,
    /// A course, by course code
    CourseDetail(String),
    /// A note, by id
    NoteDetail(String),
}

impl Route {
    /// Parse a path such as `/courses/CS101`. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["dashboard"] => Some(Route::Dashboard),
            ["courses"] => Some(Route::Courses),
            ["about"] => Some(Route::About),
            ["courses", code] => Some(Route::CourseDetail((*code).to_string())),
            ["notes", id] => Some(Route::NoteDetail((*id).to_string())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Courses => "/courses".to_string(),
            Route::About => "/about".to_string(),
            Route::CourseDetail(code) => format!("/courses/{}", code),
            Route::NoteDetail(id) => format!("/notes/{}", id),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Dashboard => "Dashboard",
            Route::Courses => "Courses",
            Route::About => "About",
            Route::CourseDetail(_) => "Course",
            Route::NoteDetail(_) => "Note",
        }
    }

    /// Whether the route requires a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Whether a session may view protected routes.
pub fn is_allowed(session: &Session) -> bool {
    matches!(session.mode, SessionMode::Authenticated | SessionMode::Demo)
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Show the requested destination
    Render(Route),
    /// Replace the navigation with another destination
    Redirect(Route),
}

/// Decide what to show for `requested` under `session`.
///
/// Viewers who already have a session skip the landing page.
pub fn guard(session: &Session, requested: Route) -> Decision {
    let allowed = is_allowed(session);
    match requested {
        Route::Home if allowed => Decision::Redirect(Route::Dashboard),
        route if route.is_protected() && !allowed => Decision::Redirect(Route::Home),
        route => Decision::Render(route),
    }
}

/// Navigation history with guarded transitions.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Start on the landing page
    pub fn new() -> Self {
        Self {
            history: vec![Route::Home],
        }
    }

    pub fn current(&self) -> &Route {
        // The history is never empty
        self.history.last().unwrap_or(&Route::Home)
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    pub fn push(&mut self, route: Route) {
        self.history.push(route);
    }

    /// Replace the current entry without adding a new one.
    pub fn replace(&mut self, route: Route) {
        match self.history.last_mut() {
            Some(last) => *last = route,
            None => self.history.push(route),
        }
    }

    /// Go back one entry. The first entry is never popped.
    pub fn back(&mut self) -> &Route {
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.current()
    }

    /// Navigate to `requested` through the guard and return what is shown.
    pub fn navigate(&mut self, session: &Session, requested: Route) -> Decision {
        let decision = guard(session, requested);
        match &decision {
            Decision::Render(route) => {
                if self.current() != route {
                    self.push(route.clone());
                }
            }
            Decision::Redirect(route) => {
                debug!(to = %route, mode = %session.mode, "Navigation redirected");
                self.replace(route.clone());
            }
        }
        decision
    }

    /// Re-check the current entry, e.g. after the session changed.
    pub fn revalidate(&mut self, session: &Session) -> Decision {
        let current = self.current().clone();
        let decision = guard(session, current);
        if let Decision::Redirect(route) = &decision {
            debug!(to = %route, mode = %session.mode, "Current route no longer permitted");
            self.replace(route.clone());
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn authenticated() -> Session {
        Session::authenticated("abc123".into(), Utc::now() + Duration::minutes(30))
    }

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/dashboard"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/courses/"), Some(Route::Courses));
        assert_eq!(Route::parse("/about"), Some(Route::About));
        assert_eq!(
            Route::parse("/courses/CS101"),
            Some(Route::CourseDetail("CS101".into()))
        );
        assert_eq!(Route::parse("/notes/n-1"), Some(Route::NoteDetail("n-1".into())));
    }

    #[test]
    fn test_parse_unknown_paths() {
        assert_eq!(Route::parse("/settings"), None);
        assert_eq!(Route::parse("/courses/CS101/extra"), None);
    }

    #[test]
    fn test_path_matches_parse() {
        for route in [
            Route::Home,
            Route::Dashboard,
            Route::Courses,
            Route::About,
            Route::CourseDetail("MATH2".into()),
            Route::NoteDetail("42".into()),
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_is_allowed_by_mode() {
        assert!(!is_allowed(&Session::guest()));
        assert!(is_allowed(&Session::demo()));
        assert!(is_allowed(&authenticated()));
    }

    #[test]
    fn test_guest_is_redirected_home() {
        let guest = Session::guest();
        for route in [
            Route::Dashboard,
            Route::Courses,
            Route::About,
            Route::CourseDetail("CS101".into()),
            Route::NoteDetail("1".into()),
        ] {
            assert_eq!(guard(&guest, route), Decision::Redirect(Route::Home));
        }
        assert_eq!(guard(&guest, Route::Home), Decision::Render(Route::Home));
    }

    #[test]
    fn test_session_renders_protected_routes() {
        for session in [authenticated(), Session::demo()] {
            assert_eq!(guard(&session, Route::Courses), Decision::Render(Route::Courses));
        }
    }

    #[test]
    fn test_session_skips_landing_page() {
        assert_eq!(
            guard(&Session::demo(), Route::Home),
            Decision::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_denied_navigation_replaces_history() {
        let mut nav = Navigator::new();
        let decision = nav.navigate(&Session::guest(), Route::Courses);

        assert_eq!(decision, Decision::Redirect(Route::Home));
        assert_eq!(nav.history(), &[Route::Home]);
    }

    #[test]
    fn test_allowed_navigation_pushes_history() {
        let mut nav = Navigator::new();
        let session = authenticated();

        // Landing page redirect replaces "/" with the dashboard
        nav.navigate(&session, Route::Home);
        nav.navigate(&session, Route::Courses);
        nav.navigate(&session, Route::CourseDetail("CS101".into()));

        assert_eq!(
            nav.history(),
            &[Route::Dashboard, Route::Courses, Route::CourseDetail("CS101".into())]
        );
        assert_eq!(nav.back(), &Route::Courses);
        assert_eq!(nav.back(), &Route::Dashboard);
        assert_eq!(nav.back(), &Route::Dashboard);
    }

    #[test]
    fn test_revalidate_after_expiry_returns_home() {
        let mut nav = Navigator::new();
        nav.navigate(&authenticated(), Route::Courses);
        let len = nav.history().len();

        let decision = nav.revalidate(&Session::guest());
        assert_eq!(decision, Decision::Redirect(Route::Home));
        assert_eq!(nav.current(), &Route::Home);
        assert_eq!(nav.history().len(), len);
    }
}
