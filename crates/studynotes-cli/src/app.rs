//! Application state for the studynotes terminal client.
//!
//! `App` wires the session manager, the navigator and the API client
//! together and turns typed commands into guarded navigations and API calls.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, error, info, warn};

use studynotes_core::api::{ApiClient, ApiError};
use studynotes_core::auth::{FileStorage, Session, SessionManager, SessionMode, TokenStore};
use studynotes_core::clock::{Clock, SystemClock};
use studynotes_core::config::Config;
use studynotes_core::models::{
    group_by_chapter, sort_by_chapter, GeneratePracticeTest, GenerateSummary,
};
use studynotes_core::routes::{Decision, Navigator, Route};
use studynotes_core::utils::{render_summary, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// Delay before telling the user a login is slow.
/// A cold backend can take up to 30 seconds on the first login.
const SLOW_LOGIN_HINT_SECS: u64 = 4;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 100;

/// Width for note titles and previews in lists
const LIST_TEXT_WIDTH: usize = 60;

/// Upper bound on generated practice test size
const MAX_QUESTION_COUNT: u32 = 50;

const LANDING_TEXT: &str = "Welcome to Study Assistant. Type `login` to sign in or `demo` to look around.";

const ABOUT_TEXT: &str = "Study Assistant keeps notes per course and chapter and generates \
summaries and practice tests from them.";

const HELP_TEXT: &str = "Commands:
  login [username]              sign in
  demo                          explore without an account
  logout                        sign out
  status                        show session and location
  go <path>                     open a page, e.g. /courses or /courses/CS101
  back                          return to the previous page
  courses                       list courses
  course <code>                 notes, summaries and practice tests for a course
  summarize <code> <chapter>    generate a chapter summary
  practice <code> <questions>   generate a practice test
  delete <id>                   delete a note, summary or practice test
  help                          show this help
  quit                          exit";

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Option<String>),
    Demo,
    Logout,
    Status,
    Go(Route),
    Back,
    Summarize { course: String, chapter: u32 },
    Practice { course: String, questions: u32 },
    Delete(String),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Errors are printable usage messages.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("login", []) => Command::Login(None),
            ("login", [username]) => Command::Login(Some(validate_username(username)?)),
            ("demo", []) => Command::Demo,
            ("logout", []) => Command::Logout,
            ("status", []) => Command::Status,
            ("go", [path]) => Command::Go(
                Route::parse(path).ok_or_else(|| format!("No such page: {}", path))?,
            ),
            ("back", []) => Command::Back,
            ("courses", []) => Command::Go(Route::Courses),
            ("course", [code]) => Command::Go(Route::CourseDetail((*code).to_string())),
            ("dashboard", []) => Command::Go(Route::Dashboard),
            ("about", []) => Command::Go(Route::About),
            ("summarize", [code, chapter]) => Command::Summarize {
                course: (*code).to_string(),
                chapter: parse_positive(chapter, "chapter")?,
            },
            ("practice", [code, count]) => {
                let questions = parse_positive(count, "question count")?;
                if questions > MAX_QUESTION_COUNT {
                    return Err(format!("At most {} questions", MAX_QUESTION_COUNT));
                }
                Command::Practice {
                    course: (*code).to_string(),
                    questions,
                }
            }
            ("delete", [id]) => Command::Delete((*id).to_string()),
            ("help", _) | ("?", _) => Command::Help,
            ("quit", []) | ("exit", []) => Command::Quit,
            (other, _) => return Err(format!("Unknown command or arguments: {} (try `help`)", other)),
        };
        Ok(Some(command))
    }
}

fn parse_positive(value: &str, what: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("The {} must be a positive number", what)),
    }
}

fn validate_username(username: &str) -> Result<String, String> {
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!("Usernames are at most {} characters", MAX_USERNAME_LENGTH));
    }
    if username.chars().any(char::is_control) {
        return Err("Usernames cannot contain control characters".to_string());
    }
    Ok(username.to_string())
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    config: Config,
    session: SessionManager,
    api: ApiClient,
    nav: Navigator,
    input: Lines<BufReader<Stdin>>,
}

impl App {
    /// Load configuration, hydrate the session and open on the landing page.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let api_url = config.api_url();
        let data_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("./data"));
        debug!(%api_url, ?data_dir, "Configuration resolved");

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let storage = Arc::new(FileStorage::open(&data_dir));
        let session = SessionManager::new(TokenStore::new(storage, clock.clone()), clock);
        session.initialize();

        let api = ApiClient::new(&api_url)?;

        let mut nav = Navigator::new();
        nav.navigate(&session.current(), Route::Home);

        Ok(Self {
            config,
            session,
            api,
            nav,
            input: BufReader::new(tokio::io::stdin()).lines(),
        })
    }

    /// Read and run commands until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        let mut session_rx = self.session.subscribe();
        session_rx.borrow_and_update();

        self.show_current().await;

        loop {
            prompt(&self.session.current(), self.nav.current());

            let line = tokio::select! {
                line = self.input.next_line() => line?,
                changed = session_rx.changed() => {
                    if changed.is_ok() {
                        let session = session_rx.borrow_and_update().clone();
                        self.on_session_changed(&session);
                    }
                    continue;
                }
            };

            let Some(line) = line else {
                println!();
                return Ok(());
            };

            match Command::parse(&line) {
                Ok(Some(Command::Quit)) => return Ok(()),
                Ok(Some(command)) => self.execute(command).await,
                Ok(None) => {}
                Err(usage) => println!("{}", usage),
            }

            // The session may have expired while a command was running
            let session = session_rx.borrow_and_update().clone();
            self.on_session_changed(&session);
        }
    }

    /// Leave a protected page the session no longer permits.
    fn on_session_changed(&mut self, session: &Session) {
        if let Decision::Redirect(route) = self.nav.revalidate(session) {
            debug!(to = %route, mode = %session.mode, "Left page after session change");
            if session.is_guest() {
                println!("\nYour session has expired. Please log in again.");
            }
        }
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Login(username) => self.login(username).await,
            Command::Demo => {
                self.session.enter_demo();
                println!("Demo mode. Nothing you see here is saved.");
                self.go(Route::Home).await;
            }
            Command::Logout => {
                self.session.logout();
                self.nav.revalidate(&self.session.current());
                println!("Logged out.");
                self.go(Route::Home).await;
            }
            Command::Status => self.status(),
            Command::Go(route) => self.go(route).await,
            Command::Back => {
                self.nav.back();
                self.nav.revalidate(&self.session.current());
                self.show_current().await;
            }
            Command::Summarize { course, chapter } => self.summarize(course, chapter).await,
            Command::Practice { course, questions } => self.practice(course, questions).await,
            Command::Delete(id) => self.delete(id).await,
            Command::Help => println!("{}", HELP_TEXT),
            Command::Quit => {}
        }
    }

    fn status(&self) {
        let session = self.session.current();
        match session.minutes_until_expiry(chrono::Utc::now()) {
            Some(minutes) => println!("Mode: {} ({} min left)", session.mode, minutes),
            None => println!("Mode: {}", session.mode),
        }
        println!("Page: {}", self.nav.current());
        println!("Backend: {}", self.api.base_url());
    }

    async fn go(&mut self, route: Route) {
        let decision = self.nav.navigate(&self.session.current(), route);
        if let Decision::Redirect(Route::Home) = decision {
            if self.session.current().is_guest() {
                println!("Please log in first.");
            }
        }
        self.show_current().await;
    }

    async fn login(&mut self, username: Option<String>) {
        if self.session.mode() == SessionMode::Authenticated {
            println!("Already logged in. Use `logout` first to switch accounts.");
            return;
        }

        let username = match username.or_else(|| self.config.username()) {
            Some(username) => username,
            None => match self.read_username().await {
                Some(username) => username,
                None => return,
            },
        };

        let password = match tokio::task::spawn_blocking(|| rpassword::prompt_password("Password: ")).await {
            Ok(Ok(password)) => password,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read password");
                return;
            }
            Err(e) => {
                error!(error = %e, "Password prompt task failed");
                return;
            }
        };
        if password.is_empty() {
            println!("Username and password required");
            return;
        }

        println!("Logging in...");
        let result = {
            let auth = self.api.authenticate(&username, &password);
            tokio::pin!(auth);
            tokio::select! {
                result = &mut auth => result,
                _ = tokio::time::sleep(Duration::from_secs(SLOW_LOGIN_HINT_SECS)) => {
                    println!("First time logging in may take up to 30 seconds.");
                    auth.await
                }
            }
        };

        match result {
            Ok(token) => {
                if let Err(e) = self.session.login(token) {
                    error!(error = %e, "Login produced an unusable token");
                    println!("{}", ApiError::MissingToken.user_message());
                    return;
                }
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                info!("Login successful");
                println!("Login successful!");
                self.go(Route::Dashboard).await;
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                println!("{}", ApiError::user_message_for(&e));
            }
        }
    }

    async fn read_username(&mut self) -> Option<String> {
        use std::io::Write;

        print!("Username: ");
        let _ = std::io::stdout().flush();
        match self.input.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => match validate_username(line.trim()) {
                Ok(username) => Some(username),
                Err(message) => {
                    println!("{}", message);
                    None
                }
            },
            Ok(_) => {
                println!("Username and password required");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read username");
                None
            }
        }
    }

    /// A client carrying the token as of now, or `None` without one.
    fn authorized_api(&self) -> Option<ApiClient> {
        let session = self.session.current();
        let api = self.api.for_session(&session);
        if api.is_none() {
            match session.mode {
                SessionMode::Demo => println!("(Demo mode has no saved data.)"),
                _ => println!("Please log in first."),
            }
        }
        api
    }

    // =========================================================================
    // Pages
    // =========================================================================

    async fn show_current(&self) {
        let route = self.nav.current().clone();
        println!("\n== {} ==", route.title());
        match route {
            Route::Home => println!("{}", LANDING_TEXT),
            Route::Dashboard => {
                println!("Pick a course with `courses`, or type `help`.");
            }
            Route::About => println!("{}", ABOUT_TEXT),
            Route::Courses => self.show_courses().await,
            Route::CourseDetail(code) => self.show_course(&code).await,
            Route::NoteDetail(id) => self.show_note(&id).await,
        }
    }

    async fn show_courses(&self) {
        let Some(api) = self.authorized_api() else {
            return;
        };
        match api.fetch_courses().await {
            Ok(courses) if courses.is_empty() => println!("No courses yet."),
            Ok(courses) => {
                for course in courses {
                    println!("  {}  {} credits", course.display_name(), course.display_credits());
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load courses");
                println!("Failed to load courses. {}", ApiError::user_message_for(&e));
            }
        }
    }

    async fn show_course(&self, code: &str) {
        let Some(api) = self.authorized_api() else {
            return;
        };
        println!("Course {}", code);

        // Independent requests, issued together
        let (notes, summaries, tests) = futures::join!(
            api.fetch_notes(code),
            api.fetch_summaries(code),
            api.fetch_practice_tests(code)
        );

        println!("\n-- Notes --");
        match notes {
            Ok(notes) if notes.is_empty() => println!("No notes yet."),
            Ok(notes) => {
                for (chapter, group) in group_by_chapter(&notes) {
                    match chapter {
                        Some(chapter) => println!("Chapter {}", chapter),
                        None => println!("Uncategorized"),
                    }
                    for note in group {
                        println!("  [{}] {}", note.id, truncate_string(&note.title, LIST_TEXT_WIDTH));
                    }
                }
            }
            Err(e) => println!("Failed to load notes. {}", ApiError::user_message_for(&e)),
        }

        println!("\n-- Summaries --");
        match summaries {
            Ok(summaries) if summaries.is_empty() => println!("No summaries yet."),
            Ok(mut summaries) => {
                sort_by_chapter(&mut summaries);
                for summary in summaries {
                    match summary.chapter {
                        Some(chapter) => println!("[{}] Chapter {}", summary.id, chapter),
                        None => println!("[{}]", summary.id),
                    }
                    for line in render_summary(&summary.summary).lines() {
                        println!("  {}", line);
                    }
                }
            }
            Err(e) => println!("Failed to load summaries. {}", ApiError::user_message_for(&e)),
        }

        println!("\n-- Practice tests --");
        match tests {
            Ok(tests) if tests.is_empty() => println!("No practice tests yet."),
            Ok(tests) => {
                for test in tests {
                    let questions = test.questions();
                    println!("[{}] {} questions", test.id, questions.len());
                    for (i, q) in questions.iter().enumerate() {
                        println!("  Q{}: {}", i + 1, q.question);
                        println!("      {}", q.answer);
                    }
                }
            }
            Err(e) => println!("Failed to load practice tests. {}", ApiError::user_message_for(&e)),
        }
    }

    async fn show_note(&self, id: &str) {
        let Some(api) = self.authorized_api() else {
            return;
        };
        match api.fetch_notes("").await {
            Ok(notes) => match notes.into_iter().find(|n| n.id == id) {
                Some(note) => {
                    println!("{} ({})", note.title, note.course);
                    if let Some(chapter) = note.chapter_key() {
                        println!("Chapter {}", chapter);
                    }
                    println!("\n{}", note.text);
                }
                None => println!("Note not found."),
            },
            Err(e) => println!("Failed to load note. {}", ApiError::user_message_for(&e)),
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    async fn summarize(&mut self, course: String, chapter: u32) {
        let Some(api) = self.authorized_api() else {
            return;
        };
        println!("Generating summary...");
        match api.generate_summary(&GenerateSummary { course: course.clone(), chapter }).await {
            Ok(_) => {
                println!("Summary generated.");
                self.go(Route::CourseDetail(course)).await;
            }
            Err(e) => {
                warn!(error = %e, "Summary generation failed");
                println!("Failed to generate summary.");
            }
        }
    }

    async fn practice(&mut self, course: String, questions: u32) {
        let Some(api) = self.authorized_api() else {
            return;
        };
        println!("Generating practice test...");
        let request = GeneratePracticeTest {
            course: course.clone(),
            num_questions: questions,
        };
        match api.generate_practice_test(&request).await {
            Ok(_) => {
                println!("Practice test generated.");
                self.go(Route::CourseDetail(course)).await;
            }
            Err(e) => {
                warn!(error = %e, "Practice test generation failed");
                println!("Failed to generate practice test.");
            }
        }
    }

    async fn delete(&mut self, id: String) {
        let Some(api) = self.authorized_api() else {
            return;
        };
        match api.delete_item(&id).await {
            Ok(()) => {
                println!("Deleted.");
                self.show_current().await;
            }
            Err(e) => {
                warn!(error = %e, %id, "Delete failed");
                println!("Failed to delete item.");
            }
        }
    }
}

fn prompt(session: &Session, route: &Route) {
    use std::io::Write;

    let marker = match session.mode {
        SessionMode::Guest => "guest",
        SessionMode::Authenticated => "user",
        SessionMode::Demo => "demo",
    };
    print!("[{} {}]> ", marker, route);
    let _ = std::io::stdout().flush();
}

// ============================================================================
// Tests
// ============================================================================
