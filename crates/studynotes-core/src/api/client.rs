//! API client for the study-notes backend.
//!
//! This module provides the `ApiClient` struct for authenticating and for
//! the course, note, summary and practice-test endpoints. Failed calls are
//! never retried; the caller decides whether to try again.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    Course, GeneratePracticeTest, GenerateSummary, NewCourse, NewNote, NewPracticeTest, Note,
    NoteUpdate, PracticeTest, Summary,
};

use super::ApiError;
use crate::auth::{Session, SessionMode};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Generation endpoints can take a while on a cold backend.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Field of the login response holding the bearer token
const ACCESS_TOKEN_FIELD: &str = "access_token";

/// API client for the study-notes backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for `base_url` (e.g. `https://api.example.com`)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// A client carrying `session`'s token, or `None` unless it is
    /// authenticated. The token is fixed when the client is made, so calls
    /// issued through it keep using it even if the session changes.
    pub fn for_session(&self, session: &Session) -> Option<Self> {
        match (&session.mode, &session.token) {
            (SessionMode::Authenticated, Some(token)) => Some(self.with_token(token.clone())),
            _ => None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ===== Authentication =====

    /// Exchange credentials for a bearer token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let url = self.url("login");
        debug!(url = %url, "Authenticating");

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .context("Failed to send authentication request")?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Authentication rejected");
            return Err(ApiError::AuthenticationFailed(status).into());
        }

        let body = response
            .text()
            .await
            .map_err(ApiError::NetworkError)
            .context("Failed to read authentication response")?;

        let token = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get(ACCESS_TOKEN_FIELD).and_then(Value::as_str).map(str::to_string))
            .filter(|t| !t.is_empty());

        token.ok_or_else(|| ApiError::MissingToken.into())
    }

    // ===== Request plumbing =====

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| ApiError::NotAuthenticated.into())
    }

    /// Attach the bearer token, send, and fail on non-2xx responses.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to {}", what))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, what, "Request failed");
            Err(anyhow::Error::from(ApiError::from_status(status, &body))
                .context(format!("Failed to {}", what)))
        }
    }

    /// Read a JSON body. An empty body reads as `null`.
    async fn read_json(response: Response, what: &str) -> Result<Value> {
        let text = response
            .text()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to read response to {}", what))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse response to {}", what))
    }

    async fn get_json(&self, path: &str, course: Option<&str>, what: &str) -> Result<Value> {
        let mut request = self.client.get(self.url(path));
        if let Some(course) = course {
            request = request.query(&[("course", course)]);
        }
        let response = self.send(request, what).await?;
        Self::read_json(response, what).await
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B, what: &str) -> Result<Value> {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.send(request, what).await?;
        Self::read_json(response, what).await
    }

    /// Pull a list out of `value`, either the value itself or the array
    /// under `key`. Anything else is an empty list; items that do not parse
    /// are skipped.
    fn parse_list<T: DeserializeOwned>(value: Value, key: Option<&str>) -> Vec<T> {
        let items = match (value, key) {
            (Value::Array(items), None) => items,
            (Value::Object(mut map), Some(key)) => match map.remove(key) {
                Some(Value::Array(items)) => items,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        let total = items.len();
        let parsed: Vec<T> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if parsed.len() != total {
            warn!(skipped = total - parsed.len(), "Skipped unparseable list items");
        }
        parsed
    }

    // ===== Courses =====

    pub async fn fetch_courses(&self) -> Result<Vec<Course>> {
        let value = self.get_json("courses/", None, "fetch courses").await?;
        Ok(Self::parse_list(value, None))
    }

    /// Create a course and return the stored document
    pub async fn create_course(&self, course: &NewCourse) -> Result<Value> {
        self.post_json("courses", course, "create course").await
    }

    // ===== Notes =====

    /// Notes for a course code. An empty code fetches every note.
    pub async fn fetch_notes(&self, course: &str) -> Result<Vec<Note>> {
        let value = self.get_json("notes/", Some(course), "fetch notes").await?;
        Ok(Self::parse_list(value, Some("notes")))
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<Value> {
        self.post_json("notes", note, "create note").await
    }

    pub async fn update_note(&self, id: &str, update: &NoteUpdate) -> Result<()> {
        let request = self.client.patch(self.url(&format!("notes/{}", id))).json(update);
        self.send(request, "update note").await?;
        Ok(())
    }

    // ===== Summaries =====

    pub async fn fetch_summaries(&self, course: &str) -> Result<Vec<Summary>> {
        let value = self.get_json("summaries/", Some(course), "fetch summaries").await?;
        Ok(Self::parse_list(value, Some("summaries")))
    }

    /// Ask the backend to summarise one chapter's notes. The backend stores
    /// the result and returns it.
    pub async fn generate_summary(&self, request: &GenerateSummary) -> Result<Value> {
        self.post_json("summaries", request, "generate summary").await
    }

    // ===== Practice tests =====

    pub async fn fetch_practice_tests(&self, course: &str) -> Result<Vec<PracticeTest>> {
        let value = self
            .get_json("practicetests/", Some(course), "fetch practice tests")
            .await?;
        Ok(Self::parse_list(value, None))
    }

    pub async fn create_practice_test(&self, test: &NewPracticeTest) -> Result<Value> {
        self.post_json("practicetests", test, "create practice test")
            .await
    }

    /// Ask the backend for a practice test with the given number of questions
    pub async fn generate_practice_test(&self, request: &GeneratePracticeTest) -> Result<Value> {
        self.post_json("practicetests/generate", request, "generate practice test")
            .await
    }

    // ===== Delete =====

    /// Delete any document by id
    pub async fn delete_item(&self, id: &str) -> Result<()> {
        let request = self.client.delete(self.url(id));
        self.send(request, "delete item").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("https://api.example.com/").unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url("/courses/"), "https://api.example.com/courses/");
        assert_eq!(client.url("notes"), "https://api.example.com/notes");
    }

    #[test]
    fn test_parse_list_from_wrapper() {
        let value = json!({"notes": [
            {"_id": "n1", "title": "A", "course": "CS101", "chapter": 1, "text": "x"},
            {"title": "missing id"}
        ]});
        let notes: Vec<Note> = ApiClient::parse_list(value, Some("notes"));
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "n1");
    }

    #[test]
    fn test_parse_list_falls_back_to_empty() {
        let notes: Vec<Note> = ApiClient::parse_list(json!({"detail": "oops"}), Some("notes"));
        assert!(notes.is_empty());
        let tests: Vec<PracticeTest> = ApiClient::parse_list(json!({"items": []}), None);
        assert!(tests.is_empty());
    }

    #[test]
    fn test_for_session_requires_authenticated_token() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(api.for_session(&Session::guest()).is_none());
        assert!(api.for_session(&Session::demo()).is_none());

        let session = Session::authenticated("abc123".into(), chrono::Utc::now());
        let client = api.for_session(&session).unwrap();
        assert_eq!(client.token.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_calls_without_token_fail_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.fetch_courses().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NotAuthenticated)
        ));
    }
}
