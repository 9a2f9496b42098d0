//! HTTP pipeline to the hospital administration API.
//!
//! Every outgoing call goes through [`ApiClient::request_json`], which has
//! two duties: attach the bearer credential when one is available, and react
//! to rejection statuses. A 401 while a session is believed active tears the
//! session down (clear state, queue an expiry notice, navigate to login with
//! the expired flag) before the error propagates to the caller; a 403 only
//! queues a notice. Either way the rejection reaches the original caller
//! exactly once, so screen-level error handling still runs.

pub mod auth;
pub mod error;

pub use error::Error;

use crate::session::guard::{Navigator, Route};
use crate::session::notice::{NoticeCenter, AUTH_NOTICE_TTL};
use crate::session::SessionService;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired. Please sign in again.";
pub(crate) const ACCESS_DENIED_MESSAGE: &str =
    "Access denied. You do not have the required permissions.";

/// Build a full endpoint URL from the API base, normalizing the port.
/// # Errors
/// Returns an error if the base URL cannot be parsed, has no host, or uses
/// an unsupported scheme.
pub fn endpoint_url(base: &str, path: &str) -> Result<String, Error> {
    let url = Url::parse(base).map_err(|err| Error::Url(err.to_string()))?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| Error::Url("no host specified".to_string()))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(Error::Url(format!("unsupported scheme {scheme}"))),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{path}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}

/// Pull a human-readable message out of an API error body. The backend uses
/// several shapes: `{message}`, `{errors: [..]}`, and problem-detail
/// `{title}`/`{detail}`.
fn error_message(body: &Value) -> &str {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            body.get("errors")
                .and_then(|v| v.get(0))
                .and_then(Value::as_str)
        })
        .or_else(|| body.get("title").and_then(Value::as_str))
        .or_else(|| body.get("detail").and_then(Value::as_str))
        .unwrap_or("")
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionService>,
    notices: Arc<NoticeCenter>,
    navigator: Arc<Navigator>,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<SessionService>,
        notices: Arc<NoticeCenter>,
        navigator: Arc<Navigator>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
            notices,
            navigator,
        })
    }

    /// Execute a JSON request with credential attachment and rejection
    /// handling. Requests proceed unauthenticated when no token is cached;
    /// the backend is the final arbiter.
    ///
    /// # Errors
    /// See [`Error`]; rejection statuses propagate after their side effects.
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = endpoint_url(&self.base_url, path)?;
        debug!("api request: {} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json");

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Error::Network)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(Error::Unauthenticated);
        }

        if status == StatusCode::FORBIDDEN {
            self.notices
                .error(ACCESS_DENIED_MESSAGE, Some(AUTH_NOTICE_TTL));
            return Err(Error::Forbidden);
        }

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            return Err(Error::Status {
                url,
                status,
                message: error_message(&body).to_string(),
            });
        }

        response.json().await.map_err(Error::Malformed)
    }

    /// Forced logout on an authentication rejection: clear state, queue the
    /// expiry notice, redirect to login with the expired flag, in that
    /// order, and only when a session was believed active (a rejection of an
    /// already-anonymous request must not re-run the teardown).
    fn expire_session(&self) {
        if !self.session.is_authenticated() {
            return;
        }

        self.session.logout();
        self.notices
            .error(SESSION_EXPIRED_MESSAGE, Some(AUTH_NOTICE_TTL));
        self.navigator.navigate(Route::Login { expired: true });
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
