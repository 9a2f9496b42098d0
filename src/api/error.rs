use reqwest::StatusCode;
use thiserror::Error;

/// Error taxonomy of the API client.
///
/// `Unauthenticated` and `Forbidden` are surfaced after their side effects
/// (forced logout, notices) have already run; callers only need to report
/// them once.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not reach the API: {0}")]
    Network(#[source] reqwest::Error),
    #[error("authentication rejected")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error("{url} - {status}, {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
    #[error("invalid response body: {0}")]
    Malformed(#[source] reqwest::Error),
    #[error("no token received from the server")]
    MissingToken,
    #[error("error parsing URL: {0}")]
    Url(String),
}
