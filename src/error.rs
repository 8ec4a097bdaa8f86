//! Errors that can happen while talking to the task API or handling user input

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What is wrong with some user input
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("a task must have a title")]
    MissingTitle,
    #[error("weekly tasks must start on a Monday, not on {0}")]
    NotAMonday(NaiveDate),
    #[error("unknown task scope {0:?}")]
    UnknownScope(String),
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    /// Bad user input, detected before any network call
    #[error("invalid input: {0}")]
    Validation(#[from] InvalidInput),

    /// The server could not be reached (offline, refused connection, timeout...)
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status (including CSRF rejections and unknown tasks)
    #[error("server replied with HTTP status {status}: {message}")]
    Server { status: u16, message: String },

    /// The server answered 2xx, but the body is not what we expected
    #[error("unable to decode server response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// A request body could not be encoded
    #[error("unable to encode request: {0}")]
    InvalidRequest(serde_json::Error),

    /// A load response arrived for a window that is not the latest requested one.
    /// This is never shown to the user
    #[error("discarding tasks for the week of {requested}, the week of {current} has been requested since")]
    StaleResponse { requested: NaiveDate, current: NaiveDate },
}

impl Error {
    /// Whether this error must be reported to the user
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Error::StaleResponse { .. })
    }

    /// Whether the server rejected the request because of a missing or invalid CSRF token
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Server { status: 403, .. })
    }

    /// Whether the user has to type a title before trying again
    pub fn is_missing_title(&self) -> bool {
        matches!(self, Error::Validation(InvalidInput::MissingTitle))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Server { status: 404, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::Server {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_timeout() => Error::Network(format!("request timed out ({})", err)),
            None => Error::Network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_responses_are_not_user_visible() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let stale = Error::StaleResponse { requested: day, current: day };
        assert!(stale.is_user_visible() == false);
        assert!(Error::Network("offline".into()).is_user_visible());
        assert!(Error::Validation(InvalidInput::MissingTitle).is_user_visible());
    }

    #[test]
    fn server_status_helpers() {
        let forbidden = Error::Server { status: 403, message: "CSRF token missing".into() };
        assert!(forbidden.is_forbidden());
        assert!(forbidden.is_not_found() == false);

        let missing = Error::Server { status: 404, message: "Task not found".into() };
        assert!(missing.is_not_found());
    }

    #[test]
    fn encoding_and_decoding_failures_are_told_apart() {
        let decoding: serde_json::Error = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(Error::from(decoding).to_string().starts_with("unable to decode server response"));

        let encoding: serde_json::Error = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(Error::InvalidRequest(encoding).to_string().starts_with("unable to encode request"));
    }

    #[test]
    fn validation_kinds() {
        assert!(Error::from(InvalidInput::MissingTitle).is_missing_title());
        let monday = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        let not_a_monday = Error::from(InvalidInput::NotAMonday(monday));
        assert!(not_a_monday.is_missing_title() == false);
        assert_eq!(not_a_monday.to_string(), "invalid input: weekly tasks must start on a Monday, not on 2025-05-06");
    }
}
