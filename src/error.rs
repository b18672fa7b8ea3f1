//! Error types for outbound service calls.
//!
//! Every upstream integration (completion, translation, SMS, speech-to-text)
//! reports failures through [`UpstreamError`] so callers can tell an
//! unreachable service apart from a reachable one that returned garbage.

use thiserror::Error;

/// Maximum length of an upstream response body carried inside an error.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Failure of a single outbound service call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never completed (connect failure, TLS, broken transfer).
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{service} returned status {status}: {body}")]
    BadStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The service answered 2xx but the payload was not what we expect.
    #[error("unexpected {service} response: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },
}

impl UpstreamError {
    pub fn transport(service: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { service, source }
    }

    pub fn bad_status(service: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        // Truncate so a huge upstream error page never balloons our logs
        let body = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        Self::BadStatus {
            service,
            status: status.as_u16(),
            body,
        }
    }

    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            detail: detail.into(),
        }
    }
}
