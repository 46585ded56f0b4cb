// ABOUTME: Control-plane API error classification - Transient vs NotFound vs Unauthorized.
// ABOUTME: Lets callers decide retry-vs-fatal without parsing strings.

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("control plane returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body was not valid JSON: {0}")]
    Decode(String),
}

/// Broad classification used by callers that need to decide retry-vs-fatal
/// without matching on the error's internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Transport error or 5xx/429 - retry on the next tick/ping.
    Transient,
    /// 404 - the resource does not exist (anymore).
    NotFound,
    /// 401/403 - credentials are wrong; retrying won't help.
    Unauthorized,
    /// Anything else (4xx, decode failure).
    Other,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Request(e) if e.is_timeout() || e.is_connect() => ApiErrorKind::Transient,
            ApiError::Request(_) => ApiErrorKind::Transient,
            ApiError::Status { status, .. } => match *status {
                401 | 403 => ApiErrorKind::Unauthorized,
                404 => ApiErrorKind::NotFound,
                429 | 500..=599 => ApiErrorKind::Transient,
                _ => ApiErrorKind::Other,
            },
            ApiError::Decode(_) => ApiErrorKind::Other,
        }
    }
}
