use thiserror::Error;

/// Errors returned by the ONS client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The client configuration could not be used to build a client.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    /// The request could not be sent, or the response could not be read.
    #[error("error calling ONS: {0}")]
    Http(#[source] reqwest::Error),
    /// The request did not complete before its deadline.
    #[error("ONS request timed out")]
    Timeout,
    /// ONS rejected the request.
    #[error("ONS returned HTTP {status} ({code}): {message} (request id {request_id})")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The ONS error code, e.g. `InvalidAccessKeyId.NotFound`.
        code: String,
        /// The human readable error message.
        message: String,
        /// The ONS request id, useful when contacting support.
        request_id: String,
    },
    /// The response body was not what the operation should return.
    #[error("unexpected ONS response for {action}: {source}")]
    Decode {
        /// The action that was called.
        action: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for Error {
    fn from(other: reqwest::Error) -> Self {
        if other.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(other)
        }
    }
}
