use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The in-flight request was aborted by a newer one. Benign: upstream
    /// callers treat this as a no-op, never as a user-facing failure.
    #[error("request canceled")]
    Canceled,
}

impl GeocodeError {
    /// Maps a transport failure, distinguishing the adapter's fixed request
    /// timeout from generic network errors.
    pub(crate) fn from_transport(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
            }
        } else {
            Self::Http(err)
        }
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
