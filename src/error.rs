use std::{error::Error as StdError, fmt};

use reqwest::{Method, Url};

/// Boxed error used for transport and body-stream causes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum JsonWebError {
    /// The request could not be sent or no response was received.
    ///
    /// This is the only retryable kind.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
    /// A response arrived but its status code was not `200 OK`.
    #[error("failed to get successful response due to status code: {status} ({message})")]
    Status { status: u16, message: String },
    /// The response body could not be read as text.
    #[error("failed to read response body: {0}")]
    BodyRead(String),
    /// The body text was not valid JSON or its top-level value was not an object.
    #[error("failed to parse JSON response: {0}")]
    BodyParse(String),
    /// Every permitted attempt ended in a transport failure.
    #[error("all {attempts} attempt(s) to access endpoint {url} (method={method}) failed")]
    AllAttemptsFailed {
        url: Url,
        method: Method,
        /// Number of attempts actually made.
        attempts: u32,
        /// Transport failure of the final attempt, if any attempt was made.
        #[source]
        last: Option<TransportError>,
    },
}

impl JsonWebError {
    /// Returns `true` if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<TransportError> for JsonWebError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Failure to deliver a request or to receive the response head.
pub struct TransportError {
    kind: TransportErrorKind,
    source: BoxError,
}

impl TransportError {
    /// Wraps an arbitrary transport failure.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            kind: TransportErrorKind::Other,
            source: source.into(),
        }
    }

    /// Wraps a failure caused by the request timing out.
    pub fn timeout(source: impl Into<BoxError>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            source: source.into(),
        }
    }

    /// Wraps a failure to establish a connection.
    pub fn connect(source: impl Into<BoxError>) -> Self {
        Self {
            kind: TransportErrorKind::Connect,
            source: source.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }

    pub fn is_connect(&self) -> bool {
        self.kind == TransportErrorKind::Connect
    }

    /// Returns the underlying cause.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err)
        } else if err.is_connect() {
            Self::connect(err)
        } else {
            Self::new(err)
        }
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportError")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::Timeout => write!(f, "request timed out: {}", self.source),
            TransportErrorKind::Connect => write!(f, "connection failed: {}", self.source),
            TransportErrorKind::Other => fmt::Display::fmt(&self.source, f),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}
