//! Exchange-specific error types
//!
//! Every failure surfaces to the caller; nothing here retries or recovers.

use thiserror::Error;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange operation errors
#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    /// A private call was made on a client built without credentials
    #[error("Credentials required: {0}")]
    CredentialsRequired(String),

    #[error("Invalid pair format: {0}")]
    InvalidPairFormat(String),

    #[error("Unsupported base currency '{base}' in pair '{pair}'")]
    UnsupportedBaseCurrency { pair: String, base: String },

    /// The venue answered with an application-level error, or with a
    /// success status and a body that could not be decoded
    #[error("{venue} API error: {message}")]
    RemoteApi {
        venue: String,
        message: String,
        payload: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Unsupported by {venue}: {operation}")]
    Unsupported { venue: String, operation: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ExchangeError {
    pub fn remote(venue: &str, message: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::RemoteApi {
            venue: venue.to_string(),
            message: message.into(),
            payload: payload.into(),
        }
    }

    pub fn unsupported(venue: &str, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            venue: venue.to_string(),
            operation: operation.into(),
        }
    }

    pub fn credentials_required(venue: &str) -> Self {
        Self::CredentialsRequired(format!("{venue} private endpoints need an API key and secret"))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteApi { .. })
    }
}

/// HTTP-layer failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("TLS failure: {0}")]
    Tls(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    /// Non-2xx answer whose body carried no recognisable venue error
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed HTTP response: {0}")]
    MalformedResponse(String),

    #[error("Proxy failure: {0}")]
    Proxy(String),
}

impl From<coinwire_core::FixedError> for ExchangeError {
    fn from(err: coinwire_core::FixedError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
