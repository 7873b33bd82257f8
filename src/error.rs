use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A 401 response arrived without any `WWW-Authenticate` header.
    #[error("401 response carries no WWW-Authenticate header")]
    MissingChallenge,

    #[error("malformed Digest challenge: {0}")]
    MalformedChallenge(String),

    #[error("unsupported Digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("no supported qop offered: {0}")]
    UnsupportedQop(String),

    /// The nonce count cannot be incremented without repeating a value.
    #[error("nonce count exhausted for the current server nonce")]
    NonceCountExhausted,

    #[error("computed Authorization value is not a valid header value")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    pub(crate) fn malformed<S: Into<String>>(reason: S) -> Self {
        Error::MalformedChallenge(reason.into())
    }
}
