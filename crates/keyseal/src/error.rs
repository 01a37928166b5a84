use std::fmt;

use keyseal_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncryptError {
    #[error("Serialization error: {0}")]
    Serialization(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// The single error returned by every decrypt path.
///
/// An unreadable footer, an unknown key id, a failed authentication tag and
/// an undeserializable plaintext are indistinguishable to the caller.
#[derive(Debug, Error)]
#[error("The payload is invalid.")]
pub struct DecryptError {
    _private: (),
}

impl DecryptError {
    pub(crate) fn collapse(failure: DecryptFailure) -> Self {
        tracing::debug!(cause = %failure, "decryption failed");
        Self { _private: () }
    }
}

/// Internal cause of a decrypt failure. Only its category is ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecryptFailure {
    InvalidFooter,
    KeyNotFound,
    Authentication,
    Deserialization,
}

impl fmt::Display for DecryptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecryptFailure::InvalidFooter => "invalid footer",
            DecryptFailure::KeyNotFound => "key not found",
            DecryptFailure::Authentication => "authentication failed",
            DecryptFailure::Deserialization => "deserialization failed",
        })
    }
}

impl From<DecryptFailure> for DecryptError {
    fn from(failure: DecryptFailure) -> Self {
        DecryptError::collapse(failure)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No application encryption key has been specified.")]
    MissingKey,

    #[error("Invalid encryption key: {0}")]
    Key(#[from] CryptoError),
}
