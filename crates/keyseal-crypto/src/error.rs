use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Malformed key: {0}")]
    MalformedKey(MalformedKey),

    #[error("Invalid footer")]
    InvalidFooter,

    #[error("Authentication failed")]
    Authentication,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Random number generation failed: {0}")]
    Rng(String),
}

/// Reason a textual key was rejected. Never carries key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKey {
    #[error("unrecognized version tag")]
    UnknownVersion,

    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("invalid base64 key encoding")]
    InvalidBase64,

    #[error("invalid key id")]
    InvalidKeyId,

    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

impl From<MalformedKey> for CryptoError {
    fn from(reason: MalformedKey) -> Self {
        CryptoError::MalformedKey(reason)
    }
}
