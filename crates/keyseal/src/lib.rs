//! Value encryption with key ids in authenticated footers.
//!
//! Ciphertexts are PASETO v4.local tokens whose footer carries the id of the
//! key that sealed them, so an encrypter holding the current key and any
//! number of previous keys can decrypt every payload it ever issued.

pub mod config;
pub mod encrypter;
pub mod error;
pub mod keyring;
pub mod rotation;
pub mod serializer;
pub mod shared;

pub use config::{EncrypterConfig, KEY_ENV, PREVIOUS_KEYS_ENV};
pub use encrypter::{Encrypter, StringEncrypter, ValueEncrypter};
pub use error::{ConfigError, DecryptError, EncryptError};
pub use keyring::KeyRing;
pub use rotation::{generate_exported_key, rotate, RotatedKeys};
pub use serializer::{JsonSerializer, Serializer};
pub use shared::SharedEncrypter;

pub use keyseal_crypto::{
    export, export_with_id, extract_key_id, parse, parse_bare, parse_with_id, CryptoError, KeyId,
    MalformedKey, SymmetricKey, Version,
};
