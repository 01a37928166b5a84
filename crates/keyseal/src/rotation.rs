//! Key generation and rotation for operators.
//!
//! Rotation generates a new id-carrying key and demotes the old current key,
//! unchanged, to the end of the previous keys. Ciphertexts issued under the
//! old key keep decrypting because their footer id still resolves.

use keyseal_crypto::{codec, protocol, CryptoError, KeyId};
use tracing::info;

use crate::config::{join_key_list, EncrypterConfig};
use crate::error::ConfigError;

/// Generate a fresh key and export it, with or without a key id.
pub fn generate_exported_key(include_id: bool) -> Result<String, CryptoError> {
    let key = protocol::generate_key()?;
    let (text, _) = codec::export(&key, include_id);
    Ok(text)
}

/// Outcome of [`rotate`].
pub struct RotatedKeys {
    /// New current key text.
    pub key: String,
    /// Id embedded in the new key.
    pub key_id: KeyId,
    /// Old previous keys followed by the old current key.
    pub previous_keys: Vec<String>,
}

impl RotatedKeys {
    /// Previous keys joined for `APP_PREVIOUS_KEYS`.
    pub fn previous_keys_env_value(&self) -> String {
        join_key_list(&self.previous_keys)
    }

    pub fn to_config(&self) -> EncrypterConfig {
        EncrypterConfig::new(self.key.clone()).with_previous_keys(self.previous_keys.clone())
    }
}

impl std::fmt::Debug for RotatedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatedKeys")
            .field("key", &"<redacted>")
            .field("key_id", &self.key_id)
            .field("previous_keys", &self.previous_keys.len())
            .finish()
    }
}

/// Generate a new current key and demote the configured one.
///
/// An absent current key is a first-time setup and demotes nothing. A
/// present current key must be id-carrying: a bare key's ciphertexts have no
/// footer and would resolve to the new key after rotation.
pub fn rotate(config: &EncrypterConfig) -> Result<RotatedKeys, ConfigError> {
    let demoted = match config.require_key() {
        Ok(text) => {
            codec::parse_with_id(text)?;
            Some(text.to_owned())
        }
        Err(ConfigError::MissingKey) => None,
        Err(e) => return Err(e),
    };

    let key = protocol::generate_key()?;
    let key_id = codec::generate_key_id();
    let text = codec::export_with_id(&key, Some(&key_id));

    let previous_keys: Vec<String> = config
        .previous_keys
        .iter()
        .cloned()
        .chain(demoted)
        .filter(|key| !key.is_empty())
        .collect();

    info!(
        key_id = %key_id,
        previous_keys = previous_keys.len(),
        "encryption key rotated"
    );

    Ok(RotatedKeys {
        key: text,
        key_id,
        previous_keys,
    })
}
