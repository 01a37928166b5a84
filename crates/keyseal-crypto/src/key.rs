//! Symmetric key value object.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, MalformedKey};
use crate::types::{Version, CURRENT_VERSION, V4_LOCAL_KEY_LENGTH};

/// Raw symmetric key bytes tagged with the protocol version they belong to.
///
/// Bytes are zeroed on drop and by [`SymmetricKey::wipe`]. Using a key after
/// `wipe` is a caller bug: it will seal and open with an all-zero key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; V4_LOCAL_KEY_LENGTH],
    #[zeroize(skip)]
    version: Version,
}

impl SymmetricKey {
    /// Build a key from raw bytes, checking the protocol-mandated length.
    pub fn from_bytes(version: Version, raw: &[u8]) -> Result<Self, CryptoError> {
        if raw.len() != version.key_length() {
            return Err(MalformedKey::InvalidLength {
                expected: version.key_length(),
                got: raw.len(),
            }
            .into());
        }
        let mut bytes = [0u8; V4_LOCAL_KEY_LENGTH];
        bytes.copy_from_slice(raw);
        Ok(Self { bytes, version })
    }

    /// Generate a random key for the current protocol version.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = Self {
            bytes: [0u8; V4_LOCAL_KEY_LENGTH],
            version: CURRENT_VERSION,
        };
        getrandom::getrandom(&mut key.bytes).map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(key)
    }

    /// Read-only view of the raw key bytes. Do not retain past the key's scope.
    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Irreversibly zero the key bytes.
    pub fn wipe(&mut self) {
        self.bytes.zeroize();
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && bool::from(self.bytes[..].ct_eq(&other.bytes[..]))
    }
}

impl Eq for SymmetricKey {}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("version", &self.version)
            .field("bytes", &"<redacted>")
            .finish()
    }
}
