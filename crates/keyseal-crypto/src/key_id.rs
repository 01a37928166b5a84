//! Time-ordered key identifiers.
//!
//! A key id is a UUIDv7. Its textual form is the 128-bit value in base58
//! (bitcoin alphabet), left-padded with `1` (the zero digit) to 22 characters.
//! Its footer form is the 16 raw UUID bytes.
//!
//! The alphabet is in ASCII order and the width is fixed, so text order
//! matches generation order.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::{CryptoError, MalformedKey};
use crate::types::{KEY_ID_LENGTH, KEY_ID_TEXT_LENGTH};

const UUID_VERSION_7: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(Uuid);

impl KeyId {
    /// Generate a fresh id. Ids from one process are strictly increasing.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Decode the binary footer form.
    pub fn from_footer_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; KEY_ID_LENGTH] = bytes.try_into().map_err(|_| CryptoError::InvalidFooter)?;
        Self::from_uuid(Uuid::from_bytes(raw)).ok_or(CryptoError::InvalidFooter)
    }

    /// Binary footer form.
    pub fn to_footer_bytes(&self) -> [u8; KEY_ID_LENGTH] {
        *self.0.as_bytes()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    fn from_uuid(uuid: Uuid) -> Option<Self> {
        (uuid.get_version_num() == UUID_VERSION_7).then_some(Self(uuid))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bs58::encode(self.0.as_bytes()).into_string();
        write!(f, "{:1>width$}", encoded, width = KEY_ID_TEXT_LENGTH)
    }
}

impl FromStr for KeyId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != KEY_ID_TEXT_LENGTH {
            return Err(MalformedKey::InvalidKeyId.into());
        }
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| CryptoError::from(MalformedKey::InvalidKeyId))?;

        // Leading '1' digits decode to zero bytes; normalize to 16 bytes.
        let first = decoded.iter().position(|&b| b != 0).unwrap_or(decoded.len());
        let significant = &decoded[first..];
        if significant.len() > KEY_ID_LENGTH {
            return Err(MalformedKey::InvalidKeyId.into());
        }
        let mut raw = [0u8; KEY_ID_LENGTH];
        raw[KEY_ID_LENGTH - significant.len()..].copy_from_slice(significant);

        Self::from_uuid(Uuid::from_bytes(raw)).ok_or_else(|| MalformedKey::InvalidKeyId.into())
    }
}
