//! Textual key representation.
//!
//! Id-carrying: `v4.local.<keyId>.<base64url(key)>`
//! Bare:        `v4.local.<base64url(key)>`
//!
//! The header counts as one field, so id-carrying keys have 3 fields and
//! bare keys have 2. Base64 is unpadded url-safe (the PASETO key encoding).
//! Parsing also accepts the legacy `v4` header; export always writes `v4.local`.

use zeroize::Zeroizing;

use crate::base64url::{base64url_decode_secret, base64url_encode};
use crate::error::{CryptoError, MalformedKey};
use crate::key::SymmetricKey;
use crate::key_id::KeyId;
use crate::protocol;
use crate::types::{Version, FIELD_SEPARATOR};

const FIELDS_WITH_ID: usize = 3;
const FIELDS_BARE: usize = 2;

/// Generate a fresh key id.
pub fn generate_key_id() -> KeyId {
    KeyId::generate()
}

/// Export a key. With `include_id`, a freshly generated id is embedded and returned.
pub fn export(key: &SymmetricKey, include_id: bool) -> (String, Option<KeyId>) {
    let id = include_id.then(generate_key_id);
    (export_with_id(key, id.as_ref()), id)
}

/// Export a key under an existing id, or bare when `id` is `None`.
pub fn export_with_id(key: &SymmetricKey, id: Option<&KeyId>) -> String {
    let encoded = Zeroizing::new(base64url_encode(key.raw()));
    let header = key.version().header();
    match id {
        Some(id) => format!(
            "{header}{FIELD_SEPARATOR}{id}{FIELD_SEPARATOR}{}",
            encoded.as_str()
        ),
        None => format!("{header}{FIELD_SEPARATOR}{}", encoded.as_str()),
    }
}

/// Parse key text.
///
/// With `expect_id` the text must carry a key id and `Some(id)` is returned;
/// otherwise the text must be bare and `None` is returned.
pub fn parse(text: &str, expect_id: bool) -> Result<(SymmetricKey, Option<KeyId>), CryptoError> {
    let expected = if expect_id { FIELDS_WITH_ID } else { FIELDS_BARE };

    if Version::from_header(text).is_some() {
        return Err(MalformedKey::FieldCount { expected, got: 1 }.into());
    }
    let Some((version, rest)) = Version::strip_header(text) else {
        return Err(MalformedKey::UnknownVersion.into());
    };

    let fields: Vec<&str> = rest.split(FIELD_SEPARATOR).collect();
    let got = fields.len() + 1;
    let (id, encoded) = match (expect_id, fields.as_slice()) {
        (true, [id, encoded]) => (Some(id.parse::<KeyId>()?), *encoded),
        (false, [encoded]) => (None, *encoded),
        _ => return Err(MalformedKey::FieldCount { expected, got }.into()),
    };

    let decoded = base64url_decode_secret(encoded)
        .map_err(|_| CryptoError::from(MalformedKey::InvalidBase64))?;
    let key = SymmetricKey::from_bytes(version, &decoded)?;
    Ok((key, id))
}

/// Parse id-carrying key text.
pub fn parse_with_id(text: &str) -> Result<(SymmetricKey, KeyId), CryptoError> {
    match parse(text, true)? {
        (key, Some(id)) => Ok((key, id)),
        (_, None) => Err(MalformedKey::InvalidKeyId.into()),
    }
}

/// Parse bare key text.
pub fn parse_bare(text: &str) -> Result<SymmetricKey, CryptoError> {
    parse(text, false).map(|(key, _)| key)
}

/// Read the key id from a token footer without a key and without decrypting.
///
/// Returns `None` for an empty footer. The id is unauthenticated until the
/// token is opened.
pub fn extract_key_id(token: &str) -> Result<Option<KeyId>, CryptoError> {
    let footer = protocol::footer(token)?;
    if footer.is_empty() {
        return Ok(None);
    }
    KeyId::from_footer_bytes(&footer).map(Some)
}

/// Footer bytes for an optional key id.
pub fn footer_for(id: Option<&KeyId>) -> Vec<u8> {
    id.map(|id| id.to_footer_bytes().to_vec()).unwrap_or_default()
}
