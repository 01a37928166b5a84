/// Protocol version tag carried by keys and ciphertexts.
///
/// `v4.local`: PASETO v4 local tokens (XChaCha20 + BLAKE2b-MAC).
/// Key text: `v4.local[.keyId].base64url(key)` (older tooling wrote `v4`)
/// Ciphertext: `v4.local.base64url(nonce || ciphertext || tag)[.base64url(footer)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V4Local,
}

impl Version {
    /// Textual header shared by exported keys and sealed tokens.
    pub const fn header(self) -> &'static str {
        match self {
            Version::V4Local => "v4.local",
        }
    }

    /// Raw key length mandated by the protocol.
    pub const fn key_length(self) -> usize {
        match self {
            Version::V4Local => V4_LOCAL_KEY_LENGTH,
        }
    }

    /// Header written by older key tooling (`v4.<keyId>.<key>`). Accepted
    /// when parsing keys, never produced.
    pub const fn legacy_header(self) -> &'static str {
        match self {
            Version::V4Local => "v4",
        }
    }

    /// Resolve a header, current or legacy, to a supported version.
    pub fn from_header(header: &str) -> Option<Self> {
        SUPPORTED_VERSIONS
            .iter()
            .copied()
            .find(|v| v.header() == header || v.legacy_header() == header)
    }

    /// Match the version whose `header.` prefixes `text`, returning the remainder.
    ///
    /// The current header is tried before the legacy one.
    pub(crate) fn strip_header(text: &str) -> Option<(Self, &str)> {
        SUPPORTED_VERSIONS.iter().copied().find_map(|v| {
            [v.header(), v.legacy_header()]
                .into_iter()
                .find_map(|header| {
                    text.strip_prefix(header)
                        .and_then(|rest| rest.strip_prefix(FIELD_SEPARATOR))
                })
                .map(|rest| (v, rest))
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Version used for newly generated keys and ciphertexts.
pub const CURRENT_VERSION: Version = Version::V4Local;

/// Versions accepted when parsing keys.
pub const SUPPORTED_VERSIONS: &[Version] = &[Version::V4Local];

/// v4.local symmetric key length in bytes (256 bits).
pub const V4_LOCAL_KEY_LENGTH: usize = 32;

/// Binary key id length in bytes (one UUID).
pub const KEY_ID_LENGTH: usize = 16;

/// Textual key id length in base58 characters.
pub const KEY_ID_TEXT_LENGTH: usize = 22;

/// Separator between fields of key text and tokens.
pub const FIELD_SEPARATOR: char = '.';
