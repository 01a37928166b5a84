//! PASETO v4.local sealing.
//!
//! Token format:
//! `v4.local.base64url(nonce:32 || ciphertext || tag:32)[.base64url(footer)]`
//!
//! The footer is authenticated (part of PAE) but not encrypted. The AEAD
//! itself is provided by `pasetors`; this module only adapts key types and
//! maps errors. Error variants carry no detail from the underlying library.
//!
//! PASETO forbids an empty message. An empty plaintext is sealed as a
//! one-byte stand-in bound to a fixed implicit assertion, so it keeps the
//! ordinary token layout and cannot be confused with a real one-byte value.

use pasetors::keys::SymmetricKey as PasetoKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::{LocalToken, V4};
use pasetors::Local;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::key::SymmetricKey;
use crate::types::Version;

/// Implicit assertion marking a token whose plaintext is empty.
const EMPTY_PLAINTEXT_ASSERTION: &[u8] = b"keyseal:empty-plaintext";

/// Message sealed in place of an empty plaintext.
const EMPTY_PLAINTEXT_STANDIN: &[u8] = b"\0";

/// Plaintext and footer recovered from an authenticated token.
pub struct Opened {
    pub plaintext: Zeroizing<String>,
    pub footer: Vec<u8>,
}

/// Generate a random key of the protocol-mandated length.
pub fn generate_key() -> Result<SymmetricKey, CryptoError> {
    SymmetricKey::generate()
}

/// Encrypt `plaintext` under `key`, binding `footer` into the authentication tag.
///
/// An empty footer produces a token without a footer segment.
pub fn seal(plaintext: &[u8], key: &SymmetricKey, footer: &[u8]) -> Result<String, CryptoError> {
    match key.version() {
        Version::V4Local => {
            let paseto_key = v4_key(key).map_err(|e| CryptoError::Encryption(e.to_string()))?;
            let footer = (!footer.is_empty()).then_some(footer);
            let sealed = if plaintext.is_empty() {
                LocalToken::encrypt(
                    &paseto_key,
                    EMPTY_PLAINTEXT_STANDIN,
                    footer,
                    Some(EMPTY_PLAINTEXT_ASSERTION),
                )
            } else {
                LocalToken::encrypt(&paseto_key, plaintext, footer, None)
            };
            sealed.map_err(|e| CryptoError::Encryption(e.to_string()))
        }
    }
}

/// Verify and decrypt a token.
///
/// Fails with [`CryptoError::Authentication`] on a malformed token, a version
/// other than the key's, a wrong key, or any modification of the token.
pub fn open(token: &str, key: &SymmetricKey) -> Result<Opened, CryptoError> {
    match key.version() {
        Version::V4Local => {
            let untrusted = UntrustedToken::<Local, V4>::try_from(token)
                .map_err(|_| CryptoError::Authentication)?;
            let paseto_key = v4_key(key).map_err(|_| CryptoError::Authentication)?;
            let footer = untrusted.untrusted_footer();
            let footer = (!footer.is_empty()).then_some(footer);

            if let Ok(trusted) = LocalToken::decrypt(&paseto_key, &untrusted, footer, None) {
                return Ok(Opened {
                    plaintext: Zeroizing::new(trusted.payload().to_owned()),
                    footer: trusted.footer().to_vec(),
                });
            }

            let trusted = LocalToken::decrypt(
                &paseto_key,
                &untrusted,
                footer,
                Some(EMPTY_PLAINTEXT_ASSERTION),
            )
            .map_err(|_| CryptoError::Authentication)?;
            if trusted.payload().as_bytes() != EMPTY_PLAINTEXT_STANDIN {
                return Err(CryptoError::Authentication);
            }
            Ok(Opened {
                plaintext: Zeroizing::new(String::new()),
                footer: trusted.footer().to_vec(),
            })
        }
    }
}

/// Read the footer of a token without any key. The result is unauthenticated.
///
/// Fails with [`CryptoError::InvalidFooter`] if the token is not structurally
/// a v4.local token.
pub fn footer(token: &str) -> Result<Vec<u8>, CryptoError> {
    let untrusted =
        UntrustedToken::<Local, V4>::try_from(token).map_err(|_| CryptoError::InvalidFooter)?;
    Ok(untrusted.untrusted_footer().to_vec())
}

fn v4_key(key: &SymmetricKey) -> Result<PasetoKey<V4>, pasetors::errors::Error> {
    PasetoKey::<V4>::from(key.raw())
}
