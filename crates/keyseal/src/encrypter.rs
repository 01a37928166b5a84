//! Encrypter with key ids bound into authenticated footers.
//!
//! Encrypt: value → serialize → seal(current key, footer = current key id)
//! Decrypt: footer key id → resolve key → open → deserialize
//!
//! Key resolution on decrypt:
//! 1. no key id in the footer, or the current key id → current key
//! 2. a previous key registered under that id → that key
//! 3. otherwise the payload is rejected
//!
//! Rotating is therefore: generate a new current key and move the old one,
//! with its id, into the previous keys. Existing ciphertexts keep decrypting.

use keyseal_crypto::{codec, protocol, CryptoError, KeyId, SymmetricKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EncrypterConfig;
use crate::error::{ConfigError, DecryptError, DecryptFailure, EncryptError};
use crate::keyring::KeyRing;
use crate::serializer::{JsonSerializer, Serializer};

/// Encrypts serializable values.
pub trait ValueEncrypter {
    fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, EncryptError>;

    fn decrypt<T: DeserializeOwned>(&self, payload: &str) -> Result<T, DecryptError>;
}

/// Encrypts strings as-is, without serialization.
pub trait StringEncrypter {
    fn encrypt_string(&self, value: &str) -> Result<String, EncryptError>;

    fn decrypt_string(&self, payload: &str) -> Result<String, DecryptError>;
}

#[derive(Debug)]
pub struct Encrypter<S = JsonSerializer> {
    key: SymmetricKey,
    key_id: Option<KeyId>,
    footer: Vec<u8>,
    previous_keys: KeyRing,
    serializer: S,
}

impl Encrypter<JsonSerializer> {
    /// Create an encrypter. Without a key id, ciphertexts carry no footer.
    pub fn new(key: SymmetricKey, key_id: Option<KeyId>) -> Self {
        Self::with_serializer(key, key_id, JsonSerializer)
    }

    /// Create an encrypter from id-carrying key text.
    pub fn from_key_text(text: &str) -> Result<Self, CryptoError> {
        let (key, key_id) = codec::parse_with_id(text)?;
        Ok(Self::new(key, Some(key_id)))
    }

    /// Create a single-key encrypter from bare key text.
    pub fn from_bare_key(text: &str) -> Result<Self, CryptoError> {
        Ok(Self::new(codec::parse_bare(text)?, None))
    }

    /// Create an encrypter from the current and previous keys in `config`.
    pub fn from_config(config: &EncrypterConfig) -> Result<Self, ConfigError> {
        let mut encrypter = Self::from_key_text(config.require_key()?)?;
        encrypter.set_previous_keys(&config.previous_keys)?;
        Ok(encrypter)
    }

    /// Generate a random key for the current protocol version.
    pub fn generate_key() -> Result<SymmetricKey, CryptoError> {
        protocol::generate_key()
    }
}

impl<S: Serializer> Encrypter<S> {
    pub fn with_serializer(key: SymmetricKey, key_id: Option<KeyId>, serializer: S) -> Self {
        debug!(
            key_id = %display_id(key_id.as_ref()),
            version = %key.version(),
            "encrypter created"
        );
        Self {
            footer: codec::footer_for(key_id.as_ref()),
            key,
            key_id,
            previous_keys: KeyRing::new(),
            serializer,
        }
    }

    /// Register previous keys from id-carrying key texts.
    ///
    /// All texts are parsed before any is registered, so a malformed entry
    /// leaves the encrypter unchanged. A repeated id replaces the earlier key.
    pub fn set_previous_keys<I, T>(&mut self, keys: I) -> Result<&mut Self, CryptoError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let parsed = keys
            .into_iter()
            .map(|text| codec::parse_with_id(text.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for (key, id) in parsed {
            if self.key_id == Some(id) {
                warn!(key_id = %id, "previous key shares the current key id and is unreachable");
            }
            if self.previous_keys.insert(id, key).is_some() {
                warn!(key_id = %id, "duplicate previous key id, keeping the later key");
            } else {
                debug!(key_id = %id, "previous key registered");
            }
        }
        Ok(self)
    }

    /// Builder form of [`Encrypter::set_previous_keys`].
    pub fn with_previous_keys<I, T>(mut self, keys: I) -> Result<Self, CryptoError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.set_previous_keys(keys)?;
        Ok(self)
    }

    /// Serialize and encrypt a value under the current key.
    pub fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, EncryptError> {
        let serialized = self
            .serializer
            .serialize(value)
            .map_err(|e| EncryptError::Serialization(Box::new(e)))?;
        self.seal(serialized.as_bytes())
    }

    /// Encrypt a string under the current key without serialization.
    pub fn encrypt_string(&self, value: &str) -> Result<String, EncryptError> {
        self.seal(value.as_bytes())
    }

    /// Decrypt and deserialize a payload produced by [`Encrypter::encrypt`].
    pub fn decrypt<T: DeserializeOwned>(&self, payload: &str) -> Result<T, DecryptError> {
        let opened = self.open(payload)?;
        self.serializer
            .deserialize(&opened.plaintext)
            .map_err(|_| DecryptFailure::Deserialization.into())
    }

    /// Decrypt a payload produced by [`Encrypter::encrypt_string`].
    pub fn decrypt_string(&self, payload: &str) -> Result<String, DecryptError> {
        let mut opened = self.open(payload)?;
        Ok(std::mem::take(&mut *opened.plaintext))
    }

    /// The current key.
    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// The current key id, if any.
    pub fn key_id(&self) -> Option<&KeyId> {
        self.key_id.as_ref()
    }

    /// The current key followed by the previous keys in registration order.
    pub fn all_keys(&self) -> Vec<&SymmetricKey> {
        std::iter::once(&self.key)
            .chain(self.previous_keys.keys())
            .collect()
    }

    pub fn previous_keys(&self) -> &KeyRing {
        &self.previous_keys
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    fn seal(&self, plaintext: &[u8]) -> Result<String, EncryptError> {
        Ok(protocol::seal(plaintext, &self.key, &self.footer)?)
    }

    fn open(&self, payload: &str) -> Result<protocol::Opened, DecryptFailure> {
        let key_id = codec::extract_key_id(payload).map_err(|_| DecryptFailure::InvalidFooter)?;
        let key = self.key_for(key_id.as_ref())?;
        protocol::open(payload, key).map_err(|_| DecryptFailure::Authentication)
    }

    fn key_for(&self, key_id: Option<&KeyId>) -> Result<&SymmetricKey, DecryptFailure> {
        match key_id {
            None => Ok(&self.key),
            Some(id) if self.key_id.as_ref() == Some(id) => Ok(&self.key),
            Some(id) => self
                .previous_keys
                .get(id)
                .ok_or(DecryptFailure::KeyNotFound),
        }
    }
}

impl<S: Serializer> ValueEncrypter for Encrypter<S> {
    fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, EncryptError> {
        Encrypter::encrypt(self, value)
    }

    fn decrypt<T: DeserializeOwned>(&self, payload: &str) -> Result<T, DecryptError> {
        Encrypter::decrypt(self, payload)
    }
}

impl<S: Serializer> StringEncrypter for Encrypter<S> {
    fn encrypt_string(&self, value: &str) -> Result<String, EncryptError> {
        Encrypter::encrypt_string(self, value)
    }

    fn decrypt_string(&self, payload: &str) -> Result<String, DecryptError> {
        Encrypter::decrypt_string(self, payload)
    }
}

fn display_id(id: Option<&KeyId>) -> String {
    id.map(ToString::to_string).unwrap_or_else(|| "none".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn id_key() -> (SymmetricKey, KeyId) {
        let key = Encrypter::generate_key().unwrap();
        let (text, _) = codec::export(&key, true);
        codec::parse_with_id(&text).unwrap()
    }

    fn with_id() -> (Encrypter, String) {
        let key = Encrypter::generate_key().unwrap();
        let (text, id) = codec::export(&key, true);
        (Encrypter::new(key, id), text)
    }

    #[test]
    fn string_round_trip() {
        let (enc, _) = with_id();
        for value in ["", "secret-value", "héllo wörld ✓ 日本語"] {
            let payload = enc.encrypt_string(value).unwrap();
            assert_eq!(enc.decrypt_string(&payload).unwrap(), value);
        }
    }

    #[test]
    fn empty_string_round_trip() {
        let (old, old_text) = with_id();
        let payload = old.encrypt_string("").unwrap();
        assert_eq!(old.decrypt_string(&payload).unwrap(), "");

        let (current, _) = with_id();
        let current = current.with_previous_keys([&old_text]).unwrap();
        assert_eq!(current.decrypt_string(&payload).unwrap(), "");

        let bare = Encrypter::new(Encrypter::generate_key().unwrap(), None);
        let payload = bare.encrypt_string("").unwrap();
        assert_eq!(codec::extract_key_id(&payload).unwrap(), None);
        assert_eq!(bare.decrypt_string(&payload).unwrap(), "");
        assert!(current.decrypt_string(&payload).is_err());
    }

    #[test]
    fn value_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Cookie {
            session: String,
            remember: bool,
            ttl: u32,
        }
        let (enc, _) = with_id();
        let cookie = Cookie {
            session: "abc".into(),
            remember: true,
            ttl: 3600,
        };
        let payload = enc.encrypt(&cookie).unwrap();
        let back: Cookie = enc.decrypt(&payload).unwrap();
        assert_eq!(back, cookie);
    }

    #[test]
    fn encrypt_serializes_decrypt_string_does_not() {
        let (enc, _) = with_id();
        let payload = enc.encrypt("abc").unwrap();
        assert_eq!(enc.decrypt_string(&payload).unwrap(), "\"abc\"");
    }

    #[test]
    fn footer_carries_current_key_id() {
        let (enc, _) = with_id();
        let payload = enc.encrypt_string("x").unwrap();
        assert_eq!(
            codec::extract_key_id(&payload).unwrap().as_ref(),
            enc.key_id()
        );
    }

    #[test]
    fn no_id_mode_has_empty_footer() {
        let enc = Encrypter::new(Encrypter::generate_key().unwrap(), None);
        let payload = enc.encrypt_string("x").unwrap();
        assert_eq!(payload.matches('.').count(), 2);
        assert_eq!(codec::extract_key_id(&payload).unwrap(), None);
        assert_eq!(enc.decrypt_string(&payload).unwrap(), "x");
    }

    #[test]
    fn previous_key_decrypts_old_payloads() {
        let old_key = Encrypter::generate_key().unwrap();
        let (old_text, old_id) = codec::export(&old_key, true);
        let old = Encrypter::new(old_key, old_id);
        let payload = old.encrypt_string("x").unwrap();

        let (current, _) = with_id();
        let current = current.with_previous_keys([&old_text]).unwrap();
        assert_eq!(current.decrypt_string(&payload).unwrap(), "x");
    }

    #[test]
    fn unknown_key_id_fails() {
        let (a, _) = with_id();
        let (b, _) = with_id();
        let payload = a.encrypt_string("x").unwrap();
        assert!(b.decrypt_string(&payload).is_err());
    }

    #[test]
    fn key_selection() {
        let (current_key, current_id) = id_key();
        let (prev_key, prev_id) = id_key();
        let prev_raw = prev_key.raw().to_vec();
        let mut enc = Encrypter::new(current_key, Some(current_id));
        enc.previous_keys.insert(prev_id, prev_key);

        assert!(std::ptr::eq(enc.key_for(None).unwrap(), enc.key()));
        assert!(std::ptr::eq(
            enc.key_for(Some(&current_id)).unwrap(),
            enc.key()
        ));
        assert_eq!(enc.key_for(Some(&prev_id)).unwrap().raw(), &prev_raw[..]);
        assert_eq!(
            enc.key_for(Some(&KeyId::generate())).unwrap_err(),
            DecryptFailure::KeyNotFound
        );
    }

    #[test]
    fn decrypt_failures_are_indistinguishable() {
        let (enc, _) = with_id();
        let (other, _) = with_id();
        let good = enc.encrypt_string("x").unwrap();

        let mut tampered = good.clone().into_bytes();
        tampered[12] ^= 0x01;
        let tampered = String::from_utf8(tampered).unwrap();

        let failures = [
            enc.decrypt_string("garbage").unwrap_err().to_string(),
            enc.decrypt_string(&other.encrypt_string("x").unwrap())
                .unwrap_err()
                .to_string(),
            enc.decrypt_string(&tampered).unwrap_err().to_string(),
            enc.decrypt::<u32>(&good).unwrap_err().to_string(),
        ];
        for message in &failures {
            assert_eq!(message, "The payload is invalid.");
        }
    }

    #[test]
    fn all_keys_current_first_then_insertion_order() {
        let texts: Vec<String> = (0..3)
            .map(|_| codec::export(&Encrypter::generate_key().unwrap(), true).0)
            .collect();
        let (enc, _) = with_id();
        let enc = enc.with_previous_keys(&texts).unwrap();

        let all = enc.all_keys();
        assert_eq!(all.len(), 4);
        assert!(std::ptr::eq(all[0], enc.key()));
        for (i, text) in texts.iter().enumerate() {
            let (expected, _) = codec::parse_with_id(text).unwrap();
            assert_eq!(all[i + 1], &expected);
        }
    }

    #[test]
    fn duplicate_previous_id_last_write_wins() {
        let id = KeyId::generate();
        let first = Encrypter::generate_key().unwrap();
        let second = Encrypter::generate_key().unwrap();
        let texts = [
            codec::export_with_id(&first, Some(&id)),
            codec::export_with_id(&second, Some(&id)),
        ];
        let (enc, _) = with_id();
        let enc = enc.with_previous_keys(&texts).unwrap();
        assert_eq!(enc.previous_keys().len(), 1);
        assert_eq!(enc.previous_keys().get(&id), Some(&second));
    }

    #[test]
    fn malformed_previous_key_is_rejected_atomically() {
        let good = codec::export(&Encrypter::generate_key().unwrap(), true).0;
        let bare = codec::export(&Encrypter::generate_key().unwrap(), false).0;
        let (mut enc, _) = with_id();
        let err = enc.set_previous_keys([good.as_str(), bare.as_str()]);
        assert!(matches!(err, Err(CryptoError::MalformedKey(_))));
        assert!(enc.previous_keys().is_empty());
    }

    #[test]
    fn from_key_text_and_bare_key() {
        let key = Encrypter::generate_key().unwrap();
        let (with_id_text, id) = codec::export(&key, true);
        let (bare_text, _) = codec::export(&key, false);

        let a = Encrypter::from_key_text(&with_id_text).unwrap();
        assert_eq!(a.key_id(), id.as_ref());
        assert_eq!(a.key(), &key);

        let b = Encrypter::from_bare_key(&bare_text).unwrap();
        assert!(b.key_id().is_none());
        assert!(Encrypter::from_key_text(&bare_text).is_err());
        assert!(Encrypter::from_bare_key(&with_id_text).is_err());
    }

    #[test]
    fn from_config() {
        let old = codec::export(&Encrypter::generate_key().unwrap(), true).0;
        let current = codec::export(&Encrypter::generate_key().unwrap(), true).0;
        let config = EncrypterConfig::new(current).with_previous_keys([old]);
        let enc = Encrypter::from_config(&config).unwrap();
        assert_eq!(enc.previous_keys().len(), 1);

        let err = Encrypter::from_config(&EncrypterConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey));

        let err = Encrypter::from_config(&EncrypterConfig::new("v4.local.bad")).unwrap_err();
        assert!(matches!(err, ConfigError::Key(CryptoError::MalformedKey(_))));
    }

    #[test]
    fn capability_traits() {
        fn via_traits<E: ValueEncrypter + StringEncrypter>(enc: &E) {
            let payload = enc.encrypt(&vec![1, 2, 3]).unwrap();
            assert_eq!(enc.decrypt::<Vec<i32>>(&payload).unwrap(), vec![1, 2, 3]);
            let payload = enc.encrypt_string("raw").unwrap();
            assert_eq!(enc.decrypt_string(&payload).unwrap(), "raw");
        }
        let (enc, _) = with_id();
        via_traits(&enc);
    }

    #[test]
    fn encrypter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Encrypter>();
    }
}
