//! Hot-reloadable encrypter handle.
//!
//! Readers take an `Arc` snapshot and work on it without holding the lock.
//! A reload swaps in a fully built encrypter, so no reader ever sees a
//! partially populated set of previous keys.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::encrypter::{Encrypter, StringEncrypter, ValueEncrypter};
use crate::error::{DecryptError, EncryptError};
use crate::serializer::{JsonSerializer, Serializer};

pub struct SharedEncrypter<S = JsonSerializer> {
    current: RwLock<Arc<Encrypter<S>>>,
}

impl<S: Serializer> SharedEncrypter<S> {
    pub fn new(encrypter: Encrypter<S>) -> Self {
        Self {
            current: RwLock::new(Arc::new(encrypter)),
        }
    }

    /// The encrypter in effect right now.
    pub fn snapshot(&self) -> Arc<Encrypter<S>> {
        Arc::clone(&self.current.read())
    }

    /// Replace the encrypter, returning the one it replaced.
    ///
    /// Calls already holding a snapshot finish on the old encrypter.
    pub fn reload(&self, encrypter: Encrypter<S>) -> Arc<Encrypter<S>> {
        let next = Arc::new(encrypter);
        info!(
            key_id = ?next.key_id().map(ToString::to_string),
            previous_keys = next.previous_keys().len(),
            "encrypter reloaded"
        );
        std::mem::replace(&mut *self.current.write(), next)
    }
}

impl<S: Serializer> ValueEncrypter for SharedEncrypter<S> {
    fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, EncryptError> {
        self.snapshot().encrypt(value)
    }

    fn decrypt<T: DeserializeOwned>(&self, payload: &str) -> Result<T, DecryptError> {
        self.snapshot().decrypt(payload)
    }
}

impl<S: Serializer> StringEncrypter for SharedEncrypter<S> {
    fn encrypt_string(&self, value: &str) -> Result<String, EncryptError> {
        self.snapshot().encrypt_string(value)
    }

    fn decrypt_string(&self, payload: &str) -> Result<String, DecryptError> {
        self.snapshot().decrypt_string(payload)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for SharedEncrypter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEncrypter")
            .field("current", &*self.current.read())
            .finish()
    }
}
