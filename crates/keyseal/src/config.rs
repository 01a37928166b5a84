//! Encrypter configuration.
//!
//! Keys come from the application config or from the environment:
//! `APP_KEY` holds the current id-carrying key, `APP_PREVIOUS_KEYS` a
//! comma-separated list of id-carrying previous keys, oldest first.

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ConfigError;

pub const KEY_ENV: &str = "APP_KEY";
pub const PREVIOUS_KEYS_ENV: &str = "APP_PREVIOUS_KEYS";

const KEY_LIST_SEPARATOR: &str = ",";

#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EncrypterConfig {
    /// Current key text.
    #[serde(default)]
    pub key: Option<String>,
    /// Previous key texts. Accepts a list or a comma-separated string.
    #[serde(default, deserialize_with = "deserialize_key_list")]
    pub previous_keys: Vec<String>,
}

impl EncrypterConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            previous_keys: Vec::new(),
        }
    }

    pub fn with_previous_keys<I, T>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.previous_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Read `APP_KEY` and `APP_PREVIOUS_KEYS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the same variables through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            key: lookup(KEY_ENV),
            previous_keys: lookup(PREVIOUS_KEYS_ENV)
                .map(|joined| split_key_list(&joined))
                .unwrap_or_default(),
        }
    }

    /// The current key text, or [`ConfigError::MissingKey`] if absent or blank.
    pub fn require_key(&self) -> Result<&str, ConfigError> {
        self.key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingKey)
    }
}

impl std::fmt::Debug for EncrypterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncrypterConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("previous_keys", &self.previous_keys.len())
            .finish()
    }
}

/// Split a comma-separated key list, trimming entries and dropping empty ones.
pub fn split_key_list(joined: &str) -> Vec<String> {
    joined
        .split(KEY_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join key texts into the `APP_PREVIOUS_KEYS` form.
pub fn join_key_list<T: AsRef<str>>(keys: &[T]) -> String {
    keys.iter()
        .map(AsRef::<str>::as_ref)
        .filter(|key| !key.is_empty())
        .collect::<Vec<_>>()
        .join(KEY_LIST_SEPARATOR)
}

fn deserialize_key_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum KeyList {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match KeyList::deserialize(deserializer)? {
        KeyList::Joined(joined) => split_key_list(&joined),
        KeyList::List(keys) => keys
            .into_iter()
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .collect(),
    })
}
