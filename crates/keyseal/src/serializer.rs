//! Pluggable value serialization for [`crate::Encrypter::encrypt`].
//!
//! Serialized output is text: sealed tokens carry UTF-8 payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

pub trait Serializer: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Zeroizing<String>, Self::Error>;

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, Self::Error>;
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    type Error = serde_json::Error;

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Zeroizing<String>, Self::Error> {
        serde_json::to_string(value).map(Zeroizing::new)
    }

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, Self::Error> {
        serde_json::from_str(text)
    }
}
