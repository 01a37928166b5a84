pub mod base64url;
pub mod codec;
pub mod error;
pub mod key;
pub mod key_id;
pub mod protocol;
pub mod types;

pub use base64url::base64url_encode;
pub use codec::{
    export, export_with_id, extract_key_id, footer_for, generate_key_id, parse, parse_bare,
    parse_with_id,
};
pub use error::{CryptoError, MalformedKey};
pub use key::SymmetricKey;
pub use key_id::KeyId;
pub use protocol::{generate_key, open, seal, Opened};
pub use types::{Version, CURRENT_VERSION, SUPPORTED_VERSIONS};
