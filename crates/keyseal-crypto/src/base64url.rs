use base64ct::{Base64UrlUnpadded, Encoding};
use zeroize::Zeroizing;

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode secret material.
///
/// The scratch buffer is owned by a `Zeroizing` wrapper from allocation on,
/// so partially decoded bytes are wiped on the error path as well.
pub fn base64url_decode_secret(s: &str) -> Result<Zeroizing<Vec<u8>>, base64ct::Error> {
    let mut buf = Zeroizing::new(vec![0u8; s.len() * 3 / 4 + 3]);
    let len = Base64UrlUnpadded::decode(s, &mut buf)?.len();
    buf.truncate(len);
    Ok(buf)
}
