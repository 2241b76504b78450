//! HMAC-SHA1 URL signer

use crate::error::{Error, Result};
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Decode a signing key distributed in URL-safe base64
///
/// Keys are accepted in either alphabet: `-` and `_` are mapped back to the
/// standard `+` and `/` before decoding. Padding is required.
pub fn decode_signing_key(secret: &str) -> Result<Vec<u8>> {
    let normalized = secret.replace('-', "+").replace('_', "/");
    STANDARD
        .decode(normalized)
        .map_err(|e| Error::signing(format!("invalid signing key: {e}")))
}

/// Sign `path?query` with the given URL-safe base64 secret
///
/// Returns the URL-safe base64 encoded digest, padding included.
pub fn sign(path: &str, query: &str, secret: &str) -> Result<String> {
    let key = decode_signing_key(secret)?;

    let mut mac = HmacSha1::new_from_slice(&key)
        .map_err(|e| Error::signing(format!("HMAC init failed: {e}")))?;
    mac.update(path.as_bytes());
    mac.update(b"?");
    mac.update(query.as_bytes());

    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// Sign an already built URL over its path and raw query
pub fn sign_url(url: &Url, secret: &str) -> Result<String> {
    sign(url.path(), url.query().unwrap_or_default(), secret)
}
