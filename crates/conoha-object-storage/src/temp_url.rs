//! Temporary URL signing.
//!
//! A temporary URL grants `method` on one object until `expires` without a
//! token. The signature is the hex HMAC-SHA256 of
//! `"<METHOD>\n<expires>\n<path>"` keyed with the account's
//! `X-Account-Meta-Temp-URL-Key`.

use crate::Result;
use conoha_core::Error;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "temp_url_sig";
/// Query parameter carrying the expiry as a unix timestamp.
pub const EXPIRES_PARAM: &str = "temp_url_expires";

/// Hex signature for `method` on `path` until `expires` (unix seconds).
///
/// `path` is the object path starting at `/v1/`.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] if the key is rejected by the MAC.
pub fn signature(method: &str, expires: i64, path: &str, key: &SecretString) -> Result<String> {
    let payload = [method.to_ascii_uppercase(), expires.to_string(), path.to_string()].join("\n");

    let mut mac = Hmac::<Sha256>::new_from_slice(key.expose_secret().as_bytes())
        .map_err(|err| Error::InvalidRequest(format!("Invalid temp URL key: {err}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Full temporary URL for `path` under `base`.
///
/// # Errors
///
/// See [`signature`].
pub fn build(
    base: &str,
    method: &str,
    expires: i64,
    path: &str,
    key: &SecretString,
) -> Result<String> {
    let sig = signature(method, expires, path, key)?;
    Ok(format!(
        "{}{path}?{SIGNATURE_PARAM}={sig}&{EXPIRES_PARAM}={expires}",
        base.trim_end_matches('/')
    ))
}
