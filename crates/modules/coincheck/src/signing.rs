//! HMAC-SHA256 request signing for the Coincheck private API.
//!
//! ```text
//! message   = nonce + full URL + body      (body is empty for GET)
//! signature = hex(HMAC-SHA256(api_secret, message))
//! ```
//!
//! Any change to the concatenation order invalidates the signature; the
//! exchange then answers 401 and the call degrades to an empty record.

use std::sync::atomic::{AtomicU64, Ordering};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use cinfo_common::error::{CinfoError, CinfoResult};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_KEY: &str = "ACCESS-KEY";
pub const HEADER_NONCE: &str = "ACCESS-NONCE";
pub const HEADER_SIGNATURE: &str = "ACCESS-SIGNATURE";

/// Hex-encoded HMAC-SHA256 of `nonce + url + body`.
pub fn sign(secret: &str, nonce: &str, url: &str, body: &str) -> CinfoResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CinfoError::Config(format!("invalid Coincheck API secret: {e}")))?;
    mac.update(nonce.as_bytes());
    mac.update(url.as_bytes());
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Seconds-since-epoch nonces, strictly increasing per client.
///
/// Two requests in the same second get `t` and `t + 1`.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next nonce as the decimal string sent in `ACCESS-NONCE`.
    pub fn next(&self) -> String {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        self.next_after(now).to_string()
    }

    fn next_after(&self, now: u64) -> u64 {
        let prev = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                Some(now.max(prev + 1))
            })
            .unwrap_or_else(|prev| prev);
        now.max(prev + 1)
    }
}
