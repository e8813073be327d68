//! Keyed IP fingerprints.
//!
//! The fingerprint is forensic: it lets moderation correlate abuse and gates
//! the guest comment-removal window, but it is never the ownership key for a
//! record once a device identifier exists.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of the client address under a server-side key, hex-encoded.
/// Keyed so the stored value cannot be reversed into an address by rainbow
/// lookup over the IPv4 space.
pub fn ip_fingerprint(key: &[u8], ip: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(ip.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
