//! Anonymous device identity cookie.
//!
//! A UUIDv4 in a long-lived, HttpOnly, SameSite=Lax cookie stands in for
//! identity before login. Hand-rolled header handling: the value is opaque
//! base64url, so there is nothing to escape.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use uuid::Uuid;

pub const DEVICE_COOKIE: &str = "blg_device";
/// Five years, in seconds.
pub const DEVICE_COOKIE_MAX_AGE: i64 = 5 * 365 * 24 * 60 * 60;

pub fn encode_device_id(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.as_bytes())
}

pub fn decode_device_id(raw: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    Uuid::from_slice(&bytes).ok()
}

/// Renders the Set-Cookie value for a device id.
pub fn issue_cookie(id: Uuid) -> String {
    format!(
        "{DEVICE_COOKIE}={}; Path=/; Max-Age={DEVICE_COOKIE_MAX_AGE}; HttpOnly; SameSite=Lax",
        encode_device_id(id)
    )
}

/// Extracts the device id from a raw Cookie header value.
pub fn device_from_cookie_header(header: &str) -> Option<Uuid> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == DEVICE_COOKIE {
            decode_device_id(value.trim())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_round_trips() {
        let id = Uuid::new_v4();
        assert_eq!(decode_device_id(&encode_device_id(id)), Some(id));
        assert_eq!(decode_device_id("!!not-base64!!"), None);
    }

    #[test]
    fn header_parsing_finds_the_device_cookie() {
        let id = Uuid::new_v4();
        let header = format!("theme=dark; {DEVICE_COOKIE}={}; lang=en", encode_device_id(id));
        assert_eq!(device_from_cookie_header(&header), Some(id));
        assert_eq!(device_from_cookie_header("theme=dark"), None);
    }

    #[test]
    fn issued_cookie_carries_hardening_attributes() {
        let cookie = issue_cookie(Uuid::new_v4());
        assert!(cookie.starts_with("blg_device="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=157680000"));
    }
}
