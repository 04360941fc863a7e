/// Cross-site request forgery tokens
///
/// Each browser holds a random nonce in a cookie. Forms embed
/// `HMAC-SHA256(secret, nonce)` as a hidden field, and every POST must echo a
/// token that verifies against the nonce cookie sent with it. A page on another
/// origin can make the browser send the cookie but cannot read it, so it cannot
/// produce the matching token.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::csrf::{generate_nonce, token_for, verify_token};
///
/// let secret = "a-session-secret-of-at-least-32-bytes";
/// let nonce = generate_nonce();
/// let token = token_for(secret, &nonce);
///
/// assert!(verify_token(secret, &nonce, &token));
/// assert!(!verify_token(secret, &generate_nonce(), &token));
/// ```

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes per nonce (hex-encoded to twice this length)
pub const NONCE_BYTES: usize = 32;

/// Domain separation prefix so tokens can't be confused with other MACs
const CONTEXT: &[u8] = b"taskdesk-csrf:";

/// Generates a fresh hex-encoded nonce
pub fn generate_nonce() -> String {
    let bytes: [u8; NONCE_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Whether a cookie value has the shape of a nonce we issued
pub fn is_valid_nonce(nonce: &str) -> bool {
    nonce.len() == NONCE_BYTES * 2 && nonce.bytes().all(|b| b.is_ascii_hexdigit())
}

fn mac_for(secret: &str, nonce: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(CONTEXT);
    mac.update(nonce.as_bytes());
    mac
}

/// Derives the form token for a nonce
pub fn token_for(secret: &str, nonce: &str) -> String {
    hex::encode(mac_for(secret, nonce).finalize().into_bytes())
}

/// Checks a submitted token in constant time
pub fn verify_token(secret: &str, nonce: &str, submitted: &str) -> bool {
    if !is_valid_nonce(nonce) {
        return false;
    }

    match hex::decode(submitted) {
        Ok(bytes) => mac_for(secret, nonce).verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}
