//! API token generation and hashing
//!
//! Tokens look like `blink_<base36-millis>_<32-hex>`: the prefix marks
//! provenance and the timestamp component keeps generated tokens sortable,
//! but neither is a security boundary; the stored SHA-256 hash is.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Token prefix for identification
const TOKEN_PREFIX: &str = "blink_";

/// A freshly generated token with its derived storage fields.
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    /// The full plaintext token (only handed out once).
    pub token: String,
    /// Truncated form safe to display in key listings.
    pub prefix: String,
    /// SHA-256 hex digest persisted in place of the token.
    pub token_hash: String,
}

/// Encode a number in lowercase base-36.
fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

/// Generate a new API token.
pub fn generate_token() -> GeneratedToken {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 16] = rng.gen();
    let random_hex = hex::encode(random_bytes);

    let timestamp = to_base36(Utc::now().timestamp_millis() as u64);
    let token = format!("{}{}_{}", TOKEN_PREFIX, timestamp, random_hex);
    let token_hash = hash_token(&token);
    let prefix = format!("{}{}_{}...", TOKEN_PREFIX, timestamp, &random_hex[..8]);

    GeneratedToken {
        token,
        prefix,
        token_hash,
    }
}

/// Hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether a header value looks like a Blink API token.
pub fn is_api_token_format(s: &str) -> bool {
    s.starts_with(TOKEN_PREFIX) && s.len() > TOKEN_PREFIX.len() + 32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_expected_shape() {
        let generated = generate_token();
        assert!(generated.token.starts_with(TOKEN_PREFIX));
        assert!(is_api_token_format(&generated.token));
        // prefix_timestamp_random = 3 underscore-separated parts
        assert_eq!(generated.token.split('_').count(), 3);
        assert!(generated.prefix.ends_with("..."));
    }

    #[test]
    fn hash_is_stable_and_one_way() {
        let generated = generate_token();
        assert_eq!(hash_token(&generated.token), generated.token_hash);
        assert_ne!(generated.token_hash, generated.token);
        // 32 bytes of SHA-256 as hex
        assert_eq!(generated.token_hash.len(), 64);
    }

    #[test]
    fn distinct_tokens_get_distinct_hashes() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a.token, b.token);
        assert_ne!(a.token_hash, b.token_hash);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn format_sniffing_rejects_jwt_like_values() {
        assert!(!is_api_token_format("eyJhbGciOiJIUzI1NiJ9.payload.sig"));
        assert!(!is_api_token_format("blink_short"));
    }
}
