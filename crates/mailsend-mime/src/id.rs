//! Random tokens for message IDs, content IDs and boundaries.

use rand::Rng;
use std::fmt::Write as _;

/// Returns 32 lowercase hex characters from 128 random bits.
#[must_use]
pub fn unique_token() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    bytes.iter().fold(String::with_capacity(32), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Returns a fresh multipart boundary.
#[must_use]
pub fn boundary() -> String {
    format!("=_{}", unique_token())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_token_shape() {
        let token = unique_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(unique_token(), unique_token());
        assert_ne!(boundary(), boundary());
    }
}
