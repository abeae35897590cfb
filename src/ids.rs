// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unguessable identifiers from the system CSPRNG.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};

/// `len` random bytes, URL-safe base64 without padding.
pub fn random_token(len: usize) -> Result<String, Unspecified> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new().fill(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Opaque Polar `member-id` for user registration.
pub fn member_id() -> Result<String, Unspecified> {
    Ok(format!("member-{}", random_token(12)?))
}

/// Fallback ID for a Polar exercise that came back without one.
pub fn activity_id() -> Result<String, Unspecified> {
    Ok(format!("activity-{}", random_token(12)?))
}

/// ID of a locally stored trail run.
pub fn run_id() -> Result<String, Unspecified> {
    random_token(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_is_url_safe() {
        let token = random_token(32).unwrap();
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.len(), 43);
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(random_token(16).unwrap(), random_token(16).unwrap());
        assert!(member_id().unwrap().starts_with("member-"));
        assert!(activity_id().unwrap().starts_with("activity-"));
    }
}
