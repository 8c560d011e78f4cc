// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., C_K7NP3X for categories)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of the random part of an entity ID
const ENTITY_ID_LENGTH: usize = 6;

/// Length of session tokens and state nonces. These are bearer secrets,
/// so they carry far more entropy than entity IDs (32^32 = 160 bits).
const TOKEN_LENGTH: usize = 32;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Category (C_)
    Category,
    /// Item (T_) - T for Thing, C is taken by categories
    Item,
    /// Session token (K_) - K for Key
    Session,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Category => "C",
            EntityPrefix::Item => "T",
            EntityPrefix::Session => "K",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Returns
/// A string in format "PREFIX_XXXXXX" (e.g., "C_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ENTITY_ID_LENGTH))
}

/// Generate a user ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a category ID (C_XXXXXX)
pub fn generate_category_id() -> String {
    generate_id(EntityPrefix::Category)
}

/// Generate an item ID (T_XXXXXX)
pub fn generate_item_id() -> String {
    generate_id(EntityPrefix::Item)
}

/// Generate an opaque session token (K_ followed by 32 random characters)
pub fn generate_session_token() -> String {
    format!(
        "{}_{}",
        EntityPrefix::Session.as_str(),
        generate_crockford_string(TOKEN_LENGTH)
    )
}

/// Generate an anti-forgery state nonce for the login handshake
pub fn generate_state_nonce() -> String {
    generate_crockford_string(TOKEN_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_format() {
        let id = generate_id(EntityPrefix::Category);
        assert!(id.starts_with("C_"));
        assert_eq!(id.len(), 2 + ENTITY_ID_LENGTH);
    }

    #[test]
    fn test_id_uses_crockford_alphabet() {
        let id = generate_id(EntityPrefix::Item);
        let random_part = id.split('_').nth(1).unwrap();
        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "character {} not in Crockford alphabet",
                c
            );
        }
    }

    #[test]
    fn test_prefixes_are_distinct() {
        let prefixes = [
            EntityPrefix::User,
            EntityPrefix::Category,
            EntityPrefix::Item,
            EntityPrefix::Session,
        ];
        let unique: HashSet<&str> = prefixes.iter().map(|p| p.as_str()).collect();
        assert_eq!(unique.len(), prefixes.len());
    }

    #[test]
    fn test_session_token_length() {
        let token = generate_session_token();
        assert!(token.starts_with("K_"));
        assert_eq!(token.len(), 2 + TOKEN_LENGTH);
    }

    #[test]
    fn test_nonces_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(generate_state_nonce()));
        }
    }
}
