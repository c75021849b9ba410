use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::{Digest, Sha256};

/// PBKDF2-HMAC-SHA256 work factor, reduced under test
const PBKDF2_ROUNDS: u32 = if cfg!(test) { 1_000 } else { 200_000 };

pub fn generate_salt() -> String {
    hex::encode(rand::thread_rng().gen::<[u8; 16]>())
}

pub fn hash_password(password: &str, salt: &str) -> String {
    hex::encode(derive_key(password, salt))
}

fn derive_key(password: &str, salt: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut key);
    key
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hash) else {
        return false;
    };
    constant_time_eq(&derive_key(password, salt), &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Opaque bearer token handed to the client at login
pub fn new_session_token() -> String {
    hex::encode(rand::thread_rng().gen::<[u8; 32]>())
}

/// Sessions are stored by token digest, never by the token itself
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_hashed_password() {
        let salt = generate_salt();
        let hash = hash_password("12345678", &salt);
        assert!(verify_password("12345678", &salt, &hash));
        assert!(!verify_password("12345679", &salt, &hash));
    }

    #[test]
    fn malformed_stored_hashes_never_verify() {
        let salt = generate_salt();
        assert!(!verify_password("secret", &salt, "not-hex"));
        assert!(!verify_password("secret", &salt, ""));
        assert_eq!(hash_password("secret", &salt).len(), 64);
    }

    #[test]
    fn salt_changes_the_hash() {
        assert_ne!(hash_password("secret", "a"), hash_password("secret", "b"));
    }

    #[test]
    fn tokens_are_unique_and_hashed_deterministically() {
        let a = new_session_token();
        let b = new_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }
}
