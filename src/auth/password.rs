//! Password hashing and verification
//!
//! Thin wrappers around bcrypt. The salt and cost factor are embedded in the
//! digest, so verification needs no side channel. Nothing in this module may
//! log its inputs.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(plaintext: &str) -> Result<String, BcryptError> {
    hash(plaintext, DEFAULT_COST)
}

/// Verify a plaintext password against a stored digest
///
/// Returns `false` for a mismatch or an unparseable digest; verification
/// itself never fails.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    verify(plaintext, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_never_the_plaintext() {
        let digest = hash_password("secret1").unwrap();
        assert_ne!(digest, "secret1");
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn test_verify_round_trip() {
        let digest = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &digest));
        assert!(!verify_password("secret2", &digest));
        assert!(!verify_password("", &digest));
    }

    #[test]
    fn test_fresh_salt_per_hash() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret1", &a));
        assert!(verify_password("secret1", &b));
    }

    #[test]
    fn test_garbage_digest_is_a_mismatch() {
        assert!(!verify_password("secret1", "not-a-bcrypt-digest"));
    }
}
