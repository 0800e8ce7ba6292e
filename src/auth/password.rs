//! Password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password into a PHC string. A fresh salt is drawn per call,
/// so hashing the same input twice yields different strings.
pub fn hash(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hashed)
}

/// Verify a plaintext password against a stored PHC string. A stored value that
/// does not parse counts as a mismatch, not a distinct error.
pub fn verify(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Burn one verification against a throwaway hash. Login calls this when the
/// email does not resolve, so the unknown-account path costs as much as a
/// wrong-password one.
pub fn verify_dummy(plain: &str) {
    static DUMMY: OnceLock<String> = OnceLock::new();
    let stored = DUMMY.get_or_init(|| hash("cuenta-inexistente").unwrap_or_default());
    let _ = verify(plain, stored);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let hashed = hash("clave-segura-123").unwrap();
        assert!(verify("clave-segura-123", &hashed));
        assert!(!verify("clave-equivocada", &hashed));
    }

    #[test]
    fn salts_differ_between_calls() {
        let first = hash("clave-segura-123").unwrap();
        let second = hash("clave-segura-123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        assert!(!verify("clave-segura-123", "no-es-un-hash"));
        assert!(!verify("clave-segura-123", ""));
    }
}
