//! Password hashing for dashboard accounts

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password with bcrypt at the default cost factor.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Check a candidate password against a stored bcrypt hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, stored_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects() {
        let hashed = hash_password("correct horse battery staple").unwrap();
        assert_ne!(hashed, "correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hashed).unwrap());
        assert!(!verify_password("incorrect horse", &hashed).unwrap());
    }
}
