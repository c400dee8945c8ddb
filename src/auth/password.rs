//! Password Hasher
//! Mission: Salted, deliberately slow password digests with bcrypt

use anyhow::{Context, Result};
use tracing::debug;

/// bcrypt hasher with a fixed work factor.
///
/// Every digest embeds its own salt and cost, so `verify` needs nothing but
/// the digest itself.
pub struct PasswordHasher {
    cost: u32,
    // Verified against when the account does not exist, so an unknown
    // username costs the same as a wrong password.
    dummy_digest: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self> {
        let dummy_digest =
            bcrypt::hash("timing-equalizer", cost).context("Failed to initialize hasher")?;
        Ok(Self { cost, dummy_digest })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password. Two calls with the same input never return the same digest.
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).context("Failed to hash password")
    }

    /// Check a password against a stored digest.
    ///
    /// A malformed digest is a mismatch, not an error.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match bcrypt::verify(password, digest) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "Stored password digest could not be parsed");
                false
            }
        }
    }

    /// Burn one verification's worth of work without a real digest.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(4).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = test_hasher();
        let digest = hasher.hash("password123").unwrap();

        assert!(hasher.verify("password123", &digest));
        assert!(!hasher.verify("password124", &digest));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = test_hasher();
        let a = hasher.hash("samepassword").unwrap();
        let b = hasher.hash("samepassword").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify("samepassword", &a));
        assert!(hasher.verify("samepassword", &b));
    }

    #[test]
    fn test_digest_never_contains_password() {
        let hasher = test_hasher();
        let digest = hasher.hash("plaintext-secret").unwrap();
        assert!(!digest.contains("plaintext-secret"));
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn test_malformed_digest_is_mismatch() {
        let hasher = test_hasher();
        assert!(!hasher.verify("password123", "hashedpassword"));
        assert!(!hasher.verify("password123", ""));
        assert!(!hasher.verify("password123", "$2b$04$tooshort"));
    }

    #[test]
    fn test_dummy_verify_does_not_panic() {
        let hasher = test_hasher();
        hasher.verify_dummy("anything");
        assert_eq!(hasher.cost(), 4);
    }
}
