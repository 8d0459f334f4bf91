//! Password hashing for staff accounts
//!
//! Argon2id with the engine's standard parameters. Hashing and verification
//! are CPU bound, so both run on the blocking thread pool.

use crate::error::{BillingError, BillingResult};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

/// Argon2id memory cost in KiB
const MEMORY_COST_KIB: u32 = 19456;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new() -> BillingResult<Self> {
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(OUTPUT_LEN))
            .map_err(|e| BillingError::Internal(format!("Failed to build Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password into a PHC string
    pub async fn hash_password(&self, password: &str) -> BillingResult<String> {
        let password = password.to_string();
        let argon2 = self.argon2.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| BillingError::Internal(format!("Failed to hash password: {}", e)))
        })
        .await
        .map_err(|e| BillingError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Check a password against a stored PHC string in constant time
    pub async fn verify_password(&self, password: &str, hash: &str) -> BillingResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let argon2 = self.argon2.clone();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| BillingError::Internal(format!("Stored password hash is invalid: {}", e)))?;

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(BillingError::Internal(format!("Password verification error: {}", e))),
            }
        })
        .await
        .map_err(|e| BillingError::Internal(format!("Password verification task failed: {}", e)))?
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("algorithm", &"argon2id")
            .finish()
    }
}
