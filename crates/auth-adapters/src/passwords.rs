//! Argon2-based implementation of the `Passwords` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use domains::{AppError, Passwords, Result};

#[derive(Default)]
pub struct ArgonPasswords;

impl Passwords for ArgonPasswords {
    fn hash(&self, plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(AppError::internal)
    }

    /// Verifies a password against a stored PHC string.
    fn verify(&self, plain: &str, phc: &str) -> bool {
        let parsed = match PasswordHash::new(phc) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}
