use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash};

#[derive(Debug, Clone)]
pub struct Argon2Hash(Argon2<'static>);

/// Checks logins against the single configured operator.
#[derive(Clone)]
pub struct AuthService {
    hasher: Arc<Argon2Hash>,
    username: String,
    password_hash: String,
}

impl AuthService {
    pub fn new(username: &str, password: &str) -> Result<Self, password_hash::Error> {
        let hasher = Argon2Hash(Argon2::default());
        let password_hash = Self::hash_with(&hasher, password)?;

        Ok(Self {
            hasher: Arc::new(hasher),
            username: username.to_string(),
            password_hash,
        })
    }

    fn hash_with(hasher: &Argon2Hash, password: &str) -> Result<String, password_hash::Error> {
        let hash_salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = hasher.0.hash_password(password.as_ref(), &hash_salt)?;

        Ok(hash.to_string())
    }

    pub fn hash(&self, password: &str) -> Result<String, password_hash::Error> {
        Self::hash_with(&self.hasher, password)
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<bool, password_hash::Error> {
        if username != self.username {
            return Ok(false);
        }

        let parsed_hash = PasswordHash::new(&self.password_hash)?;

        Ok(self
            .hasher
            .0
            .verify_password(password.as_ref(), &parsed_hash)
            .is_ok())
    }
}
