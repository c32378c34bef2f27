use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use thiserror::Error;

/// Number of random characters in an issued auth token
const TOKEN_LENGTH: usize = 40;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    HashFailure(String),
    #[error("stored password hash was malformed: {0}")]
    MalformedHash(String),
}

/// Hashes a password with Argon2id, producing a PHC-format string containing
/// the salt and parameters alongside the hash
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordError::HashFailure(err.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC-format hash. A wrong password is
/// `Ok(false)`, not an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|err| PasswordError::MalformedHash(err.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordError::MalformedHash(err.to_string())),
    }
}

/// Generates an opaque session token (40 alphanumeric characters)
pub fn generate_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
