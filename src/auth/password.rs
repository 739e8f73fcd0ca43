use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// True when the stored value is a bcrypt hash rather than a legacy plaintext password.
pub fn is_bcrypt_hash(stored: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix))
}

/// Hashes on the blocking pool; bcrypt is CPU-bound.
pub async fn hash_password(plain: &str, cost: u32) -> Result<String, PasswordError> {
    let plain = plain.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hash)
}

/// Checks a login attempt against the stored value.
///
/// Legacy rows hold the plaintext password and only match the exact string.
pub async fn verify_password(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    if !is_bcrypt_hash(stored) {
        return Ok(plain == stored);
    }

    let plain = plain.to_string();
    let stored = stored.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &stored)).await??;
    Ok(verified)
}
