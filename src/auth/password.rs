/// Password Hashing and Verification
///
/// bcrypt with a random salt per hash. The comparison inside `bcrypt::verify`
/// is constant-time.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::CredentialError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `HashingFailure` if bcrypt cannot salt or hash the input. Callers
/// must treat this as fatal and never fall back to storing the plaintext.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    hash(password, DEFAULT_COST).map_err(CredentialError::HashingFailure)
}

/// Verify a password against its hash
///
/// # Errors
/// - `CredentialMismatch` if the password does not match
/// - `MalformedHash` if `hash` is not a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<(), CredentialError> {
    match verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CredentialError::CredentialMismatch),
        Err(e) => Err(CredentialError::MalformedHash(e)),
    }
}
