//! Credential hashing adapter.
//!
//! Stores credentials as `salt$digest` where both halves are lowercase hex:
//! a fresh 16-byte random salt and the SHA-256 digest of salt bytes followed
//! by the password bytes. Verification recomputes the digest with the stored
//! salt.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::ports::{CredentialHasher, CredentialHasherError};
use crate::domain::user::CredentialHash;

const SALT_LEN: usize = 16;

/// Salted SHA-256 implementation of the credential hasher port.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaltedSha256CredentialHasher;

impl SaltedSha256CredentialHasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn digest_hex(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl CredentialHasher for SaltedSha256CredentialHasher {
    fn hash_password(&self, password: &str) -> Result<CredentialHash, CredentialHasherError> {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let stored = format!("{}${}", hex::encode(salt), digest_hex(&salt, password));
        CredentialHash::new(stored).map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify_password(
        &self,
        password: &str,
        stored: &CredentialHash,
    ) -> Result<bool, CredentialHasherError> {
        let (salt_hex, digest) = stored
            .as_str()
            .split_once('$')
            .ok_or_else(|| CredentialHasherError::verify("stored hash has no salt"))?;
        let salt = hex::decode(salt_hex)
            .map_err(|err| CredentialHasherError::verify(format!("malformed salt: {err}")))?;

        Ok(digest_hex(&salt, password) == digest)
    }
}
