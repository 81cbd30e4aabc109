//! Port abstraction for password hashing and verification.
//!
//! Keeping the scheme behind a port lets the directory service stay ignorant
//! of salts and digest formats, and lets tests substitute a transparent
//! implementation.

use thiserror::Error;

use crate::domain::user::CredentialHash;

/// Failures raised by credential hasher adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialHasherError {
    /// The password could not be hashed.
    #[error("credential hashing failed: {message}")]
    Hash {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The stored hash could not be checked against the password.
    #[error("credential verification failed: {message}")]
    Verify {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl CredentialHasherError {
    /// Build a `Hash` error from any displayable message.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }

    /// Build a `Verify` error from any displayable message.
    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify {
            message: message.into(),
        }
    }
}

/// Driven port for password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Derive a storable hash from a plaintext password.
    fn hash_password(&self, password: &str) -> Result<CredentialHash, CredentialHasherError>;

    /// Check a plaintext password against a stored hash.
    fn verify_password(
        &self,
        password: &str,
        stored: &CredentialHash,
    ) -> Result<bool, CredentialHasherError>;
}

/// Transparent hasher for tests; never use outside test wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

impl CredentialHasher for FixtureCredentialHasher {
    fn hash_password(&self, password: &str) -> Result<CredentialHash, CredentialHasherError> {
        CredentialHash::new(format!("plain${password}"))
            .map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify_password(
        &self,
        password: &str,
        stored: &CredentialHash,
    ) -> Result<bool, CredentialHasherError> {
        Ok(stored.as_str() == format!("plain${password}"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn fixture_hasher_round_trips_passwords() {
        let hasher = FixtureCredentialHasher;

        let hash = hasher.hash_password("open sesame").expect("fixture hash");

        assert!(
            hasher
                .verify_password("open sesame", &hash)
                .expect("fixture verify")
        );
        assert!(
            !hasher
                .verify_password("wrong password", &hash)
                .expect("fixture verify")
        );
    }

    #[rstest]
    fn fixture_hasher_marks_stored_credentials() {
        let hasher = FixtureCredentialHasher;

        let hash = hasher.hash_password("open sesame").expect("fixture hash");

        assert_eq!(hash.as_str(), "plain$open sesame");
    }

    #[rstest]
    #[case(
        CredentialHasherError::hash("digest failure"),
        "credential hashing failed: digest failure"
    )]
    #[case(
        CredentialHasherError::verify("malformed stored hash"),
        "credential verification failed: malformed stored hash"
    )]
    fn errors_format_messages(#[case] error: CredentialHasherError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
