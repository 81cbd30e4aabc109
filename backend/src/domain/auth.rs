//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError};

/// Minimum permitted password length for new credentials.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Domain error returned when password values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    /// The current password was blank.
    EmptyCurrentPassword,
    /// The replacement password was shorter than the permitted minimum.
    TooShort {
        /// Minimum permitted length in characters.
        min: usize,
    },
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCurrentPassword => write!(f, "current password must not be empty"),
            Self::TooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for PasswordValidationError {}

/// Validated login credentials used by the login service.
///
/// ## Invariants
/// - `email` is trimmed, lowercased, and shape-validated.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// # Errors
    /// Returns a [`LoginValidationError`] for a malformed email or blank
    /// password.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = EmailAddress::new(email)
            .map_err(|_: UserValidationError| LoginValidationError::InvalidEmail)?;

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address suitable for user lookups.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A password accepted for storage, meeting the minimum length rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate and wrap a new password.
    ///
    /// # Errors
    /// Returns [`PasswordValidationError::TooShort`] when the input is
    /// shorter than [`PASSWORD_MIN`] characters.
    pub fn new(password: &str) -> Result<Self, PasswordValidationError> {
        if password.chars().count() < PASSWORD_MIN {
            return Err(PasswordValidationError::TooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Password string for hashing.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated inputs for a password change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    replacement: NewPassword,
}

impl PasswordChange {
    /// Construct a password change from raw current/replacement inputs.
    ///
    /// # Errors
    /// Returns a [`PasswordValidationError`] for a blank current password or
    /// an undersized replacement.
    pub fn try_from_parts(
        current: &str,
        replacement: &str,
    ) -> Result<Self, PasswordValidationError> {
        if current.is_empty() {
            return Err(PasswordValidationError::EmptyCurrentPassword);
        }
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            replacement: NewPassword::new(replacement)?,
        })
    }

    /// Current password for verification.
    #[must_use]
    pub fn current(&self) -> &str {
        self.current.as_str()
    }

    /// Replacement password for hashing.
    #[must_use]
    pub const fn replacement(&self) -> &NewPassword {
        &self.replacement
    }
}
