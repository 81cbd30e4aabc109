//! Driving port for member directory mutations.
//!
//! Registration, profile edits, password changes and account deactivation
//! enter the domain through this port.

use async_trait::async_trait;
use chrono::DateTime;

use crate::domain::auth::{NewPassword, PasswordChange};
use crate::domain::user::{
    AccountView, CredentialHash, DisplayName, EmailAddress, NewUser, ProfileChanges, User,
};
use crate::domain::{Error, UserId};

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct RegisterMemberRequest {
    /// Public display name.
    pub display_name: DisplayName,
    /// Normalised login email.
    pub email: EmailAddress,
    /// Plaintext password, hashed before storage.
    pub password: NewPassword,
}

/// Driving port for member directory write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryCommand: Send + Sync {
    /// Register a new member and return their account view.
    ///
    /// Fails with conflict when the email address is already registered.
    async fn register(&self, request: RegisterMemberRequest) -> Result<AccountView, Error>;

    /// Apply partial profile changes and return the updated account view.
    ///
    /// `user_id` names the session account; a stale session over a removed
    /// or deactivated account is unauthorized rather than not found.
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<AccountView, Error>;

    /// Replace the member's credential after verifying the current one.
    async fn change_password(&self, user_id: UserId, change: PasswordChange)
        -> Result<(), Error>;

    /// Soft-delete the account; the record stays for history.
    async fn deactivate(&self, user_id: UserId) -> Result<(), Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDirectoryCommand;

#[async_trait]
impl DirectoryCommand for FixtureDirectoryCommand {
    async fn register(&self, request: RegisterMemberRequest) -> Result<AccountView, Error> {
        let credential = CredentialHash::new(format!("plain${}", request.password.as_str()))
            .map_err(|err| Error::internal(format!("invalid fixture credential: {err}")))?;
        let user = User::new(NewUser {
            id: UserId::random(),
            display_name: request.display_name,
            email: request.email,
            credential,
            now: DateTime::UNIX_EPOCH,
        });
        Ok(user.account_view())
    }

    async fn update_profile(
        &self,
        _user_id: UserId,
        _changes: ProfileChanges,
    ) -> Result<AccountView, Error> {
        Err(Error::unauthorized("account not found"))
    }

    async fn change_password(
        &self,
        _user_id: UserId,
        _change: PasswordChange,
    ) -> Result<(), Error> {
        Ok(())
    }

    async fn deactivate(&self, _user_id: UserId) -> Result<(), Error> {
        Ok(())
    }
}
