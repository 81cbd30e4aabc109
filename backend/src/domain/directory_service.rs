//! Member directory domain services.
//!
//! These services implement the directory driving ports for registration,
//! profile upkeep, credential checks, and directory reads.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};

use crate::domain::auth::PasswordChange;
use crate::domain::ports::{
    CredentialHasher, CredentialHasherError, DirectoryCommand, DirectoryFilter, DirectoryQuery,
    GetProfileResponse, LoginService, RatingRepository, RatingRepositoryError,
    RegisterMemberRequest, UserRepository, UserRepositoryError,
};
use crate::domain::user::{AccountView, NewUser, ProfileChanges, PublicProfile};
use crate::domain::{Error, LoginCredentials, User, UserId};

/// Number of recent ratings embedded in a profile response.
pub const PROFILE_RECENT_RATINGS: u32 = 5;

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

fn map_rating_repository_error(error: RatingRepositoryError) -> Error {
    match error {
        RatingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rating repository unavailable: {message}"))
        }
        RatingRepositoryError::Query { message } => {
            Error::internal(format!("rating repository error: {message}"))
        }
        // Reads never collide; surface an unexpected duplicate loudly.
        RatingRepositoryError::DuplicateRating { .. } => Error::internal(error.to_string()),
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Load the session account, rejecting stale sessions.
///
/// A session may outlive its account; report that as an authentication
/// failure rather than a missing resource.
async fn load_session_account<R>(user_repo: &R, user_id: UserId) -> Result<User, Error>
where
    R: UserRepository,
{
    let member = user_repo
        .find_by_id(user_id)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::unauthorized("account not found"))?;
    if !member.is_active() {
        return Err(Error::unauthorized("account deactivated"));
    }
    Ok(member)
}

/// Directory service implementing the command driving port and login checks.
#[derive(Clone)]
pub struct DirectoryCommandService<R, H> {
    user_repo: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> DirectoryCommandService<R, H> {
    /// Create a new command service with the user repository and hasher.
    pub fn new(user_repo: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            hasher,
            clock,
        }
    }
}

#[async_trait]
impl<R, H> DirectoryCommand for DirectoryCommandService<R, H>
where
    R: UserRepository,
    H: CredentialHasher,
{
    async fn register(&self, request: RegisterMemberRequest) -> Result<AccountView, Error> {
        let credential = self
            .hasher
            .hash_password(request.password.as_str())
            .map_err(map_hasher_error)?;

        let user = User::new(NewUser {
            id: UserId::random(),
            display_name: request.display_name,
            email: request.email,
            credential,
            now: self.clock.utc(),
        });

        // The unique index on email decides the race, not a pre-check.
        self.user_repo
            .save(&user)
            .await
            .map_err(map_user_repository_error)?;

        Ok(user.account_view())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<AccountView, Error> {
        let member = load_session_account(self.user_repo.as_ref(), user_id).await?;
        let updated = member.with_profile(changes, self.clock.utc());

        self.user_repo
            .update(&updated)
            .await
            .map_err(map_user_repository_error)?;

        Ok(updated.account_view())
    }

    async fn change_password(
        &self,
        user_id: UserId,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let member = load_session_account(self.user_repo.as_ref(), user_id).await?;

        let matches = self
            .hasher
            .verify_password(change.current(), member.credential())
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::invalid_request("current password is incorrect"));
        }

        let credential = self
            .hasher
            .hash_password(change.replacement().as_str())
            .map_err(map_hasher_error)?;
        let updated = member.with_credential(credential, self.clock.utc());

        self.user_repo
            .update(&updated)
            .await
            .map_err(map_user_repository_error)
    }

    async fn deactivate(&self, user_id: UserId) -> Result<(), Error> {
        let member = load_session_account(self.user_repo.as_ref(), user_id).await?;
        let updated = member.with_active(false, self.clock.utc());

        self.user_repo
            .update(&updated)
            .await
            .map_err(map_user_repository_error)
    }
}

#[async_trait]
impl<R, H> LoginService for DirectoryCommandService<R, H>
where
    R: UserRepository,
    H: CredentialHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let invalid = || Error::unauthorized("invalid credentials");

        let member = self
            .user_repo
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(invalid)?;

        let matches = self
            .hasher
            .verify_password(credentials.password(), member.credential())
            .map_err(map_hasher_error)?;
        if !matches || !member.is_active() {
            return Err(invalid());
        }

        Ok(member.id())
    }
}

/// Directory service implementing the query driving port.
#[derive(Clone)]
pub struct DirectoryQueryService<R, RR> {
    user_repo: Arc<R>,
    rating_repo: Arc<RR>,
}

impl<R, RR> DirectoryQueryService<R, RR> {
    /// Create a new query service with the user and rating repositories.
    pub fn new(user_repo: Arc<R>, rating_repo: Arc<RR>) -> Self {
        Self {
            user_repo,
            rating_repo,
        }
    }
}

#[async_trait]
impl<R, RR> DirectoryQuery for DirectoryQueryService<R, RR>
where
    R: UserRepository,
    RR: RatingRepository,
{
    async fn search(
        &self,
        filter: DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<PublicProfile>, Error> {
        let members = self
            .user_repo
            .search_directory(&filter, page)
            .await
            .map_err(map_user_repository_error)?;

        Ok(members.map(|member| member.public_profile()))
    }

    async fn profile(&self, user_id: UserId, viewer: UserId) -> Result<GetProfileResponse, Error> {
        let member = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("member {user_id} not found")))?;

        if !member.is_public() && member.id() != viewer {
            // Moderators review private profiles without owning them.
            let viewing = self
                .user_repo
                .find_by_id(viewer)
                .await
                .map_err(map_user_repository_error)?;
            if !viewing.is_some_and(|account| account.role().is_admin()) {
                return Err(Error::forbidden("this profile is private"));
            }
        }

        let recent_ratings = self
            .rating_repo
            .recent_received(user_id, PROFILE_RECENT_RATINGS)
            .await
            .map_err(map_rating_repository_error)?
            .iter()
            .map(|rating| rating.view())
            .collect();

        Ok(GetProfileResponse {
            profile: member.public_profile(),
            recent_ratings,
        })
    }

    async fn account(&self, user_id: UserId) -> Result<AccountView, Error> {
        let member = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("account not found"))?;

        Ok(member.account_view())
    }
}

#[cfg(test)]
#[path = "directory_service_tests.rs"]
mod tests;
