//! Port abstraction for member persistence adapters and their errors.
//!
//! The directory owns registration, profile reads and the aggregate counts
//! behind the admin dashboard, so this port carries both record-level
//! operations and the narrow count/timeline queries those reports need.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use thiserror::Error;

use crate::domain::reporting::ReportWindow;
use crate::domain::user::AvailabilityTag;
use crate::domain::{EmailAddress, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Another member already registered the email address.
    #[error("email {email} is already registered")]
    DuplicateEmail {
        /// Normalised address that collided.
        email: String,
    },
}

impl UserRepositoryError {
    /// Build a `Connection` error from any displayable message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a `Query` error from any displayable message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a `DuplicateEmail` error for the colliding address.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Predicates for the public member directory search.
///
/// Every predicate is optional; adapters combine the present ones with AND
/// and always restrict results to active, public profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
    /// Case-insensitive free text matched against display names and skill
    /// names (offered or wanted).
    pub text: Option<String>,
    /// Case-insensitive substring matched against skill names only.
    pub skill: Option<String>,
    /// Case-insensitive substring matched against the location field.
    pub location: Option<String>,
    /// Members must list this availability tag.
    pub availability: Option<AvailabilityTag>,
}

/// Predicates for the admin account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUserFilter {
    /// Case-insensitive substring matched against display name or email.
    pub search: Option<String>,
    /// Restrict to active (`true`) or deactivated (`false`) accounts.
    pub active: Option<bool>,
}

/// Driven port for member persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new member record.
    ///
    /// Returns `DuplicateEmail` when the email address is already taken.
    async fn save(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Persist changes to an existing member record.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a member by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a member by normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Search active public members, newest first.
    async fn search_directory(
        &self,
        filter: &DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError>;

    /// List accounts for moderation, newest first, regardless of visibility.
    async fn search_accounts(
        &self,
        filter: &AdminUserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError>;

    /// Count active accounts.
    async fn count_active(&self) -> Result<u64, UserRepositoryError>;

    /// Fetch the most recently registered members, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError>;

    /// Load registration timestamps inside the window for report bucketing.
    async fn created_timestamps(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<DateTime<Utc>>, UserRepositoryError>;
}

/// Fixture repository for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn save(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn update(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn search_directory(
        &self,
        _filter: &DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn search_accounts(
        &self,
        _filter: &AdminUserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn count_active(&self) -> Result<u64, UserRepositoryError> {
        Ok(0)
    }

    async fn recent(&self, _limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        Ok(Vec::new())
    }

    async fn created_timestamps(
        &self,
        _window: ReportWindow,
    ) -> Result<Vec<DateTime<Utc>>, UserRepositoryError> {
        Ok(Vec::new())
    }
}
