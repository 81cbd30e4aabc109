//! Port abstraction for swap request persistence adapters and their errors.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use thiserror::Error;

use crate::domain::reporting::ReportWindow;
use crate::domain::swap::{SwapId, SwapRequest, SwapStatus};
use crate::domain::UserId;

/// Persistence errors raised by swap repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapRepositoryError {
    /// Repository connection could not be established.
    #[error("swap repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("swap repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure detail.
        message: String,
    },
}

impl SwapRepositoryError {
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
}

/// Which side of a swap request a member list should match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SwapRole {
    /// Requests the member sent.
    Sent,
    /// Requests the member received.
    Received,
    /// Requests where the member is on either side.
    #[default]
    Either,
}

/// Error for unrecognised swap role labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("swap role must be one of sent, received or either")]
pub struct ParseSwapRoleError;

impl fmt::Display for SwapRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sent => "sent",
            Self::Received => "received",
            Self::Either => "either",
        };
        f.write_str(label)
    }
}

impl FromStr for SwapRole {
    type Err = ParseSwapRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sent" => Ok(Self::Sent),
            "received" => Ok(Self::Received),
            "either" => Ok(Self::Either),
            _ => Err(ParseSwapRoleError),
        }
    }
}

/// Predicates for a member's swap request listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapListFilter {
    /// Which side of the request the member must be on.
    pub role: SwapRole,
    /// Restrict to a single lifecycle status.
    pub status: Option<SwapStatus>,
}

/// Per-status swap counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapTotals {
    /// All swap requests ever created.
    pub total: u64,
    /// Requests currently pending.
    pub pending: u64,
    /// Requests currently accepted.
    pub accepted: u64,
    /// Requests rejected by their recipient.
    pub rejected: u64,
    /// Requests completed by their participants.
    pub completed: u64,
    /// Requests cancelled by either side.
    pub cancelled: u64,
}

/// Driven port for swap request persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapRepository: Send + Sync {
    /// Insert a new swap request record.
    async fn save(&self, swap: &SwapRequest) -> Result<(), SwapRepositoryError>;

    /// Persist changes to an existing swap request record.
    async fn update(&self, swap: &SwapRequest) -> Result<(), SwapRepositoryError>;

    /// Fetch a swap request by identifier.
    async fn find_by_id(&self, id: SwapId) -> Result<Option<SwapRequest>, SwapRepositoryError>;

    /// Fetch the pending request between the pair, if one exists.
    async fn find_pending_between(
        &self,
        requester_id: UserId,
        recipient_id: UserId,
    ) -> Result<Option<SwapRequest>, SwapRepositoryError>;

    /// List a member's swap requests, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError>;

    /// List every swap request for moderation, newest first.
    async fn list_all(
        &self,
        status: Option<SwapStatus>,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError>;

    /// Count swap requests per lifecycle status.
    async fn totals(&self) -> Result<SwapTotals, SwapRepositoryError>;

    /// Fetch the most recently created swap requests, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<SwapRequest>, SwapRepositoryError>;

    /// Load per-request status and creation time inside the window for report
    /// bucketing.
    async fn status_timeline(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<(SwapStatus, DateTime<Utc>)>, SwapRepositoryError>;
}

/// Fixture repository for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSwapRepository;

#[async_trait]
impl SwapRepository for FixtureSwapRepository {
    async fn save(&self, _swap: &SwapRequest) -> Result<(), SwapRepositoryError> {
        Ok(())
    }

    async fn update(&self, _swap: &SwapRequest) -> Result<(), SwapRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: SwapId) -> Result<Option<SwapRequest>, SwapRepositoryError> {
        Ok(None)
    }

    async fn find_pending_between(
        &self,
        _requester_id: UserId,
        _recipient_id: UserId,
    ) -> Result<Option<SwapRequest>, SwapRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: UserId,
        _filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn list_all(
        &self,
        _status: Option<SwapStatus>,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn totals(&self) -> Result<SwapTotals, SwapRepositoryError> {
        Ok(SwapTotals::default())
    }

    async fn recent(&self, _limit: u32) -> Result<Vec<SwapRequest>, SwapRepositoryError> {
        Ok(Vec::new())
    }

    async fn status_timeline(
        &self,
        _window: ReportWindow,
    ) -> Result<Vec<(SwapStatus, DateTime<Utc>)>, SwapRepositoryError> {
        Ok(Vec::new())
    }
}
