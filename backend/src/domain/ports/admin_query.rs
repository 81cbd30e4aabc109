//! Driving port for admin reads: dashboard, listings, and reports.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::user_repository::AdminUserFilter;
use crate::domain::rating::RatingView;
use crate::domain::reporting::{ActivityReport, DashboardSnapshot, ReportKind, ReportWindow};
use crate::domain::swap::{SwapStatus, SwapView};
use crate::domain::user::AccountView;
use crate::domain::{Error, UserId};

/// Driving port for admin read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminQuery: Send + Sync {
    /// Assemble the dashboard snapshot.
    async fn dashboard(&self, actor: UserId) -> Result<DashboardSnapshot, Error>;

    /// List member accounts, newest first.
    async fn list_users(
        &self,
        actor: UserId,
        filter: AdminUserFilter,
        page: PageRequest,
    ) -> Result<Page<AccountView>, Error>;

    /// List swap requests across all members, newest first.
    async fn list_swaps(
        &self,
        actor: UserId,
        status: Option<SwapStatus>,
        page: PageRequest,
    ) -> Result<Page<SwapView>, Error>;

    /// List ratings across all members, newest first.
    async fn list_ratings(
        &self,
        actor: UserId,
        flagged: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<RatingView>, Error>;

    /// Assemble the activity report for the given window.
    async fn activity_report(
        &self,
        actor: UserId,
        window: ReportWindow,
        kind: ReportKind,
    ) -> Result<ActivityReport, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
///
/// The fixture world has no admin accounts, so every call is forbidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdminQuery;

impl FixtureAdminQuery {
    fn forbidden() -> Error {
        Error::forbidden("administrator access required")
    }
}

#[async_trait]
impl AdminQuery for FixtureAdminQuery {
    async fn dashboard(&self, _actor: UserId) -> Result<DashboardSnapshot, Error> {
        Err(Self::forbidden())
    }

    async fn list_users(
        &self,
        _actor: UserId,
        _filter: AdminUserFilter,
        _page: PageRequest,
    ) -> Result<Page<AccountView>, Error> {
        Err(Self::forbidden())
    }

    async fn list_swaps(
        &self,
        _actor: UserId,
        _status: Option<SwapStatus>,
        _page: PageRequest,
    ) -> Result<Page<SwapView>, Error> {
        Err(Self::forbidden())
    }

    async fn list_ratings(
        &self,
        _actor: UserId,
        _flagged: Option<bool>,
        _page: PageRequest,
    ) -> Result<Page<RatingView>, Error> {
        Err(Self::forbidden())
    }

    async fn activity_report(
        &self,
        _actor: UserId,
        _window: ReportWindow,
        _kind: ReportKind,
    ) -> Result<ActivityReport, Error> {
        Err(Self::forbidden())
    }
}
