//! Admin moderation and reporting domain services.
//!
//! Every operation resolves the acting account and requires the admin role
//! before touching anything else.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    AdminCommand, AdminQuery, AdminUserFilter, BroadcastRequest, RatingRepository,
    RatingRepositoryError, SetRatingFlagRequest, SetUserStatusRequest, SwapRepository,
    SwapRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::rating::RatingView;
use crate::domain::reporting::{
    ActivityReport, BroadcastReceipt, DASHBOARD_RECENT_LIMIT, DashboardSnapshot, DashboardStats,
    RecentUser, ReportKind, ReportWindow, fold_day_buckets, fold_month_buckets,
    fold_score_month_buckets, fold_status_month_buckets, one_decimal_average,
};
use crate::domain::swap::{SwapStatus, SwapView};
use crate::domain::user::AccountView;
use crate::domain::{Error, UserId};

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

fn map_swap_repository_error(error: SwapRepositoryError) -> Error {
    match error {
        SwapRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("swap repository unavailable: {message}"))
        }
        SwapRepositoryError::Query { message } => {
            Error::internal(format!("swap repository error: {message}"))
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
        // Moderation never inserts ratings.
        RatingRepositoryError::DuplicateRating { .. } => Error::internal(error.to_string()),
    }
}

/// Resolve the acting session account and require the admin role.
///
/// Stale sessions are an authentication failure; a live session without the
/// admin role is an authorisation failure.
async fn require_admin<R>(user_repo: &R, actor: UserId) -> Result<(), Error>
where
    R: UserRepository,
{
    let member = user_repo
        .find_by_id(actor)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::unauthorized("account not found"))?;
    if !member.is_active() {
        return Err(Error::unauthorized("account deactivated"));
    }
    if !member.role().is_admin() {
        return Err(Error::forbidden("administrator access required"));
    }
    Ok(())
}

/// Moderation service implementing the admin command driving port.
#[derive(Clone)]
pub struct AdminCommandService<U, R> {
    user_repo: Arc<U>,
    rating_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, R> AdminCommandService<U, R> {
    /// Create a new moderation service over the given adapters.
    pub fn new(user_repo: Arc<U>, rating_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            rating_repo,
            clock,
        }
    }
}

#[async_trait]
impl<U, R> AdminCommand for AdminCommandService<U, R>
where
    U: UserRepository,
    R: RatingRepository,
{
    async fn set_user_active(&self, request: SetUserStatusRequest) -> Result<AccountView, Error> {
        require_admin(self.user_repo.as_ref(), request.actor).await?;
        if request.actor == request.user_id {
            return Err(Error::invalid_request(
                "cannot change your own account status",
            ));
        }
        let member = self
            .user_repo
            .find_by_id(request.user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("member {} not found", request.user_id)))?;
        let changed = member.with_active(request.active, self.clock.utc());
        self.user_repo
            .update(&changed)
            .await
            .map_err(map_user_repository_error)?;
        Ok(changed.account_view())
    }

    async fn set_rating_flag(&self, request: SetRatingFlagRequest) -> Result<RatingView, Error> {
        require_admin(self.user_repo.as_ref(), request.actor).await?;
        let rating = self
            .rating_repo
            .find_by_id(request.rating_id)
            .await
            .map_err(map_rating_repository_error)?
            .ok_or_else(|| Error::not_found(format!("rating {} not found", request.rating_id)))?;
        let moderated = rating.with_flag(request.flagged, request.reason);
        self.rating_repo
            .update(&moderated)
            .await
            .map_err(map_rating_repository_error)?;
        Ok(moderated.view())
    }

    async fn broadcast(&self, request: BroadcastRequest) -> Result<BroadcastReceipt, Error> {
        require_admin(self.user_repo.as_ref(), request.actor).await?;
        let receipt = request.draft.into_receipt(request.actor, self.clock.utc());
        tracing::info!(
            title = receipt.title.as_str(),
            kind = receipt.kind.as_str(),
            sent_by = %receipt.sent_by,
            "platform broadcast recorded"
        );
        Ok(receipt)
    }
}

/// Reporting service implementing the admin query driving port.
#[derive(Clone)]
pub struct AdminQueryService<U, S, R> {
    user_repo: Arc<U>,
    swap_repo: Arc<S>,
    rating_repo: Arc<R>,
}

impl<U, S, R> AdminQueryService<U, S, R> {
    /// Create a new reporting service over the given adapters.
    pub fn new(user_repo: Arc<U>, swap_repo: Arc<S>, rating_repo: Arc<R>) -> Self {
        Self {
            user_repo,
            swap_repo,
            rating_repo,
        }
    }
}

#[async_trait]
impl<U, S, R> AdminQuery for AdminQueryService<U, S, R>
where
    U: UserRepository,
    S: SwapRepository,
    R: RatingRepository,
{
    async fn dashboard(&self, actor: UserId) -> Result<DashboardSnapshot, Error> {
        require_admin(self.user_repo.as_ref(), actor).await?;
        let swap_totals = self
            .swap_repo
            .totals()
            .await
            .map_err(map_swap_repository_error)?;
        let rating_totals = self
            .rating_repo
            .totals()
            .await
            .map_err(map_rating_repository_error)?;
        let total_users = self
            .user_repo
            .count_active()
            .await
            .map_err(map_user_repository_error)?;

        let recent_users = self
            .user_repo
            .recent(DASHBOARD_RECENT_LIMIT)
            .await
            .map_err(map_user_repository_error)?
            .into_iter()
            .map(|member| RecentUser {
                id: member.id(),
                display_name: member.display_name().as_ref().to_owned(),
                email: member.email().as_ref().to_owned(),
                created_at: member.created_at(),
            })
            .collect();
        let recent_swaps = self
            .swap_repo
            .recent(DASHBOARD_RECENT_LIMIT)
            .await
            .map_err(map_swap_repository_error)?
            .iter()
            .map(|swap| swap.view())
            .collect();
        let monthly_swaps: Vec<_> = self
            .swap_repo
            .status_timeline(ReportWindow::default())
            .await
            .map_err(map_swap_repository_error)?
            .iter()
            .map(|(_, at)| *at)
            .collect();

        Ok(DashboardSnapshot {
            stats: DashboardStats {
                total_users,
                total_swaps: swap_totals.total,
                completed_swaps: swap_totals.completed,
                pending_swaps: swap_totals.pending,
                total_ratings: rating_totals.count,
                average_rating: one_decimal_average(rating_totals.score_sum, rating_totals.count),
            },
            recent_users,
            recent_swaps,
            monthly_swaps: fold_month_buckets(&monthly_swaps),
        })
    }

    async fn list_users(
        &self,
        actor: UserId,
        filter: AdminUserFilter,
        page: PageRequest,
    ) -> Result<Page<AccountView>, Error> {
        require_admin(self.user_repo.as_ref(), actor).await?;
        let accounts = self
            .user_repo
            .search_accounts(&filter, page)
            .await
            .map_err(map_user_repository_error)?;
        Ok(accounts.map(|member| member.account_view()))
    }

    async fn list_swaps(
        &self,
        actor: UserId,
        status: Option<SwapStatus>,
        page: PageRequest,
    ) -> Result<Page<SwapView>, Error> {
        require_admin(self.user_repo.as_ref(), actor).await?;
        let swaps = self
            .swap_repo
            .list_all(status, page)
            .await
            .map_err(map_swap_repository_error)?;
        Ok(swaps.map(|swap| swap.view()))
    }

    async fn list_ratings(
        &self,
        actor: UserId,
        flagged: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<RatingView>, Error> {
        require_admin(self.user_repo.as_ref(), actor).await?;
        let ratings = self
            .rating_repo
            .list_all(flagged, page)
            .await
            .map_err(map_rating_repository_error)?;
        Ok(ratings.map(|rating| rating.view()))
    }

    async fn activity_report(
        &self,
        actor: UserId,
        window: ReportWindow,
        kind: ReportKind,
    ) -> Result<ActivityReport, Error> {
        require_admin(self.user_repo.as_ref(), actor).await?;
        let mut report = ActivityReport::default();
        if kind.includes_users() {
            let registrations = self
                .user_repo
                .created_timestamps(window)
                .await
                .map_err(map_user_repository_error)?;
            report.user_activity = Some(fold_day_buckets(&registrations));
        }
        if kind.includes_swaps() {
            let timeline = self
                .swap_repo
                .status_timeline(window)
                .await
                .map_err(map_swap_repository_error)?;
            report.swap_activity = Some(fold_status_month_buckets(&timeline));
        }
        if kind.includes_ratings() {
            let scores: Vec<_> = self
                .rating_repo
                .score_timeline(window)
                .await
                .map_err(map_rating_repository_error)?
                .iter()
                .map(|(score, at)| (score.value(), *at))
                .collect();
            report.rating_activity = Some(fold_score_month_buckets(&scores));
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "admin_service_tests.rs"]
mod tests;
