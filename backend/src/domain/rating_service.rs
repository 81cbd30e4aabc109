//! Rating domain services.
//!
//! `RatingCommandService` validates submissions against the swap lifecycle
//! and keeps member rating summaries current; `RatingQueryService` serves
//! received-rating listings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    RatingCommand, RatingQuery, RatingRepository, RatingRepositoryError, SubmitRatingRequest,
    SwapRepository, SwapRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::rating::{NewRating, Rating, RatingId, RatingSummary, RatingView};
use crate::domain::swap::SwapStatus;
use crate::domain::{Error, User, UserId};

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
        // The unique index decides double-submission races.
        RatingRepositoryError::DuplicateRating { .. } => {
            Error::conflict("this swap has already been rated")
        }
    }
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

/// Recompute a member's rating summary from every score they received.
async fn refresh_rating_summary<U, R>(
    user_repo: &U,
    rating_repo: &R,
    member_id: UserId,
    now: DateTime<Utc>,
) -> Result<(), Error>
where
    U: UserRepository,
    R: RatingRepository,
{
    let scores = rating_repo
        .scores_for_user(member_id)
        .await
        .map_err(map_rating_repository_error)?;
    let member = user_repo
        .find_by_id(member_id)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::not_found(format!("member {member_id} not found")))?;
    user_repo
        .update(&member.with_rating(RatingSummary::from_scores(&scores), now))
        .await
        .map_err(map_user_repository_error)
}

/// Rating submission service implementing the command driving port.
#[derive(Clone)]
pub struct RatingCommandService<U, S, R> {
    user_repo: Arc<U>,
    swap_repo: Arc<S>,
    rating_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, S, R> RatingCommandService<U, S, R> {
    /// Create a new submission service over the given adapters.
    pub fn new(
        user_repo: Arc<U>,
        swap_repo: Arc<S>,
        rating_repo: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            swap_repo,
            rating_repo,
            clock,
        }
    }
}

#[async_trait]
impl<U, S, R> RatingCommand for RatingCommandService<U, S, R>
where
    U: UserRepository,
    S: SwapRepository,
    R: RatingRepository,
{
    async fn submit(&self, request: SubmitRatingRequest) -> Result<RatingView, Error> {
        load_session_account(self.user_repo.as_ref(), request.rater_id).await?;
        let swap = self
            .swap_repo
            .find_by_id(request.swap_id)
            .await
            .map_err(map_swap_repository_error)?
            .ok_or_else(|| Error::not_found(format!("swap request {} not found", request.swap_id)))?;
        let participant = swap
            .participant_of(request.rater_id)
            .ok_or_else(|| Error::forbidden("only a participant may rate this swap"))?;
        if swap.status() != SwapStatus::Completed {
            return Err(Error::conflict("only completed swaps can be rated"));
        }
        if self
            .rating_repo
            .find_for_swap_and_rater(request.swap_id, request.rater_id)
            .await
            .map_err(map_rating_repository_error)?
            .is_some()
        {
            return Err(Error::conflict("this swap has already been rated"));
        }

        let now = self.clock.utc();
        let rated_user_id = swap.id_of(participant.other());
        let rating = Rating::new(NewRating {
            id: RatingId::random(),
            swap_id: request.swap_id,
            rater_id: request.rater_id,
            rated_user_id,
            score: request.score,
            comment: request.comment,
            sub_scores: request.sub_scores,
            would_recommend: request.would_recommend,
            now,
        });
        self.rating_repo
            .save(&rating)
            .await
            .map_err(map_rating_repository_error)?;

        // The rating itself is the record of truth; the rated flag and the
        // member summary are derived data and may lag.
        if let Err(error) = self
            .swap_repo
            .update(&swap.mark_rated_by(participant, now))
            .await
            .map_err(map_swap_repository_error)
        {
            tracing::warn!(
                error = %error,
                swap_id = %request.swap_id,
                "failed to mark swap as rated"
            );
        }
        if let Err(error) = refresh_rating_summary(
            self.user_repo.as_ref(),
            self.rating_repo.as_ref(),
            rated_user_id,
            now,
        )
        .await
        {
            tracing::warn!(
                error = %error,
                member_id = %rated_user_id,
                "failed to refresh rating summary"
            );
        }
        Ok(rating.view())
    }
}

/// Read-side service implementing the rating query driving port.
#[derive(Clone)]
pub struct RatingQueryService<R> {
    rating_repo: Arc<R>,
}

impl<R> RatingQueryService<R> {
    /// Create a new query service over the rating repository.
    pub fn new(rating_repo: Arc<R>) -> Self {
        Self { rating_repo }
    }
}

#[async_trait]
impl<R> RatingQuery for RatingQueryService<R>
where
    R: RatingRepository,
{
    async fn list_received(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<RatingView>, Error> {
        let ratings = self
            .rating_repo
            .list_received(user_id, page)
            .await
            .map_err(map_rating_repository_error)?;
        Ok(ratings.map(|rating| rating.view()))
    }
}

#[cfg(test)]
#[path = "rating_service_tests.rs"]
mod tests;
