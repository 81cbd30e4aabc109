//! Port abstraction for rating persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use thiserror::Error;

use crate::domain::rating::{Rating, RatingId, RatingScore};
use crate::domain::reporting::ReportWindow;
use crate::domain::swap::SwapId;
use crate::domain::UserId;

/// Persistence errors raised by rating repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingRepositoryError {
    /// Repository connection could not be established.
    #[error("rating repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("rating repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure detail.
        message: String,
    },
    /// The rater already left a rating for this swap.
    #[error("swap request {swap_id} was already rated by this member")]
    DuplicateRating {
        /// Swap the second submission referred to.
        swap_id: SwapId,
    },
}

impl RatingRepositoryError {
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

    /// Build a `DuplicateRating` error for the swap that was rated twice.
    pub const fn duplicate_rating(swap_id: SwapId) -> Self {
        Self::DuplicateRating { swap_id }
    }
}

/// Overall rating volume for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTotals {
    /// Number of ratings ever submitted.
    pub count: u64,
    /// Sum of every overall score, for computing the platform average.
    pub score_sum: u64,
}

/// Driven port for rating persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert a new rating record.
    ///
    /// Returns `DuplicateRating` when the (swap, rater) pair already exists.
    async fn save(&self, rating: &Rating) -> Result<(), RatingRepositoryError>;

    /// Persist changes to an existing rating record.
    async fn update(&self, rating: &Rating) -> Result<(), RatingRepositoryError>;

    /// Fetch a rating by identifier.
    async fn find_by_id(&self, id: RatingId) -> Result<Option<Rating>, RatingRepositoryError>;

    /// Fetch the rating a member left on a swap, if any.
    async fn find_for_swap_and_rater(
        &self,
        swap_id: SwapId,
        rater_id: UserId,
    ) -> Result<Option<Rating>, RatingRepositoryError>;

    /// Load every overall score referencing the member, for summary
    /// recomputation.
    async fn scores_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RatingScore>, RatingRepositoryError>;

    /// List ratings received by a member, newest first.
    async fn list_received(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError>;

    /// Fetch the most recent ratings received by a member, newest first.
    async fn recent_received(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Rating>, RatingRepositoryError>;

    /// List every rating for moderation, newest first.
    async fn list_all(
        &self,
        flagged: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError>;

    /// Count ratings and sum their scores.
    async fn totals(&self) -> Result<RatingTotals, RatingRepositoryError>;

    /// Load per-rating score and submission time inside the window for report
    /// bucketing.
    async fn score_timeline(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<(RatingScore, DateTime<Utc>)>, RatingRepositoryError>;
}

/// Fixture repository for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRatingRepository;

#[async_trait]
impl RatingRepository for FixtureRatingRepository {
    async fn save(&self, _rating: &Rating) -> Result<(), RatingRepositoryError> {
        Ok(())
    }

    async fn update(&self, _rating: &Rating) -> Result<(), RatingRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: RatingId) -> Result<Option<Rating>, RatingRepositoryError> {
        Ok(None)
    }

    async fn find_for_swap_and_rater(
        &self,
        _swap_id: SwapId,
        _rater_id: UserId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        Ok(None)
    }

    async fn scores_for_user(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<RatingScore>, RatingRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_received(
        &self,
        _user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn recent_received(
        &self,
        _user_id: UserId,
        _limit: u32,
    ) -> Result<Vec<Rating>, RatingRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_all(
        &self,
        _flagged: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn totals(&self) -> Result<RatingTotals, RatingRepositoryError> {
        Ok(RatingTotals::default())
    }

    async fn score_timeline(
        &self,
        _window: ReportWindow,
    ) -> Result<Vec<(RatingScore, DateTime<Utc>)>, RatingRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_repository_finds_nothing() {
        let repository = FixtureRatingRepository;

        let by_id = repository
            .find_by_id(RatingId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(by_id.is_none());

        let by_pair = repository
            .find_for_swap_and_rater(SwapId::random(), UserId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(by_pair.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_repository_reports_zero_volume() {
        let repository = FixtureRatingRepository;

        let totals = repository.totals().await.expect("fixture totals");
        assert_eq!(totals, RatingTotals::default());

        let scores = repository
            .scores_for_user(UserId::random())
            .await
            .expect("fixture scores");
        assert!(scores.is_empty());
    }

    #[rstest]
    #[case(
        RatingRepositoryError::connection("pool exhausted"),
        "rating repository connection failed: pool exhausted"
    )]
    #[case(
        RatingRepositoryError::query("relation missing"),
        "rating repository query failed: relation missing"
    )]
    fn errors_format_messages(#[case] error: RatingRepositoryError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn duplicate_rating_names_the_swap() {
        let swap_id = SwapId::random();
        let error = RatingRepositoryError::duplicate_rating(swap_id);
        assert_eq!(
            error.to_string(),
            format!("swap request {swap_id} was already rated by this member")
        );
    }
}
