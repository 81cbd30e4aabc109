//! Driving port for submitting swap ratings.

use async_trait::async_trait;

use crate::domain::rating::{RatingComment, RatingScore, RatingView, SubScores};
use crate::domain::swap::SwapId;
use crate::domain::{Error, UserId};

/// Validated inputs for rating a completed swap.
#[derive(Debug, Clone)]
pub struct SubmitRatingRequest {
    /// Swap being rated.
    pub swap_id: SwapId,
    /// Participant leaving the rating.
    pub rater_id: UserId,
    /// Overall score.
    pub score: RatingScore,
    /// Optional free-text comment.
    pub comment: Option<RatingComment>,
    /// Optional per-aspect scores.
    pub sub_scores: SubScores,
    /// Whether the rater would trade with this member again.
    pub would_recommend: bool,
}

/// Driving port for rating commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingCommand: Send + Sync {
    /// Rate the counterpart on a completed swap.
    ///
    /// The rater must be a participant, the swap must be completed, and each
    /// participant may rate a swap once.
    async fn submit(&self, request: SubmitRatingRequest) -> Result<RatingView, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRatingCommand;

#[async_trait]
impl RatingCommand for FixtureRatingCommand {
    async fn submit(&self, request: SubmitRatingRequest) -> Result<RatingView, Error> {
        Err(Error::not_found(format!(
            "swap request {} not found",
            request.swap_id
        )))
    }
}
