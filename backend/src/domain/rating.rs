//! Ratings left after completed swaps and the rolling summary they feed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::swap::SwapId;
use super::user::UserId;

/// Lowest permitted rating score.
pub const RATING_SCORE_MIN: u8 = 1;
/// Highest permitted rating score.
pub const RATING_SCORE_MAX: u8 = 5;
/// Maximum allowed length for a rating comment.
pub const RATING_COMMENT_MAX: usize = 500;
/// Maximum allowed length for a moderation flag reason.
pub const FLAG_REASON_MAX: usize = 500;

/// Validation errors returned by the rating constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingValidationError {
    /// The score fell outside the permitted range.
    ScoreOutOfRange {
        /// Lowest permitted score.
        min: u8,
        /// Highest permitted score.
        max: u8,
    },
    /// The comment exceeded the permitted length.
    CommentTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The flag reason exceeded the permitted length.
    FlagReasonTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
}

impl fmt::Display for RatingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScoreOutOfRange { min, max } => {
                write!(f, "score must be between {min} and {max}")
            }
            Self::CommentTooLong { max } => {
                write!(f, "comment must be at most {max} characters")
            }
            Self::FlagReasonTooLong { max } => {
                write!(f, "flag reason must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for RatingValidationError {}

/// Stable rating identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "9b2f0c9a-1d34-4a7e-8a3b-2f6f6a1f0c11")]
pub struct RatingId(Uuid);

impl RatingId {
    /// Generate a new random [`RatingId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct a [`RatingId`] directly from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RatingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RatingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single 1 to 5 rating score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u8", into = "u8")]
#[schema(value_type = u8, example = 4)]
pub struct RatingScore(u8);

impl RatingScore {
    /// Validate and construct a [`RatingScore`].
    ///
    /// # Errors
    /// Returns [`RatingValidationError::ScoreOutOfRange`] when the value is
    /// not within [`RATING_SCORE_MIN`] to [`RATING_SCORE_MAX`] inclusive.
    pub const fn new(score: u8) -> Result<Self, RatingValidationError> {
        if score < RATING_SCORE_MIN || score > RATING_SCORE_MAX {
            return Err(RatingValidationError::ScoreOutOfRange {
                min: RATING_SCORE_MIN,
                max: RATING_SCORE_MAX,
            });
        }
        Ok(Self(score))
    }

    /// The score value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<RatingScore> for u8 {
    fn from(value: RatingScore) -> Self {
        value.0
    }
}

impl TryFrom<u8> for RatingScore {
    type Error = RatingValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional per-aspect scores attached to a rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    /// How good the delivered skill was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<RatingScore>,
    /// How well the counterpart communicated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication: Option<RatingScore>,
    /// Whether the counterpart kept to agreed times.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punctuality: Option<RatingScore>,
    /// How helpful the counterpart was overall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpfulness: Option<RatingScore>,
}

impl SubScores {
    /// Whether no aspect score is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quality.is_none()
            && self.communication.is_none()
            && self.punctuality.is_none()
            && self.helpfulness.is_none()
    }
}

/// Free-text comment attached to a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RatingComment(String);

impl RatingComment {
    /// Validate and construct a [`RatingComment`] from owned input.
    ///
    /// # Errors
    /// Returns [`RatingValidationError::CommentTooLong`] when the trimmed
    /// input exceeds [`RATING_COMMENT_MAX`] characters. Blank input is
    /// permitted; callers normalise blanks to an absent comment.
    pub fn new(comment: impl Into<String>) -> Result<Self, RatingValidationError> {
        Self::from_owned(comment.into())
    }

    fn from_owned(input: String) -> Result<Self, RatingValidationError> {
        let comment = input.trim().to_owned();
        if comment.chars().count() > RATING_COMMENT_MAX {
            return Err(RatingValidationError::CommentTooLong {
                max: RATING_COMMENT_MAX,
            });
        }
        Ok(Self(comment))
    }
}

impl AsRef<str> for RatingComment {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RatingComment> for String {
    fn from(value: RatingComment) -> Self {
        value.0
    }
}

impl TryFrom<String> for RatingComment {
    type Error = RatingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Moderation note recorded when a rating is flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlagReason(String);

impl FlagReason {
    /// Validate and construct a [`FlagReason`] from owned input.
    ///
    /// # Errors
    /// Returns [`RatingValidationError::FlagReasonTooLong`] when the trimmed
    /// input exceeds [`FLAG_REASON_MAX`] characters.
    pub fn new(reason: impl Into<String>) -> Result<Self, RatingValidationError> {
        Self::from_owned(reason.into())
    }

    fn from_owned(input: String) -> Result<Self, RatingValidationError> {
        let reason = input.trim().to_owned();
        if reason.chars().count() > FLAG_REASON_MAX {
            return Err(RatingValidationError::FlagReasonTooLong {
                max: FLAG_REASON_MAX,
            });
        }
        Ok(Self(reason))
    }
}

impl AsRef<str> for FlagReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FlagReason> for String {
    fn from(value: FlagReason) -> Self {
        value.0
    }
}

impl TryFrom<String> for FlagReason {
    type Error = RatingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Aggregate reputation carried on a user profile.
///
/// ## Invariants
/// - `average` is the mean of every stored score for the user, rounded to
///   one decimal; `count` is the number of those scores. Flagged ratings are
///   included; flagging is a review marker, not an exclusion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean score rounded to one decimal, 0.0 when unrated.
    pub average: f64,
    /// Number of ratings received.
    pub count: u32,
}

impl RatingSummary {
    /// Fold a full set of scores into a summary.
    ///
    /// The result is independent of score order. An empty slice yields the
    /// default summary.
    #[must_use]
    pub fn from_scores(scores: &[RatingScore]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let total: u32 = scores.iter().map(|score| u32::from(score.value())).sum();
        let count = u32::try_from(scores.len()).unwrap_or(u32::MAX);
        #[expect(
            clippy::float_arithmetic,
            reason = "one-decimal rounded mean over small integer scores"
        )]
        let average = (f64::from(total) / f64::from(count) * 10.0).round() / 10.0;
        Self { average, count }
    }
}

/// Validated inputs for [`Rating::new`].
#[derive(Debug, Clone)]
pub struct NewRating {
    /// Identifier assigned by the caller.
    pub id: RatingId,
    /// Swap the rating refers to.
    pub swap_id: SwapId,
    /// Participant leaving the rating.
    pub rater_id: UserId,
    /// Participant being rated.
    pub rated_user_id: UserId,
    /// Overall score.
    pub score: RatingScore,
    /// Optional free-text comment.
    pub comment: Option<RatingComment>,
    /// Optional per-aspect scores.
    pub sub_scores: SubScores,
    /// Whether the rater would trade with this member again.
    pub would_recommend: bool,
    /// Creation timestamp from the caller's clock.
    pub now: DateTime<Utc>,
}

/// Snapshot of every persisted rating field.
#[derive(Debug, Clone)]
pub struct RatingSnapshot {
    /// Stable identifier.
    pub id: RatingId,
    /// Swap the rating refers to.
    pub swap_id: SwapId,
    /// Participant who left the rating.
    pub rater_id: UserId,
    /// Participant who was rated.
    pub rated_user_id: UserId,
    /// Overall score.
    pub score: RatingScore,
    /// Optional free-text comment.
    pub comment: Option<RatingComment>,
    /// Optional per-aspect scores.
    pub sub_scores: SubScores,
    /// Whether the rater would trade again.
    pub would_recommend: bool,
    /// Moderation flag.
    pub flagged: bool,
    /// Optional moderation note.
    pub flag_reason: Option<FlagReason>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Feedback left by one swap participant about the other.
///
/// ## Invariants
/// - At most one rating exists per (swap, rater) pair; the repositories
///   enforce this with a unique index and services check it up front.
/// - Clearing the moderation flag clears the reason with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    id: RatingId,
    swap_id: SwapId,
    rater_id: UserId,
    rated_user_id: UserId,
    score: RatingScore,
    comment: Option<RatingComment>,
    sub_scores: SubScores,
    would_recommend: bool,
    flagged: bool,
    flag_reason: Option<FlagReason>,
    created_at: DateTime<Utc>,
}

impl Rating {
    /// Create an unflagged rating.
    #[must_use]
    pub fn new(parts: NewRating) -> Self {
        Self {
            id: parts.id,
            swap_id: parts.swap_id,
            rater_id: parts.rater_id,
            rated_user_id: parts.rated_user_id,
            score: parts.score,
            comment: parts.comment,
            sub_scores: parts.sub_scores,
            would_recommend: parts.would_recommend,
            flagged: false,
            flag_reason: None,
            created_at: parts.now,
        }
    }

    /// Rebuild a rating from persisted state.
    #[must_use]
    pub fn from_snapshot(snapshot: RatingSnapshot) -> Self {
        Self {
            id: snapshot.id,
            swap_id: snapshot.swap_id,
            rater_id: snapshot.rater_id,
            rated_user_id: snapshot.rated_user_id,
            score: snapshot.score,
            comment: snapshot.comment,
            sub_scores: snapshot.sub_scores,
            would_recommend: snapshot.would_recommend,
            flagged: snapshot.flagged,
            flag_reason: snapshot.flag_reason,
            created_at: snapshot.created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> RatingId {
        self.id
    }

    /// Swap the rating refers to.
    #[must_use]
    pub const fn swap_id(&self) -> SwapId {
        self.swap_id
    }

    /// Participant who left the rating.
    #[must_use]
    pub const fn rater_id(&self) -> UserId {
        self.rater_id
    }

    /// Participant who was rated.
    #[must_use]
    pub const fn rated_user_id(&self) -> UserId {
        self.rated_user_id
    }

    /// Overall score.
    #[must_use]
    pub const fn score(&self) -> RatingScore {
        self.score
    }

    /// Optional free-text comment.
    #[must_use]
    pub const fn comment(&self) -> Option<&RatingComment> {
        self.comment.as_ref()
    }

    /// Optional per-aspect scores.
    #[must_use]
    pub const fn sub_scores(&self) -> SubScores {
        self.sub_scores
    }

    /// Whether the rater would trade again.
    #[must_use]
    pub const fn would_recommend(&self) -> bool {
        self.would_recommend
    }

    /// Moderation flag.
    #[must_use]
    pub const fn flagged(&self) -> bool {
        self.flagged
    }

    /// Optional moderation note.
    #[must_use]
    pub const fn flag_reason(&self) -> Option<&FlagReason> {
        self.flag_reason.as_ref()
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set or clear the moderation flag.
    ///
    /// A reason is only retained while the flag is set.
    #[must_use]
    pub fn with_flag(mut self, flagged: bool, reason: Option<FlagReason>) -> Self {
        self.flagged = flagged;
        self.flag_reason = if flagged { reason } else { None };
        self
    }

    /// Project the rating into its serialisable view.
    #[must_use]
    pub fn view(&self) -> RatingView {
        RatingView {
            id: self.id,
            swap_id: self.swap_id,
            rater_id: self.rater_id,
            rated_user_id: self.rated_user_id,
            score: self.score,
            comment: self.comment.as_ref().map(|value| value.as_ref().to_owned()),
            sub_scores: self.sub_scores,
            would_recommend: self.would_recommend,
            flagged: self.flagged,
            flag_reason: self
                .flag_reason
                .as_ref()
                .map(|value| value.as_ref().to_owned()),
            created_at: self.created_at,
        }
    }
}

/// Serialisable view of a rating.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    /// Stable identifier.
    pub id: RatingId,
    /// Swap the rating refers to.
    pub swap_id: SwapId,
    /// Participant who left the rating.
    pub rater_id: UserId,
    /// Participant who was rated.
    pub rated_user_id: UserId,
    /// Overall score.
    pub score: RatingScore,
    /// Optional free-text comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Optional per-aspect scores.
    #[serde(skip_serializing_if = "SubScores::is_empty")]
    pub sub_scores: SubScores,
    /// Whether the rater would trade again.
    pub would_recommend: bool,
    /// Moderation flag.
    pub flagged: bool,
    /// Optional moderation note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_reason: Option<String>,
    /// Creation timestamp.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}
