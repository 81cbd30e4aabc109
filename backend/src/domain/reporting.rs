//! Admin-facing statistics, reports, and broadcast shapes.
//!
//! Repositories load counts and raw timestamps; the folding functions here
//! turn timestamps into calendar buckets so the SQL and in-memory adapters
//! share one aggregation rule.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::swap::{SwapStatus, SwapView};
use super::user::UserId;

/// Number of month buckets the dashboard keeps.
pub const DASHBOARD_MONTH_BUCKETS: usize = 12;
/// Number of recent records the dashboard embeds.
pub const DASHBOARD_RECENT_LIMIT: u32 = 5;

/// Validation errors returned by the broadcast constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastValidationError {
    /// The title was empty once trimmed.
    EmptyTitle,
    /// The body was empty once trimmed.
    EmptyBody,
}

impl fmt::Display for BroadcastValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyBody => write!(f, "body must not be empty"),
        }
    }
}

impl std::error::Error for BroadcastValidationError {}

/// Headline counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Active member count.
    pub total_users: u64,
    /// Swap requests ever created.
    pub total_swaps: u64,
    /// Swap requests in the completed state.
    pub completed_swaps: u64,
    /// Swap requests in the pending state.
    pub pending_swaps: u64,
    /// Ratings ever submitted.
    pub total_ratings: u64,
    /// Mean of every rating score, rounded to one decimal; 0.0 when none.
    pub average_rating: f64,
}

/// Newest member entry embedded in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentUser {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
    /// Login identity.
    pub email: String,
    /// Registration timestamp.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Count of events in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthBucket {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-indexed.
    pub month: u32,
    /// Events in the bucket.
    pub count: u64,
}

/// Count of events on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayBucket {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-indexed.
    pub month: u32,
    /// Day of month, 1-indexed.
    pub day: u32,
    /// Events in the bucket.
    pub count: u64,
}

/// Count of swaps created in one calendar month, split by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusMonthBucket {
    /// Swap status the bucket counts.
    pub status: SwapStatus,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-indexed.
    pub month: u32,
    /// Events in the bucket.
    pub count: u64,
}

/// Count of ratings submitted in one calendar month, split by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScoreMonthBucket {
    /// Score value the bucket counts.
    pub score: u8,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-indexed.
    pub month: u32,
    /// Events in the bucket.
    pub count: u64,
}

/// Everything the admin dashboard renders in one response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Headline counters.
    pub stats: DashboardStats,
    /// Five newest active members.
    pub recent_users: Vec<RecentUser>,
    /// Five newest swap requests.
    pub recent_swaps: Vec<SwapView>,
    /// Swap creations per calendar month, newest first, at most twelve.
    pub monthly_swaps: Vec<MonthBucket>,
}

/// Which activity series a report should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportKind {
    /// Every series.
    #[default]
    All,
    /// Member registrations only.
    Users,
    /// Swap creations only.
    Swaps,
    /// Rating submissions only.
    Ratings,
}

/// Error returned when parsing a report kind from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseReportKindError;

impl ReportKind {
    /// Whether the report includes member registrations.
    #[must_use]
    pub const fn includes_users(self) -> bool {
        matches!(self, Self::All | Self::Users)
    }

    /// Whether the report includes swap creations.
    #[must_use]
    pub const fn includes_swaps(self) -> bool {
        matches!(self, Self::All | Self::Swaps)
    }

    /// Whether the report includes rating submissions.
    #[must_use]
    pub const fn includes_ratings(self) -> bool {
        matches!(self, Self::All | Self::Ratings)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Users => f.write_str("users"),
            Self::Swaps => f.write_str("swaps"),
            Self::Ratings => f.write_str("ratings"),
        }
    }
}

impl fmt::Display for ParseReportKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid report kind")
    }
}

impl std::error::Error for ParseReportKindError {}

impl FromStr for ReportKind {
    type Err = ParseReportKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "users" => Ok(Self::Users),
            "swaps" => Ok(Self::Swaps),
            "ratings" => Ok(Self::Ratings),
            _ => Err(ParseReportKindError),
        }
    }
}

/// Optional closed interval a report is filtered to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportWindow {
    /// Earliest timestamp included, if bounded.
    pub from: Option<DateTime<Utc>>,
    /// Latest timestamp included, if bounded.
    pub to: Option<DateTime<Utc>>,
}

impl ReportWindow {
    /// Whether the timestamp falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Activity series assembled for the admin report endpoint.
///
/// Series absent from the requested [`ReportKind`] stay `None` and are
/// omitted from the rendered JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    /// Member registrations per day, ascending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_activity: Option<Vec<DayBucket>>,
    /// Swap creations per status and month, ascending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_activity: Option<Vec<StatusMonthBucket>>,
    /// Rating submissions per score and month, ascending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_activity: Option<Vec<ScoreMonthBucket>>,
}

/// Echo of a platform broadcast; no delivery pipeline exists yet.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    /// Broadcast title.
    pub title: String,
    /// Broadcast body.
    pub body: String,
    /// Broadcast kind label, `info` by default.
    pub kind: String,
    /// When the broadcast was recorded.
    #[schema(value_type = String, format = DateTime)]
    pub sent_at: DateTime<Utc>,
    /// Admin who sent it.
    pub sent_by: UserId,
}

/// Validated inputs for a platform broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastDraft {
    title: String,
    body: String,
    kind: String,
}

impl BroadcastDraft {
    /// Validate a broadcast payload; a missing kind defaults to `info`.
    ///
    /// # Errors
    /// Returns a [`BroadcastValidationError`] when the title or body is
    /// blank.
    pub fn try_from_parts(
        title: &str,
        body: &str,
        kind: Option<&str>,
    ) -> Result<Self, BroadcastValidationError> {
        let trimmed_title = title.trim();
        if trimmed_title.is_empty() {
            return Err(BroadcastValidationError::EmptyTitle);
        }
        let trimmed_body = body.trim();
        if trimmed_body.is_empty() {
            return Err(BroadcastValidationError::EmptyBody);
        }
        let label = kind
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("info");
        Ok(Self {
            title: trimmed_title.to_owned(),
            body: trimmed_body.to_owned(),
            kind: label.to_owned(),
        })
    }

    /// Broadcast title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Broadcast body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Broadcast kind label.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    /// Stamp the draft into a receipt.
    #[must_use]
    pub fn into_receipt(self, sent_by: UserId, sent_at: DateTime<Utc>) -> BroadcastReceipt {
        BroadcastReceipt {
            title: self.title,
            body: self.body,
            kind: self.kind,
            sent_at,
            sent_by,
        }
    }
}

/// Mean of `total` points over `count` events, rounded to one decimal.
///
/// Returns 0.0 when `count` is zero.
#[must_use]
pub fn one_decimal_average(total: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "rating totals stay far below 2^52"
    )]
    #[expect(
        clippy::float_arithmetic,
        reason = "one-decimal rounded mean over integer totals"
    )]
    {
        ((total as f64) / (count as f64) * 10.0).round() / 10.0
    }
}

/// Fold timestamps into month buckets, newest first, capped at
/// [`DASHBOARD_MONTH_BUCKETS`].
#[must_use]
pub fn fold_month_buckets(timestamps: &[DateTime<Utc>]) -> Vec<MonthBucket> {
    let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for at in timestamps {
        *buckets.entry((at.year(), at.month())).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .rev()
        .take(DASHBOARD_MONTH_BUCKETS)
        .map(|((year, month), count)| MonthBucket { year, month, count })
        .collect()
}

/// Fold timestamps into day buckets, ascending.
#[must_use]
pub fn fold_day_buckets(timestamps: &[DateTime<Utc>]) -> Vec<DayBucket> {
    let mut buckets: BTreeMap<(i32, u32, u32), u64> = BTreeMap::new();
    for at in timestamps {
        *buckets
            .entry((at.year(), at.month(), at.day()))
            .or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month, day), count)| DayBucket {
            year,
            month,
            day,
            count,
        })
        .collect()
}

/// Fold (status, creation) pairs into per-status month buckets, ascending.
#[must_use]
pub fn fold_status_month_buckets(events: &[(SwapStatus, DateTime<Utc>)]) -> Vec<StatusMonthBucket> {
    let mut buckets: BTreeMap<(i32, u32, SwapStatus), u64> = BTreeMap::new();
    for (status, at) in events {
        *buckets
            .entry((at.year(), at.month(), *status))
            .or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month, status), count)| StatusMonthBucket {
            status,
            year,
            month,
            count,
        })
        .collect()
}

/// Fold (score, creation) pairs into per-score month buckets, ascending.
#[must_use]
pub fn fold_score_month_buckets(events: &[(u8, DateTime<Utc>)]) -> Vec<ScoreMonthBucket> {
    let mut buckets: BTreeMap<(i32, u32, u8), u64> = BTreeMap::new();
    for (score, at) in events {
        *buckets
            .entry((at.year(), at.month(), *score))
            .or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month, score), count)| ScoreMonthBucket {
            score,
            year,
            month,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests;
