//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations; each repository converts
//! between them and validated domain types at its boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{ratings, swap_requests, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub credential: String,
    pub role: String,
    pub is_active: bool,
    pub is_public: bool,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub skills_offered: serde_json::Value,
    pub skills_wanted: serde_json::Value,
    pub availability: serde_json::Value,
    pub rating_average: f64,
    pub rating_count: i32,
    pub swap_count: i32,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new member records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub credential: String,
    pub role: String,
    pub is_active: bool,
    pub is_public: bool,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub skills_offered: serde_json::Value,
    pub skills_wanted: serde_json::Value,
    pub availability: serde_json::Value,
    pub rating_average: f64,
    pub rating_count: i32,
    pub swap_count: i32,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for updating existing member records.
///
/// `None` writes NULL: the domain aggregate is authoritative, so a cleared
/// optional field must clear the column too.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset {
    pub display_name: String,
    pub email: String,
    pub credential: String,
    pub role: String,
    pub is_active: bool,
    pub is_public: bool,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub skills_offered: serde_json::Value,
    pub skills_wanted: serde_json::Value,
    pub availability: serde_json::Value,
    pub rating_average: f64,
    pub rating_count: i32,
    pub swap_count: i32,
    pub last_active_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Swap request models
// ---------------------------------------------------------------------------

/// Row struct for reading from the swap_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = swap_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SwapRequestRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub offered_skill: serde_json::Value,
    pub requested_skill: serde_json::Value,
    pub message: Option<String>,
    pub status: String,
    pub response_message: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub meeting: serde_json::Value,
    pub cancel_reason: Option<String>,
    pub rated_by_requester: bool,
    pub rated_by_recipient: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new swap request records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = swap_requests)]
pub(crate) struct NewSwapRequestRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub offered_skill: serde_json::Value,
    pub requested_skill: serde_json::Value,
    pub message: Option<String>,
    pub status: String,
    pub response_message: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub meeting: serde_json::Value,
    pub cancel_reason: Option<String>,
    pub rated_by_requester: bool,
    pub rated_by_recipient: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for swap lifecycle transitions.
///
/// Participants, skills and the opening message are immutable once created,
/// so only transition-mutable columns appear here.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = swap_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SwapRequestChangeset {
    pub status: String,
    pub response_message: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub meeting: serde_json::Value,
    pub cancel_reason: Option<String>,
    pub rated_by_requester: bool,
    pub rated_by_recipient: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rating models
// ---------------------------------------------------------------------------

/// Row struct for reading from the ratings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: Uuid,
    pub swap_request_id: Uuid,
    pub rater_id: Uuid,
    pub rated_user_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub sub_scores: serde_json::Value,
    pub would_recommend: bool,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new rating records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow {
    pub id: Uuid,
    pub swap_request_id: Uuid,
    pub rater_id: Uuid,
    pub rated_user_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub sub_scores: serde_json::Value,
    pub would_recommend: bool,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for moderation updates.
///
/// Ratings are immutable feedback; only the moderation flag may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = ratings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RatingChangeset {
    pub flagged: bool,
    pub flag_reason: Option<String>,
}
