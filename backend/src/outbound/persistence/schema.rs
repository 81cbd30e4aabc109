//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Member accounts table.
    ///
    /// Stores registered members with their credentials, profile fields and
    /// denormalised reputation counters. The `id` column is the primary key
    /// (UUID v4) and `email` carries a unique index.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name (max 50 characters).
        display_name -> Varchar,
        /// Normalised login email (unique).
        email -> Varchar,
        /// Salted credential hash, never the raw password.
        credential -> Varchar,
        /// Authorisation role label (`user` or `admin`).
        role -> Varchar,
        /// Soft-delete flag; deactivated accounts keep their record.
        is_active -> Bool,
        /// Whether the profile appears in directory searches.
        is_public -> Bool,
        /// Optional free-text location.
        location -> Nullable<Varchar>,
        /// Optional free-text bio.
        bio -> Nullable<Text>,
        /// Optional profile photo URL.
        photo_url -> Nullable<Varchar>,
        /// Skills the member offers, as a JSON array of descriptors.
        skills_offered -> Jsonb,
        /// Skills the member wants, as a JSON array of descriptors.
        skills_wanted -> Jsonb,
        /// Availability tags, as a JSON array of labels.
        availability -> Jsonb,
        /// One-decimal rounded mean of received rating scores.
        rating_average -> Float8,
        /// Number of ratings received.
        rating_count -> Int4,
        /// Number of completed swaps.
        swap_count -> Int4,
        /// Last recorded member activity.
        last_active_at -> Timestamptz,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Swap request lifecycle table.
    ///
    /// One row per proposed exchange; the `status` column carries the
    /// lifecycle state label and the nullable timestamps record terminal
    /// transitions.
    swap_requests (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Member who sent the request.
        requester_id -> Uuid,
        /// Member who received the request.
        recipient_id -> Uuid,
        /// Skill offered in exchange, as a JSON descriptor.
        offered_skill -> Jsonb,
        /// Skill requested, as a JSON descriptor.
        requested_skill -> Jsonb,
        /// Optional opening message.
        message -> Nullable<Text>,
        /// Lifecycle state label (`pending`, `accepted`, `rejected`,
        /// `completed` or `cancelled`).
        status -> Varchar,
        /// Optional accept/reject response message.
        response_message -> Nullable<Text>,
        /// Optional agreed session time.
        scheduled_for -> Nullable<Timestamptz>,
        /// Optional agreed session length in hours.
        duration_hours -> Nullable<Float8>,
        /// Meeting arrangement, as a JSON object.
        meeting -> Jsonb,
        /// Optional cancellation reason.
        cancel_reason -> Nullable<Text>,
        /// Whether the requester has rated this swap.
        rated_by_requester -> Bool,
        /// Whether the recipient has rated this swap.
        rated_by_recipient -> Bool,
        /// When the swap completed, if it did.
        completed_at -> Nullable<Timestamptz>,
        /// When the swap was cancelled, if it was.
        cancelled_at -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Swap feedback table.
    ///
    /// One row per rating; a unique index on `(swap_request_id, rater_id)`
    /// enforces the one-rating-per-participant rule.
    ratings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Swap the rating refers to.
        swap_request_id -> Uuid,
        /// Member who left the rating.
        rater_id -> Uuid,
        /// Member who was rated.
        rated_user_id -> Uuid,
        /// Overall score, 1 to 5.
        score -> Int2,
        /// Optional free-text comment.
        comment -> Nullable<Text>,
        /// Optional per-aspect scores, as a JSON object.
        sub_scores -> Jsonb,
        /// Whether the rater would trade again.
        would_recommend -> Bool,
        /// Moderation flag.
        flagged -> Bool,
        /// Optional moderation note.
        flag_reason -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, swap_requests, ratings);
