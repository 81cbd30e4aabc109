//! PostgreSQL-backed `SwapRepository` implementation using Diesel ORM.
//!
//! Lifecycle state is stored as a text label and parsed back through the
//! domain `FromStr`; the denormalised per-status totals come from a single
//! grouped count so the dashboard never scans full rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use std::str::FromStr;

use crate::domain::ports::{SwapListFilter, SwapRepository, SwapRepositoryError, SwapRole, SwapTotals};
use crate::domain::reporting::ReportWindow;
use crate::domain::swap::{
    CancelReason, DurationHours, MeetingPlan, ResponseMessage, SwapId, SwapMessage,
    SwapParticipant, SwapRequest, SwapSnapshot, SwapStatus,
};
use crate::domain::{SkillDescriptor, UserId};

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::{NewSwapRequestRow, SwapRequestChangeset, SwapRequestRow};
use super::pool::{DbPool, PoolError};
use super::schema::swap_requests;

/// Diesel-backed implementation of the swap repository port.
#[derive(Clone)]
pub struct DieselSwapRepository {
    pool: DbPool,
}

impl DieselSwapRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SwapRepositoryError {
    map_pool_error(error, SwapRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SwapRepositoryError {
    map_diesel_error(
        error,
        SwapRepositoryError::query,
        SwapRepositoryError::connection,
    )
}

fn invalid_row(err: impl std::fmt::Display) -> SwapRepositoryError {
    SwapRepositoryError::query(err.to_string())
}

fn encode_json<T: serde::Serialize>(
    value: &T,
    field_name: &str,
) -> Result<serde_json::Value, SwapRepositoryError> {
    serde_json::to_value(value)
        .map_err(|err| SwapRepositoryError::query(format!("serialise {field_name}: {err}")))
}

fn decode_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    field_name: &str,
) -> Result<T, SwapRepositoryError> {
    serde_json::from_value(value)
        .map_err(|err| SwapRepositoryError::query(format!("decode {field_name}: {err}")))
}

/// Convert a database row into a validated domain swap request.
fn row_to_swap(row: SwapRequestRow) -> Result<SwapRequest, SwapRepositoryError> {
    let SwapRequestRow {
        id,
        requester_id,
        recipient_id,
        offered_skill,
        requested_skill,
        message,
        status,
        response_message,
        scheduled_for,
        duration_hours,
        meeting,
        cancel_reason,
        rated_by_requester,
        rated_by_recipient,
        completed_at,
        cancelled_at,
        created_at,
        updated_at,
    } = row;

    let offered_skill: SkillDescriptor = decode_json(offered_skill, "offered_skill")?;
    let requested_skill: SkillDescriptor = decode_json(requested_skill, "requested_skill")?;
    let meeting: MeetingPlan = decode_json(meeting, "meeting")?;

    Ok(SwapRequest::from_snapshot(SwapSnapshot {
        id: SwapId::from_uuid(id),
        requester_id: UserId::from_uuid(requester_id),
        recipient_id: UserId::from_uuid(recipient_id),
        offered_skill,
        requested_skill,
        message: message.map(SwapMessage::new).transpose().map_err(invalid_row)?,
        status: SwapStatus::from_str(&status).map_err(invalid_row)?,
        response_message: response_message
            .map(ResponseMessage::new)
            .transpose()
            .map_err(invalid_row)?,
        scheduled_for,
        duration_hours: duration_hours
            .map(DurationHours::new)
            .transpose()
            .map_err(invalid_row)?,
        meeting,
        cancel_reason: cancel_reason
            .map(CancelReason::new)
            .transpose()
            .map_err(invalid_row)?,
        rated_by_requester,
        rated_by_recipient,
        completed_at,
        cancelled_at,
        created_at,
        updated_at,
    }))
}

fn swap_to_new_row(swap: &SwapRequest) -> Result<NewSwapRequestRow, SwapRepositoryError> {
    Ok(NewSwapRequestRow {
        id: *swap.id().as_uuid(),
        requester_id: *swap.requester_id().as_uuid(),
        recipient_id: *swap.recipient_id().as_uuid(),
        offered_skill: encode_json(swap.offered_skill(), "offered_skill")?,
        requested_skill: encode_json(swap.requested_skill(), "requested_skill")?,
        message: swap.message().map(|value| String::from(value.clone())),
        status: swap.status().to_string(),
        response_message: swap
            .response_message()
            .map(|value| String::from(value.clone())),
        scheduled_for: swap.scheduled_for(),
        duration_hours: swap.duration_hours().map(DurationHours::hours),
        meeting: encode_json(swap.meeting(), "meeting")?,
        cancel_reason: swap.cancel_reason().map(|value| String::from(value.clone())),
        rated_by_requester: swap.rated_by(SwapParticipant::Requester),
        rated_by_recipient: swap.rated_by(SwapParticipant::Recipient),
        completed_at: swap.completed_at(),
        cancelled_at: swap.cancelled_at(),
        created_at: swap.created_at(),
        updated_at: swap.updated_at(),
    })
}

fn swap_to_changeset(swap: &SwapRequest) -> Result<SwapRequestChangeset, SwapRepositoryError> {
    Ok(SwapRequestChangeset {
        status: swap.status().to_string(),
        response_message: swap
            .response_message()
            .map(|value| String::from(value.clone())),
        scheduled_for: swap.scheduled_for(),
        duration_hours: swap.duration_hours().map(DurationHours::hours),
        meeting: encode_json(swap.meeting(), "meeting")?,
        cancel_reason: swap.cancel_reason().map(|value| String::from(value.clone())),
        rated_by_requester: swap.rated_by(SwapParticipant::Requester),
        rated_by_recipient: swap.rated_by(SwapParticipant::Recipient),
        completed_at: swap.completed_at(),
        cancelled_at: swap.cancelled_at(),
        updated_at: swap.updated_at(),
    })
}

/// Build the member-scoped listing predicate.
fn list_for_user_query(
    user_id: UserId,
    filter: SwapListFilter,
) -> swap_requests::BoxedQuery<'static, diesel::pg::Pg> {
    let uuid = *user_id.as_uuid();
    let mut query = match filter.role {
        SwapRole::Sent => swap_requests::table
            .filter(swap_requests::requester_id.eq(uuid))
            .into_boxed(),
        SwapRole::Received => swap_requests::table
            .filter(swap_requests::recipient_id.eq(uuid))
            .into_boxed(),
        SwapRole::Either => swap_requests::table
            .filter(
                swap_requests::requester_id
                    .eq(uuid)
                    .or(swap_requests::recipient_id.eq(uuid)),
            )
            .into_boxed(),
    };

    if let Some(status) = filter.status {
        query = query.filter(swap_requests::status.eq(status.to_string()));
    }

    query
}

fn list_all_query(
    status: Option<SwapStatus>,
) -> swap_requests::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = swap_requests::table.into_boxed();
    if let Some(status) = status {
        query = query.filter(swap_requests::status.eq(status.to_string()));
    }
    query
}

#[async_trait]
impl SwapRepository for DieselSwapRepository {
    async fn save(&self, swap: &SwapRequest) -> Result<(), SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let new_row = swap_to_new_row(swap)?;

        diesel::insert_into(swap_requests::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, swap: &SwapRequest) -> Result<(), SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let changeset = swap_to_changeset(swap)?;

        diesel::update(swap_requests::table.filter(swap_requests::id.eq(swap.id().as_uuid())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: SwapId) -> Result<Option<SwapRequest>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = swap_requests::table
            .filter(swap_requests::id.eq(id.as_uuid()))
            .select(SwapRequestRow::as_select())
            .first::<SwapRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_swap).transpose()
    }

    async fn find_pending_between(
        &self,
        requester_id: UserId,
        recipient_id: UserId,
    ) -> Result<Option<SwapRequest>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = swap_requests::table
            .filter(swap_requests::requester_id.eq(requester_id.as_uuid()))
            .filter(swap_requests::recipient_id.eq(recipient_id.as_uuid()))
            .filter(swap_requests::status.eq(SwapStatus::Pending.to_string()))
            .select(SwapRequestRow::as_select())
            .first::<SwapRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_swap).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = list_for_user_query(user_id, filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<SwapRequestRow> = list_for_user_query(user_id, filter)
            .order((swap_requests::created_at.desc(), swap_requests::id.desc()))
            .offset(page.offset())
            .limit(page.limit_i64())
            .select(SwapRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_swap)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn list_all(
        &self,
        status: Option<SwapStatus>,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = list_all_query(status)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<SwapRequestRow> = list_all_query(status)
            .order((swap_requests::created_at.desc(), swap_requests::id.desc()))
            .offset(page.offset())
            .limit(page.limit_i64())
            .select(SwapRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_swap)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn totals(&self) -> Result<SwapTotals, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let counts: Vec<(String, i64)> = swap_requests::table
            .group_by(swap_requests::status)
            .select((swap_requests::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let mut totals = SwapTotals::default();
        for (label, count) in counts {
            let count = u64::try_from(count).unwrap_or(0);
            totals.total += count;
            match SwapStatus::from_str(&label).map_err(invalid_row)? {
                SwapStatus::Pending => totals.pending = count,
                SwapStatus::Accepted => totals.accepted = count,
                SwapStatus::Rejected => totals.rejected = count,
                SwapStatus::Completed => totals.completed = count,
                SwapStatus::Cancelled => totals.cancelled = count,
            }
        }
        Ok(totals)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<SwapRequest>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<SwapRequestRow> = swap_requests::table
            .order((swap_requests::created_at.desc(), swap_requests::id.desc()))
            .limit(i64::from(limit))
            .select(SwapRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_swap).collect()
    }

    async fn status_timeline(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<(SwapStatus, DateTime<Utc>)>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = swap_requests::table.into_boxed();
        if let Some(from) = window.from {
            query = query.filter(swap_requests::created_at.ge(from));
        }
        if let Some(to) = window.to {
            query = query.filter(swap_requests::created_at.le(to));
        }

        let rows: Vec<(String, DateTime<Utc>)> = query
            .select((swap_requests::status, swap_requests::created_at))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter()
            .map(|(label, created_at)| {
                SwapStatus::from_str(&label)
                    .map(|status| (status, created_at))
                    .map_err(invalid_row)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn valid_row() -> SwapRequestRow {
        let now = Utc::now();
        SwapRequestRow {
            id: Uuid::new_v4(),
            requester_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            offered_skill: json!({ "name": "Guitar basics", "level": "advanced" }),
            requested_skill: json!({ "name": "Spanish conversation", "level": "intermediate" }),
            message: Some("keen to trade".to_owned()),
            status: "pending".to_owned(),
            response_message: None,
            scheduled_for: None,
            duration_hours: Some(1.5),
            meeting: json!({ "kind": "online" }),
            cancel_reason: None,
            rated_by_requester: false,
            rated_by_recipient: false,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, SwapRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn row_conversion_builds_swap(valid_row: SwapRequestRow) {
        let swap = row_to_swap(valid_row).expect("valid row should convert");

        assert_eq!(swap.status(), SwapStatus::Pending);
        assert_eq!(swap.offered_skill().name(), "Guitar basics");
        assert!(swap.duration_hours().is_some());
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status(mut valid_row: SwapRequestRow) {
        valid_row.status = "negotiating".to_owned();

        let error = row_to_swap(valid_row).expect_err("unknown status should fail");
        assert!(matches!(error, SwapRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_rejects_malformed_meeting(mut valid_row: SwapRequestRow) {
        valid_row.meeting = json!({ "kind": "teleport" });

        let error = row_to_swap(valid_row).expect_err("invalid meeting should fail");
        assert!(error.to_string().contains("decode meeting"));
    }

    #[rstest]
    fn changeset_reflects_lifecycle_columns(valid_row: SwapRequestRow) {
        let swap = row_to_swap(valid_row).expect("valid row should convert");
        let changeset = swap_to_changeset(&swap).expect("swap should serialise");

        assert_eq!(changeset.status, "pending");
        assert!(!changeset.rated_by_requester);
        assert!(changeset.completed_at.is_none());
    }
}
