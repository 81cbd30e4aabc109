//! PostgreSQL-backed `RatingRepository` implementation using Diesel ORM.
//!
//! The unique index on `(swap_request_id, rater_id)` backs the
//! one-rating-per-participant rule; an insert that trips it surfaces as the
//! typed duplicate error so the service can answer with a conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{RatingRepository, RatingRepositoryError, RatingTotals};
use crate::domain::rating::{
    FlagReason, Rating, RatingComment, RatingId, RatingScore, RatingSnapshot, SubScores,
};
use crate::domain::reporting::ReportWindow;
use crate::domain::swap::SwapId;
use crate::domain::UserId;

use super::diesel_error::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewRatingRow, RatingChangeset, RatingRow};
use super::pool::{DbPool, PoolError};
use super::schema::ratings;

/// Diesel-backed implementation of the rating repository port.
#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> RatingRepositoryError {
    map_pool_error(error, RatingRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> RatingRepositoryError {
    map_diesel_error(
        error,
        RatingRepositoryError::query,
        RatingRepositoryError::connection,
    )
}

fn invalid_row(err: impl std::fmt::Display) -> RatingRepositoryError {
    RatingRepositoryError::query(err.to_string())
}

fn decode_score(raw: i16) -> Result<RatingScore, RatingRepositoryError> {
    let value = u8::try_from(raw).map_err(invalid_row)?;
    RatingScore::new(value).map_err(invalid_row)
}

/// Convert a database row into a validated domain rating.
fn row_to_rating(row: RatingRow) -> Result<Rating, RatingRepositoryError> {
    let RatingRow {
        id,
        swap_request_id,
        rater_id,
        rated_user_id,
        score,
        comment,
        sub_scores,
        would_recommend,
        flagged,
        flag_reason,
        created_at,
    } = row;

    let sub_scores: SubScores = serde_json::from_value(sub_scores)
        .map_err(|err| RatingRepositoryError::query(format!("decode sub_scores: {err}")))?;

    Ok(Rating::from_snapshot(RatingSnapshot {
        id: RatingId::from_uuid(id),
        swap_id: SwapId::from_uuid(swap_request_id),
        rater_id: UserId::from_uuid(rater_id),
        rated_user_id: UserId::from_uuid(rated_user_id),
        score: decode_score(score)?,
        comment: comment
            .map(RatingComment::new)
            .transpose()
            .map_err(invalid_row)?,
        sub_scores,
        would_recommend,
        flagged,
        flag_reason: flag_reason
            .map(FlagReason::new)
            .transpose()
            .map_err(invalid_row)?,
        created_at,
    }))
}

fn rating_to_new_row(rating: &Rating) -> Result<NewRatingRow, RatingRepositoryError> {
    let sub_scores = serde_json::to_value(rating.sub_scores())
        .map_err(|err| RatingRepositoryError::query(format!("serialise sub_scores: {err}")))?;

    Ok(NewRatingRow {
        id: *rating.id().as_uuid(),
        swap_request_id: *rating.swap_id().as_uuid(),
        rater_id: *rating.rater_id().as_uuid(),
        rated_user_id: *rating.rated_user_id().as_uuid(),
        score: i16::from(rating.score().value()),
        comment: rating.comment().map(|value| String::from(value.clone())),
        sub_scores,
        would_recommend: rating.would_recommend(),
        flagged: rating.flagged(),
        flag_reason: rating.flag_reason().map(|value| String::from(value.clone())),
        created_at: rating.created_at(),
    })
}

fn list_all_query(flagged: Option<bool>) -> ratings::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = ratings::table.into_boxed();
    if let Some(flagged) = flagged {
        query = query.filter(ratings::flagged.eq(flagged));
    }
    query
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn save(&self, rating: &Rating) -> Result<(), RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let new_row = rating_to_new_row(rating)?;

        diesel::insert_into(ratings::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RatingRepositoryError::duplicate_rating(rating.swap_id())
                } else {
                    map_diesel(err)
                }
            })
    }

    async fn update(&self, rating: &Rating) -> Result<(), RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let changeset = RatingChangeset {
            flagged: rating.flagged(),
            flag_reason: rating.flag_reason().map(|value| String::from(value.clone())),
        };

        diesel::update(ratings::table.filter(ratings::id.eq(rating.id().as_uuid())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: RatingId) -> Result<Option<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = ratings::table
            .filter(ratings::id.eq(id.as_uuid()))
            .select(RatingRow::as_select())
            .first::<RatingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_rating).transpose()
    }

    async fn find_for_swap_and_rater(
        &self,
        swap_id: SwapId,
        rater_id: UserId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = ratings::table
            .filter(ratings::swap_request_id.eq(swap_id.as_uuid()))
            .filter(ratings::rater_id.eq(rater_id.as_uuid()))
            .select(RatingRow::as_select())
            .first::<RatingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_rating).transpose()
    }

    async fn scores_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RatingScore>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let raw: Vec<i16> = ratings::table
            .filter(ratings::rated_user_id.eq(user_id.as_uuid()))
            .select(ratings::score)
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        raw.into_iter().map(decode_score).collect()
    }

    async fn list_received(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = ratings::table
            .filter(ratings::rated_user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<RatingRow> = ratings::table
            .filter(ratings::rated_user_id.eq(user_id.as_uuid()))
            .order((ratings::created_at.desc(), ratings::id.desc()))
            .offset(page.offset())
            .limit(page.limit_i64())
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_rating)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn recent_received(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<RatingRow> = ratings::table
            .filter(ratings::rated_user_id.eq(user_id.as_uuid()))
            .order((ratings::created_at.desc(), ratings::id.desc()))
            .limit(i64::from(limit))
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_rating).collect()
    }

    async fn list_all(
        &self,
        flagged: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = list_all_query(flagged)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<RatingRow> = list_all_query(flagged)
            .order((ratings::created_at.desc(), ratings::id.desc()))
            .offset(page.offset())
            .limit(page.limit_i64())
            .select(RatingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_rating)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn totals(&self) -> Result<RatingTotals, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let (count, score_sum): (i64, Option<i64>) = ratings::table
            .select((count_star(), sum(ratings::score)))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(RatingTotals {
            count: u64::try_from(count).unwrap_or(0),
            score_sum: score_sum
                .map(|total| u64::try_from(total).unwrap_or(0))
                .unwrap_or(0),
        })
    }

    async fn score_timeline(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<(RatingScore, DateTime<Utc>)>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = ratings::table.into_boxed();
        if let Some(from) = window.from {
            query = query.filter(ratings::created_at.ge(from));
        }
        if let Some(to) = window.to {
            query = query.filter(ratings::created_at.le(to));
        }

        let rows: Vec<(i16, DateTime<Utc>)> = query
            .select((ratings::score, ratings::created_at))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter()
            .map(|(raw, created_at)| decode_score(raw).map(|score| (score, created_at)))
            .collect()
    }
}
