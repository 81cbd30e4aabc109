//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! This adapter persists member aggregates and serves the directory search,
//! moderation listing and dashboard count queries. Rows are rebuilt into
//! domain members through validated constructors; a row that fails
//! validation surfaces as a query error rather than a panic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Jsonb, Text};
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use std::str::FromStr;

use crate::domain::ports::{
    AdminUserFilter, DirectoryFilter, UserRepository, UserRepositoryError,
};
use crate::domain::reporting::ReportWindow;
use crate::domain::user::{
    AvailabilityTag, Bio, CredentialHash, DisplayName, Location, PhotoUrl, UserRole, UserSnapshot,
};
use crate::domain::rating::RatingSummary;
use crate::domain::{EmailAddress, SkillDescriptor, User, UserId};

use super::diesel_error::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Escape LIKE metacharacters so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

type BoxedBool = Box<dyn BoxableExpression<users::table, diesel::pg::Pg, SqlType = Bool>>;

/// SQL probe matching a LIKE pattern against skill names in a JSONB column.
///
/// `column` must be a fixed identifier, never caller input.
fn skill_name_probe(column: &str, pattern: String) -> BoxedBool {
    let prefix = format!(
        "EXISTS (SELECT 1 FROM jsonb_array_elements({column}) AS skill \
         WHERE skill->>'name' ILIKE "
    );
    Box::new(sql::<Bool>(&prefix).bind::<Text, _>(pattern).sql(")"))
}

/// SQL probe matching a LIKE pattern against the nullable location column.
fn location_probe(pattern: String) -> BoxedBool {
    Box::new(
        sql::<Bool>("COALESCE(location ILIKE ")
            .bind::<Text, _>(pattern)
            .sql(", FALSE)"),
    )
}

fn encode_json<T: serde::Serialize>(
    value: &T,
    field_name: &str,
) -> Result<serde_json::Value, UserRepositoryError> {
    serde_json::to_value(value)
        .map_err(|err| UserRepositoryError::query(format!("serialise {field_name}: {err}")))
}

fn decode_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    field_name: &str,
) -> Result<T, UserRepositoryError> {
    serde_json::from_value(value)
        .map_err(|err| UserRepositoryError::query(format!("decode {field_name}: {err}")))
}

fn invalid_row(err: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::query(err.to_string())
}

/// Convert a database row into a validated domain member.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let UserRow {
        id,
        display_name,
        email,
        credential,
        role,
        is_active,
        is_public,
        location,
        bio,
        photo_url,
        skills_offered,
        skills_wanted,
        availability,
        rating_average,
        rating_count,
        swap_count,
        last_active_at,
        created_at,
        updated_at,
    } = row;

    let skills_offered: Vec<SkillDescriptor> = decode_json(skills_offered, "skills_offered")?;
    let skills_wanted: Vec<SkillDescriptor> = decode_json(skills_wanted, "skills_wanted")?;
    let availability: Vec<AvailabilityTag> = decode_json(availability, "availability")?;

    Ok(User::from_snapshot(UserSnapshot {
        id: UserId::from_uuid(id),
        display_name: DisplayName::new(display_name).map_err(invalid_row)?,
        email: EmailAddress::new(email).map_err(invalid_row)?,
        credential: CredentialHash::new(credential).map_err(invalid_row)?,
        role: UserRole::from_str(&role).map_err(invalid_row)?,
        is_active,
        is_public,
        location: location.map(Location::new).transpose().map_err(invalid_row)?,
        bio: bio.map(Bio::new).transpose().map_err(invalid_row)?,
        photo_url: photo_url
            .map(PhotoUrl::new)
            .transpose()
            .map_err(invalid_row)?,
        skills_offered,
        skills_wanted,
        availability,
        rating: RatingSummary {
            average: rating_average,
            count: u32::try_from(rating_count).unwrap_or_default(),
        },
        swap_count: u32::try_from(swap_count).unwrap_or_default(),
        last_active_at,
        created_at,
        updated_at,
    }))
}

fn user_to_new_row(user: &User) -> Result<NewUserRow, UserRepositoryError> {
    Ok(NewUserRow {
        id: *user.id().as_uuid(),
        display_name: user.display_name().to_string(),
        email: user.email().to_string(),
        credential: user.credential().as_str().to_owned(),
        role: user.role().to_string(),
        is_active: user.is_active(),
        is_public: user.is_public(),
        location: user.location().map(|value| String::from(value.clone())),
        bio: user.bio().map(|value| String::from(value.clone())),
        photo_url: user.photo_url().map(|value| String::from(value.clone())),
        skills_offered: encode_json(&user.skills_offered(), "skills_offered")?,
        skills_wanted: encode_json(&user.skills_wanted(), "skills_wanted")?,
        availability: encode_json(&user.availability(), "availability")?,
        rating_average: user.rating().average,
        rating_count: i32::try_from(user.rating().count).unwrap_or(i32::MAX),
        swap_count: i32::try_from(user.swap_count()).unwrap_or(i32::MAX),
        last_active_at: user.last_active_at(),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    })
}

fn user_to_changeset(user: &User) -> Result<UserChangeset, UserRepositoryError> {
    Ok(UserChangeset {
        display_name: user.display_name().to_string(),
        email: user.email().to_string(),
        credential: user.credential().as_str().to_owned(),
        role: user.role().to_string(),
        is_active: user.is_active(),
        is_public: user.is_public(),
        location: user.location().map(|value| String::from(value.clone())),
        bio: user.bio().map(|value| String::from(value.clone())),
        photo_url: user.photo_url().map(|value| String::from(value.clone())),
        skills_offered: encode_json(&user.skills_offered(), "skills_offered")?,
        skills_wanted: encode_json(&user.skills_wanted(), "skills_wanted")?,
        availability: encode_json(&user.availability(), "availability")?,
        rating_average: user.rating().average,
        rating_count: i32::try_from(user.rating().count).unwrap_or(i32::MAX),
        swap_count: i32::try_from(user.swap_count()).unwrap_or(i32::MAX),
        last_active_at: user.last_active_at(),
        updated_at: user.updated_at(),
    })
}

/// Build the directory search predicate: active, public, every present
/// filter ANDed in.
fn directory_query(filter: &DirectoryFilter) -> users::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = users::table
        .filter(users::is_active.eq(true))
        .filter(users::is_public.eq(true))
        .into_boxed();

    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        query = query.filter(
            users::display_name
                .ilike(pattern.clone())
                .or(skill_name_probe("skills_offered", pattern.clone()))
                .or(skill_name_probe("skills_wanted", pattern.clone()))
                .or(location_probe(pattern)),
        );
    }
    if let Some(skill) = &filter.skill {
        let pattern = like_pattern(skill);
        query = query.filter(
            skill_name_probe("skills_offered", pattern.clone())
                .or(skill_name_probe("skills_wanted", pattern)),
        );
    }
    if let Some(location) = &filter.location {
        query = query.filter(users::location.ilike(like_pattern(location)));
    }
    if let Some(tag) = filter.availability {
        let needle = serde_json::Value::Array(vec![serde_json::Value::String(tag.to_string())]);
        query = query.filter(sql::<Bool>("availability @> ").bind::<Jsonb, _>(needle));
    }

    query
}

/// Build the moderation listing predicate over every account.
fn accounts_query(filter: &AdminUserFilter) -> users::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = users::table.into_boxed();

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query = query.filter(
            users::display_name
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern)),
        );
    }
    if let Some(active) = filter.active {
        query = query.filter(users::is_active.eq(active));
    }

    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn save(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let new_row = user_to_new_row(user)?;

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email().to_string())
                } else {
                    map_diesel(err)
                }
            })
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let changeset = user_to_changeset(user)?;

        diesel::update(users::table.filter(users::id.eq(user.id().as_uuid())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email().to_string())
                } else {
                    map_diesel(err)
                }
            })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::email.eq(email.to_string()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn search_directory(
        &self,
        filter: &DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = directory_query(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<UserRow> = directory_query(filter)
            .order((users::created_at.desc(), users::id.desc()))
            .offset(page.offset())
            .limit(page.limit_i64())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn search_accounts(
        &self,
        filter: &AdminUserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = accounts_query(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<UserRow> = accounts_query(filter)
            .order((users::created_at.desc(), users::id.desc()))
            .offset(page.offset())
            .limit(page.limit_i64())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn count_active(&self) -> Result<u64, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = users::table
            .filter(users::is_active.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::id.desc()))
            .limit(i64::from(limit))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn created_timestamps(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<DateTime<Utc>>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = users::table.into_boxed();
        if let Some(from) = window.from {
            query = query.filter(users::created_at.ge(from));
        }
        if let Some(to) = window.to {
            query = query.filter(users::created_at.le(to));
        }

        query
            .select(users::created_at)
            .load(&mut conn)
            .await
            .map_err(map_diesel)
    }
}
