//! Driving port for rating reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::rating::RatingView;
use crate::domain::{Error, UserId};

/// Driving port for rating read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingQuery: Send + Sync {
    /// List ratings received by the given member, newest first.
    async fn list_received(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<RatingView>, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRatingQuery;

#[async_trait]
impl RatingQuery for FixtureRatingQuery {
    async fn list_received(
        &self,
        _user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<RatingView>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }
}
