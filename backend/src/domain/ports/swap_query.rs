//! Driving port for swap request reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::swap_repository::SwapListFilter;
use crate::domain::swap::{SwapId, SwapView};
use crate::domain::{Error, UserId};

/// Driving port for swap read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapQuery: Send + Sync {
    /// Fetch one swap. Only its participants may view it.
    async fn get(&self, swap_id: SwapId, viewer: UserId) -> Result<SwapView, Error>;

    /// List the given member's swaps, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapView>, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSwapQuery;

#[async_trait]
impl SwapQuery for FixtureSwapQuery {
    async fn get(&self, swap_id: SwapId, _viewer: UserId) -> Result<SwapView, Error> {
        Err(Error::not_found(format!(
            "swap request {swap_id} not found"
        )))
    }

    async fn list_for_user(
        &self,
        _user_id: UserId,
        _filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapView>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[tokio::test]
    async fn fixture_get_is_not_found() {
        let query = FixtureSwapQuery;

        let error = query
            .get(SwapId::random(), UserId::random())
            .await
            .expect_err("fixture get fails");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_list_returns_an_empty_page() {
        let query = FixtureSwapQuery;

        let page = query
            .list_for_user(
                UserId::random(),
                SwapListFilter::default(),
                PageRequest::default(),
            )
            .await
            .expect("fixture list succeeds");

        assert!(page.items.is_empty());
        assert_eq!(page.page_info.total_items, 0);
    }
}
