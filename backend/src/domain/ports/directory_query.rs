//! Driving port for member directory reads.

use async_trait::async_trait;
use chrono::DateTime;
use pagination::{Page, PageRequest};
use serde::Serialize;
use utoipa::ToSchema;

use super::user_repository::DirectoryFilter;
use crate::domain::rating::RatingView;
use crate::domain::user::{
    AccountView, CredentialHash, DisplayName, EmailAddress, NewUser, PublicProfile, User,
};
use crate::domain::{Error, UserId};

/// A member profile together with their latest received ratings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileResponse {
    /// Public profile fields.
    pub profile: PublicProfile,
    /// Most recent ratings received, newest first.
    pub recent_ratings: Vec<RatingView>,
}

/// Driving port for member directory read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    /// Search active public members, newest first.
    async fn search(
        &self,
        filter: DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<PublicProfile>, Error>;

    /// Fetch one member's profile with their recent ratings.
    ///
    /// Private profiles are forbidden to everyone except their owner.
    async fn profile(&self, user_id: UserId, viewer: UserId) -> Result<GetProfileResponse, Error>;

    /// Fetch the caller's own account view.
    async fn account(&self, user_id: UserId) -> Result<AccountView, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDirectoryQuery;

#[async_trait]
impl DirectoryQuery for FixtureDirectoryQuery {
    async fn search(
        &self,
        _filter: DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<PublicProfile>, Error> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn profile(
        &self,
        user_id: UserId,
        _viewer: UserId,
    ) -> Result<GetProfileResponse, Error> {
        Err(Error::not_found(format!("member {user_id} not found")))
    }

    async fn account(&self, _user_id: UserId) -> Result<AccountView, Error> {
        let display_name = DisplayName::new("Ada Lovelace")
            .map_err(|err| Error::internal(format!("invalid fixture display name: {err}")))?;
        let email = EmailAddress::new("ada@example.com")
            .map_err(|err| Error::internal(format!("invalid fixture email: {err}")))?;
        let credential = CredentialHash::new("plain$open sesame")
            .map_err(|err| Error::internal(format!("invalid fixture credential: {err}")))?;
        let user = User::new(NewUser {
            id: UserId::random(),
            display_name,
            email,
            credential,
            now: DateTime::UNIX_EPOCH,
        });
        Ok(user.account_view())
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
    async fn fixture_search_returns_an_empty_page() {
        let query = FixtureDirectoryQuery;

        let page = query
            .search(DirectoryFilter::default(), PageRequest::default())
            .await
            .expect("fixture search succeeds");

        assert!(page.items.is_empty());
        assert_eq!(page.page_info.total_items, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_profile_is_not_found() {
        let query = FixtureDirectoryQuery;

        let error = query
            .profile(UserId::random(), UserId::random())
            .await
            .expect_err("fixture profile fails");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_account_returns_the_fixture_member() {
        let query = FixtureDirectoryQuery;

        let account = query
            .account(UserId::random())
            .await
            .expect("fixture account succeeds");

        assert_eq!(account.email, "ada@example.com");
    }
}
