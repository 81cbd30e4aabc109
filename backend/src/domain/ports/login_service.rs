//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure. This makes HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown email, wrong password and deactivated accounts all fail with
    /// the same unauthorized error so responses do not leak which part was
    /// wrong.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// In-memory authenticator for tests and fixture wiring.
///
/// `ada@example.com` / `open sesame` authenticates successfully and produces
/// a fixed user id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

/// Stable identifier produced by [`FixtureLoginService`].
pub const FIXTURE_LOGIN_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.email().as_ref() == "ada@example.com"
            && credentials.password() == "open sesame"
        {
            FIXTURE_LOGIN_USER_ID
                .parse()
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case("ada@example.com", "open sesame", true)]
    #[case("ada@example.com", "wrong", false)]
    #[case("grace@example.com", "open sesame", false)]
    #[tokio::test]
    async fn fixture_login_service_authenticates_only_the_fixture_member(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let service = FixtureLoginService;
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = service.authenticate(&creds).await;
        match (should_succeed, result) {
            (true, Ok(id)) => assert_eq!(id.to_string(), FIXTURE_LOGIN_USER_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(id)) => panic!("expected failure, got success: {id}"),
        }
    }
}
