//! Builders wiring domain services to configured adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use crate::domain::admin_service::{AdminCommandService, AdminQueryService};
use crate::domain::directory_service::{DirectoryCommandService, DirectoryQueryService};
use crate::domain::ports::{RatingRepository, SwapNotifier, SwapRepository, UserRepository};
use crate::domain::rating_service::{RatingCommandService, RatingQueryService};
use crate::domain::swap_service::{SwapCommandService, SwapQueryService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::notify::{TracingSwapNotifier, WebhookSwapNotifier};
use crate::outbound::persistence::{
    DieselRatingRepository, DieselSwapRepository, DieselUserRepository, MemoryRatingRepository,
    MemorySwapRepository, MemoryUserRepository,
};
use crate::outbound::security::SaltedSha256CredentialHasher;

use super::ServerConfig;

/// Assemble the HTTP port set over the given repository trio.
///
/// The directory command service doubles as the login port, so both fields
/// share one instance and a single hasher.
fn build_ports<U, S, R, N>(
    user_repo: Arc<U>,
    swap_repo: Arc<S>,
    rating_repo: Arc<R>,
    notifier: Arc<N>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
    R: RatingRepository + 'static,
    N: SwapNotifier + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(SaltedSha256CredentialHasher::new());
    let directory = Arc::new(DirectoryCommandService::new(
        Arc::clone(&user_repo),
        hasher,
        Arc::clone(&clock),
    ));

    HttpStatePorts {
        login: Arc::clone(&directory) as _,
        directory,
        directory_query: Arc::new(DirectoryQueryService::new(
            Arc::clone(&user_repo),
            Arc::clone(&rating_repo),
        )),
        swaps: Arc::new(SwapCommandService::new(
            Arc::clone(&user_repo),
            Arc::clone(&swap_repo),
            notifier,
            Arc::clone(&clock),
        )),
        swaps_query: Arc::new(SwapQueryService::new(
            Arc::clone(&swap_repo),
            Arc::clone(&user_repo),
        )),
        ratings: Arc::new(RatingCommandService::new(
            Arc::clone(&user_repo),
            Arc::clone(&swap_repo),
            Arc::clone(&rating_repo),
            Arc::clone(&clock),
        )),
        ratings_query: Arc::new(RatingQueryService::new(Arc::clone(&rating_repo))),
        admin: Arc::new(AdminCommandService::new(
            Arc::clone(&user_repo),
            Arc::clone(&rating_repo),
            clock,
        )),
        admin_query: Arc::new(AdminQueryService::new(user_repo, swap_repo, rating_repo)),
    }
}

/// Pick the swap notifier from configuration.
///
/// With a webhook endpoint the recipient is notified over HTTP; without one
/// notifications are logged and dropped.
fn connect_ports<U, S, R>(
    config: &ServerConfig,
    user_repo: Arc<U>,
    swap_repo: Arc<S>,
    rating_repo: Arc<R>,
) -> std::io::Result<HttpStatePorts>
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
    R: RatingRepository + 'static,
{
    match &config.swap_webhook {
        Some(endpoint) => {
            let notifier = WebhookSwapNotifier::new(endpoint.clone()).map_err(|err| {
                std::io::Error::other(format!("swap webhook client construction failed: {err}"))
            })?;
            Ok(build_ports(
                user_repo,
                swap_repo,
                rating_repo,
                Arc::new(notifier),
            ))
        }
        None => Ok(build_ports(
            user_repo,
            swap_repo,
            rating_repo,
            Arc::new(TracingSwapNotifier),
        )),
    }
}

/// Build the shared HTTP state from configuration.
///
/// A configured database pool selects the SQL-backed repositories; otherwise
/// the in-memory adapters serve development and end-to-end tests.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ports = match &config.db_pool {
        Some(pool) => connect_ports(
            config,
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselSwapRepository::new(pool.clone())),
            Arc::new(DieselRatingRepository::new(pool.clone())),
        )?,
        None => connect_ports(
            config,
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemorySwapRepository::new()),
            Arc::new(MemoryRatingRepository::new()),
        )?,
    };
    Ok(web::Data::new(HttpState::new(ports)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::net::SocketAddr;

    use actix_web::cookie::{Key, SameSite};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::RegisterMemberRequest;
    use crate::domain::user::DisplayName;
    use crate::domain::{EmailAddress, ErrorCode, LoginCredentials, NewPassword};

    #[fixture]
    fn memory_config() -> ServerConfig {
        let bind_addr: SocketAddr = "127.0.0.1:0".parse().expect("loopback address");
        ServerConfig::new(Key::generate(), false, SameSite::Lax, bind_addr)
    }

    fn registration(email: &str) -> RegisterMemberRequest {
        RegisterMemberRequest {
            display_name: DisplayName::new("Grace Hopper").expect("valid name"),
            email: EmailAddress::new(email).expect("valid email"),
            password: NewPassword::new("correct horse battery").expect("valid password"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_registers_and_authenticates(memory_config: ServerConfig) {
        let state = build_http_state(&memory_config).expect("state builds");

        let account = state
            .directory
            .register(registration("grace@example.com"))
            .await
            .expect("registration succeeds");

        let credentials = LoginCredentials::try_from_parts("grace@example.com", "correct horse battery")
            .expect("valid credentials");
        let user_id = state
            .login
            .authenticate(&credentials)
            .await
            .expect("authentication succeeds");
        assert_eq!(user_id, account.id);
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_rejects_wrong_password(memory_config: ServerConfig) {
        let state = build_http_state(&memory_config).expect("state builds");
        state
            .directory
            .register(registration("margaret@example.com"))
            .await
            .expect("registration succeeds");

        let credentials = LoginCredentials::try_from_parts("margaret@example.com", "not the password")
            .expect("valid credentials");
        let error = state
            .login
            .authenticate(&credentials)
            .await
            .err()
            .expect("authentication fails");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_rejects_unknown_dashboard_actor(memory_config: ServerConfig) {
        let state = build_http_state(&memory_config).expect("state builds");
        let error = state
            .admin_query
            .dashboard(crate::domain::UserId::random())
            .await
            .err()
            .expect("unknown actor is rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn webhook_endpoint_selects_http_notifier(memory_config: ServerConfig) {
        let endpoint = reqwest::Url::parse("http://127.0.0.1:9/hooks/swaps").expect("valid url");
        let config = memory_config.with_swap_webhook(endpoint);
        build_http_state(&config).expect("state builds with webhook notifier");
    }
}
