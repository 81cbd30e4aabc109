//! Shared application state passed to HTTP handlers.
//!
//! `HttpState` bundles the driving ports behind `Arc<dyn Trait>` so the
//! server can wire real services while handler tests substitute fixtures or
//! mocks without touching the handlers themselves.

use std::sync::Arc;

use crate::domain::ports::{
    AdminCommand, AdminQuery, DirectoryCommand, DirectoryQuery, FixtureAdminCommand,
    FixtureAdminQuery, FixtureDirectoryCommand, FixtureDirectoryQuery, FixtureLoginService,
    FixtureRatingCommand, FixtureRatingQuery, FixtureSwapCommand, FixtureSwapQuery, LoginService,
    RatingCommand, RatingQuery, SwapCommand, SwapQuery,
};

/// Parameter object bundling the driving ports for [`HttpState::new`].
///
/// # Examples
/// ```
/// use backend::inbound::http::state::{HttpState, HttpStatePorts};
///
/// let state = HttpState::new(HttpStatePorts::default());
/// let _ = state;
/// ```
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Authentication use-cases.
    pub login: Arc<dyn LoginService>,
    /// Member directory writes.
    pub directory: Arc<dyn DirectoryCommand>,
    /// Member directory reads.
    pub directory_query: Arc<dyn DirectoryQuery>,
    /// Swap lifecycle commands.
    pub swaps: Arc<dyn SwapCommand>,
    /// Swap reads.
    pub swaps_query: Arc<dyn SwapQuery>,
    /// Rating submission.
    pub ratings: Arc<dyn RatingCommand>,
    /// Rating reads.
    pub ratings_query: Arc<dyn RatingQuery>,
    /// Admin moderation commands.
    pub admin: Arc<dyn AdminCommand>,
    /// Admin dashboard, listings and reports.
    pub admin_query: Arc<dyn AdminQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            directory: Arc::new(FixtureDirectoryCommand),
            directory_query: Arc::new(FixtureDirectoryQuery),
            swaps: Arc::new(FixtureSwapCommand),
            swaps_query: Arc::new(FixtureSwapQuery),
            ratings: Arc::new(FixtureRatingCommand),
            ratings_query: Arc::new(FixtureRatingQuery),
            admin: Arc::new(FixtureAdminCommand),
            admin_query: Arc::new(FixtureAdminQuery),
        }
    }
}

/// Application state shared by every HTTP handler.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication use-cases.
    pub login: Arc<dyn LoginService>,
    /// Member directory writes.
    pub directory: Arc<dyn DirectoryCommand>,
    /// Member directory reads.
    pub directory_query: Arc<dyn DirectoryQuery>,
    /// Swap lifecycle commands.
    pub swaps: Arc<dyn SwapCommand>,
    /// Swap reads.
    pub swaps_query: Arc<dyn SwapQuery>,
    /// Rating submission.
    pub ratings: Arc<dyn RatingCommand>,
    /// Rating reads.
    pub ratings_query: Arc<dyn RatingQuery>,
    /// Admin moderation commands.
    pub admin: Arc<dyn AdminCommand>,
    /// Admin dashboard, listings and reports.
    pub admin_query: Arc<dyn AdminQuery>,
}

impl HttpState {
    /// Construct state from the supplied ports.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            directory,
            directory_query,
            swaps,
            swaps_query,
            ratings,
            ratings_query,
            admin,
            admin_query,
        } = ports;
        Self {
            login,
            directory,
            directory_query,
            swaps,
            swaps_query,
            ratings,
            ratings_query,
            admin,
            admin_query,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
