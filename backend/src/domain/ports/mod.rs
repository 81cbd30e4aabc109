//! Domain ports and supporting types for the hexagonal boundary.

mod admin_command;
mod admin_query;
mod credential_hasher;
mod directory_command;
mod directory_query;
mod login_service;
mod rating_command;
mod rating_query;
mod rating_repository;
mod swap_command;
mod swap_notifier;
mod swap_query;
mod swap_repository;
mod user_repository;

#[cfg(test)]
pub use admin_command::MockAdminCommand;
pub use admin_command::{
    AdminCommand, BroadcastRequest, FixtureAdminCommand, SetRatingFlagRequest,
    SetUserStatusRequest,
};
#[cfg(test)]
pub use admin_query::MockAdminQuery;
pub use admin_query::{AdminQuery, FixtureAdminQuery};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError, FixtureCredentialHasher};
#[cfg(test)]
pub use directory_command::MockDirectoryCommand;
pub use directory_command::{DirectoryCommand, FixtureDirectoryCommand, RegisterMemberRequest};
#[cfg(test)]
pub use directory_query::MockDirectoryQuery;
pub use directory_query::{DirectoryQuery, FixtureDirectoryQuery, GetProfileResponse};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_LOGIN_USER_ID, FixtureLoginService, LoginService};
#[cfg(test)]
pub use rating_command::MockRatingCommand;
pub use rating_command::{FixtureRatingCommand, RatingCommand, SubmitRatingRequest};
#[cfg(test)]
pub use rating_query::MockRatingQuery;
pub use rating_query::{FixtureRatingQuery, RatingQuery};
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{
    FixtureRatingRepository, RatingRepository, RatingRepositoryError, RatingTotals,
};
#[cfg(test)]
pub use swap_command::MockSwapCommand;
pub use swap_command::{
    AcceptSwapRequest, CancelSwapRequest, CompleteSwapRequest, CreateSwapRequest,
    FixtureSwapCommand, RejectSwapRequest, SwapCommand,
};
#[cfg(test)]
pub use swap_notifier::MockSwapNotifier;
pub use swap_notifier::{FixtureSwapNotifier, SwapNotifier, SwapNotifierError};
#[cfg(test)]
pub use swap_query::MockSwapQuery;
pub use swap_query::{FixtureSwapQuery, SwapQuery};
#[cfg(test)]
pub use swap_repository::MockSwapRepository;
pub use swap_repository::{
    FixtureSwapRepository, ParseSwapRoleError, SwapListFilter, SwapRepository,
    SwapRepositoryError, SwapRole, SwapTotals,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    AdminUserFilter, DirectoryFilter, FixtureUserRepository, UserRepository, UserRepositoryError,
};
