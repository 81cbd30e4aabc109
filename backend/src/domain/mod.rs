//! Domain primitives, aggregates, and application services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services that implement the driving ports
//! over repositories. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User (alias to `user::User`) — marketplace member aggregate.
//! - SwapRequest / Rating — the exchange lifecycle and its feedback.

pub mod admin_service;
pub mod auth;
pub mod directory_service;
pub mod error;
pub mod ports;
pub mod rating;
pub mod rating_service;
pub mod reporting;
pub mod skill;
pub mod swap;
pub mod swap_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PasswordChange, PasswordValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::skill::{SkillDescriptor, SkillDraft, SkillLevel, SkillValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
