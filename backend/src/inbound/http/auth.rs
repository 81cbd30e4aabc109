//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"displayName":"Ada","email":"ada@example.com","password":"open sesame"}
//! POST /api/v1/auth/login    {"email":"ada@example.com","password":"open sesame"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! PUT  /api/v1/auth/password {"currentPassword":"...","newPassword":"..."}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::auth::{LoginValidationError, PasswordChange, PasswordValidationError};
use crate::domain::ports::RegisterMemberRequest;
use crate::domain::user::{AccountView, DisplayName, EmailAddress};
use crate::domain::{Error, LoginCredentials, NewPassword};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error};

/// Registration request body for `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Public display name.
    pub display_name: String,
    /// Login email address.
    pub email: String,
    /// Plaintext password, at least six characters.
    pub password: String,
}

impl TryFrom<RegisterRequest> for RegisterMemberRequest {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let display_name = DisplayName::new(value.display_name)
            .map_err(|err| invalid_field_error(FieldName::new("displayName"), &err))?;
        let email = EmailAddress::new(value.email)
            .map_err(|err| invalid_field_error(FieldName::new("email"), &err))?;
        let password = NewPassword::new(&value.password)
            .map_err(|err| invalid_field_error(FieldName::new("password"), &err))?;
        Ok(Self {
            display_name,
            email,
            password,
        })
    }
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password).map_err(map_login_validation_error)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::InvalidEmail => FieldName::new("email"),
        LoginValidationError::EmptyPassword => FieldName::new("password"),
    };
    invalid_field_error(field, &err)
}

/// Password change request body for `PUT /api/v1/auth/password`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Password currently on file.
    pub current_password: String,
    /// Replacement password, at least six characters.
    pub new_password: String,
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.current_password, &value.new_password)
            .map_err(map_password_validation_error)
    }
}

fn map_password_validation_error(err: PasswordValidationError) -> Error {
    let field = match err {
        PasswordValidationError::EmptyCurrentPassword => FieldName::new("currentPassword"),
        PasswordValidationError::TooShort { .. } => FieldName::new("newPassword"),
    };
    invalid_field_error(field, &err)
}

/// Register a new member and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Member registered", body = AccountView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = RegisterMemberRequest::try_from(payload.into_inner())?;
    let account = state.directory.register(request).await?;
    session.persist_user(account.id)?;
    Ok(HttpResponse::Created().json(account))
}

/// Authenticate a member and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AccountView, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AccountView>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(user_id)?;
    let account = state.directory_query.account(user_id).await?;
    Ok(web::Json(account))
}

/// Drop the session and invalidate the cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.forget_user();
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch the calling member's own account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Calling member's account", body = AccountView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccountView>> {
    let user_id = session.require_user_id()?;
    let account = state.directory_query.account(user_id).await?;
    Ok(web::Json(account))
}

/// Replace the calling member's password.
#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised or wrong current password", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[put("/auth/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.directory.change_password(user_id, change).await?;
    Ok(HttpResponse::NoContent().finish())
}
