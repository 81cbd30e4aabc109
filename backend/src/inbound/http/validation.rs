//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers translate raw payload fields into validated domain types here so
//! every endpoint reports field-level failures with the same error shape.

use std::fmt;
use std::str::FromStr;

use pagination::{PageRequest, PageRequestError};
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidValue,
    InvalidPagination,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidPagination => "invalid_pagination",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

/// Reject a field with the display form of its domain validation error.
pub(crate) fn invalid_field_error(field: FieldName, cause: &impl fmt::Display) -> Error {
    field_error(field, format!("{}: {cause}", field.as_str()), ErrorCode::InvalidValue)
}

/// Parse a UUID-backed identifier from a path or payload string.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
{
    value.parse().map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
        )
    })
}

/// Parse an enum-like query or payload value through its domain `FromStr`.
pub(crate) fn parse_label<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|err: T::Err| invalid_field_error(field, &err))
}

/// Build a pagination window from optional `page`/`limit` query parameters.
pub(crate) fn page_request(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::from_params(page, limit).map_err(|err: PageRequestError| {
        field_error(
            FieldName::new("page"),
            err.to_string(),
            ErrorCode::InvalidPagination,
        )
    })
}
