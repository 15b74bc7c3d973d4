// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::api::ErrorEnvelope;

/// Failures raised while parsing or editing a contract record.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("field `{field}` is not valid for endpoint `{endpoint}`")]
    FieldNotAllowed { field: &'static str, endpoint: String },

    #[error("unknown option `{0}`")]
    UnknownField(String),

    #[error("option `{field}` expects {expected}")]
    InvalidValue { field: String, expected: &'static str },

    #[error("`{field}` and `{alias}` disagree")]
    ConflictingFields { field: &'static str, alias: &'static str },

    #[error("`{field}` is not an integer: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid timestamp `{value}`: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown endpoint `{0}`")]
    UnknownEndpoint(String),

    #[error("unknown plugin action `{0}`")]
    UnknownAction(String),

    #[error("unknown side `{0}`")]
    UnknownSide(String),

    #[error("`{field}` endpoint `{found}` does not match submission endpoint `{expected}`")]
    EndpointMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("preset has no endpoint")]
    MissingEndpoint,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown plugin `{0}`")]
    UnknownPlugin(String),

    #[error("example index {0} is out of range")]
    ExampleOutOfRange(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ContractResult<T> = Result<T, ContractError>;

/// For callbacks that cannot return an error: log it and move on.
pub trait LogRejected {
    fn log_rejected(self, action: &str);
}

impl LogRejected for ContractResult<()> {
    fn log_rejected(self, action: &str) {
        if let Err(err) = self {
            tracing::warn!(action, error = %err, "edit rejected");
        }
    }
}

/// Bad server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address `{value}`: {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Errors returned by the HTTP handlers. Rendered as an `ErrorEnvelope`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Contract(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorEnvelope::new(self.to_string(), Some(i64::from(status.as_u16())));
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_errors_map_to_bad_request() {
        let err = ApiError::from(ContractError::UnknownAction("remove".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "unknown plugin action `remove`");
    }

    #[test]
    fn not_found_status() {
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }
}
