//! Typed errors and HTTP mapping.

use crate::response::{ErrorBody, MessageBody};
use crate::service::FieldErrors;
use crate::store::{ConstraintKind, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: table {table} column {column}")]
    InvalidPrimaryKey { table: String, column: String },
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    NotFound(String),
    /// Lookup by id failed on a mutating route.
    #[error("Invalid {entity} id")]
    InvalidId { entity: &'static str },
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("Request body too large")]
    PayloadTooLarge,
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Store(e.into())
    }
}

const INTERNAL_ERROR: &str = "Internal server error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: errors })).into_response()
            }
            AppError::InvalidId { .. } => (
                StatusCode::BAD_REQUEST,
                Json(MessageBody { message: self.to_string() }),
            )
                .into_response(),
            AppError::Store(StoreError::Constraint(violation)) => {
                let status = match violation.kind {
                    ConstraintKind::Unique
                    | ConstraintKind::ForeignKeyMissing
                    | ConstraintKind::ForeignKeyReferenced => StatusCode::CONFLICT,
                    ConstraintKind::NotNull | ConstraintKind::Check => StatusCode::BAD_REQUEST,
                };
                tracing::debug!(constraint = ?violation.constraint, kind = ?violation.kind, "constraint violation");
                (status, Json(ErrorBody { error: violation.to_string() })).into_response()
            }
            AppError::Store(StoreError::Db(e)) => {
                tracing::error!(error = %e, "database error");
                internal_error()
            }
            AppError::Store(e @ StoreError::SequenceExhausted(_)) => {
                tracing::error!(error = %e, "id sequence exhausted");
                internal_error()
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                internal_error()
            }
            AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: self.to_string() })).into_response()
            }
            AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: self.to_string() })).into_response()
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody { error: self.to_string() }),
            )
                .into_response(),
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { error: INTERNAL_ERROR }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::USER_EMAIL_UNIQUE;
    use crate::store::ConstraintViolation;

    #[test]
    fn constraint_violations_map_to_conflict() {
        let err = AppError::Store(StoreError::Constraint(ConstraintViolation {
            kind: ConstraintKind::Unique,
            constraint: Some(USER_EMAIL_UNIQUE.into()),
        }));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_id_reads_like_the_entity() {
        let err = AppError::InvalidId { entity: "user" };
        assert_eq!(err.to_string(), "Invalid user id");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_are_internal() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn exhausted_sequences_are_internal() {
        let err = AppError::Store(StoreError::SequenceExhausted("user"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
