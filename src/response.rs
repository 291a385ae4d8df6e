//! Response body helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// `{"error": ...}`: a message string or a field-error map.
#[derive(Serialize)]
pub struct ErrorBody<E> {
    pub error: E,
}

/// `{"message": ...}`
#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn message(text: &str) -> (StatusCode, Json<MessageBody>) {
    (
        StatusCode::OK,
        Json(MessageBody {
            message: text.to_string(),
        }),
    )
}
