//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use census_core::{
  ServiceError, ValidationError, person::PersonId, store::StoreError,
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("person {0} not found")]
  NotFound(PersonId),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<E: StoreError> From<ServiceError<E>> for ApiError {
  fn from(err: ServiceError<E>) -> Self {
    match err {
      ServiceError::Validation(v) => Self::Validation(v),
      ServiceError::NotFound(id) => Self::NotFound(id),
      ServiceError::Store(e) => Self::Store(Box::new(e)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    match self {
      ApiError::Validation(v) => {
        let status = match v {
          ValidationError::Duplicate(_) => StatusCode::CONFLICT,
          _ => StatusCode::BAD_REQUEST,
        };
        let body = json!({
          "error": message,
          "kind":  v.kind(),
          "field": v.field(),
        });
        (status, Json(body)).into_response()
      }
      ApiError::NotFound(_) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": message })))
          .into_response()
      }
      ApiError::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
          .into_response()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": message })),
        )
          .into_response()
      }
    }
  }
}
