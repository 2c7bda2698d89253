//! Handlers for `/person` endpoints.
//!
//! | Method   | Path           | Notes |
//! |----------|----------------|-------|
//! | `GET`    | `/person`      | Ordered by id |
//! | `POST`   | `/person`      | 201 with `Location`; 409 on a taken tax id |
//! | `GET`    | `/person/{id}` | 404 if not found |
//! | `PUT`    | `/person/{id}` | Full replacement; returns the stored record |
//! | `DELETE` | `/person/{id}` | 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::{StatusCode, header},
  response::IntoResponse,
};
use census_core::{
  person::{PersonId, PersonInput, PersonView},
  service::PersonService,
  store::PersonStore,
};
use mockable::Clock;

use crate::{API_PREFIX, error::ApiError};

type Service<S, C> = Arc<PersonService<S, C>>;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /person`
pub async fn list<S, C>(
  State(service): State<Service<S, C>>,
) -> Result<Json<Vec<PersonView>>, ApiError>
where
  S: PersonStore,
  C: Clock + Send + Sync,
{
  Ok(Json(service.list_persons().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /person`
pub async fn create<S, C>(
  State(service): State<Service<S, C>>,
  body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
  C: Clock + Send + Sync,
{
  let Json(input) = body?;
  let view = service.create_person(&input).await?;
  let location = format!("{API_PREFIX}/person/{}", view.id);
  Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(view)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /person/{id}`
pub async fn get_one<S, C>(
  State(service): State<Service<S, C>>,
  path: Result<Path<PersonId>, PathRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore,
  C: Clock + Send + Sync,
{
  let Path(id) = path?;
  Ok(Json(service.get_person(id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /person/{id}`
pub async fn update<S, C>(
  State(service): State<Service<S, C>>,
  path: Result<Path<PersonId>, PathRejection>,
  body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore,
  C: Clock + Send + Sync,
{
  let Path(id) = path?;
  let Json(input) = body?;
  Ok(Json(service.update_person(id, &input).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /person/{id}`
pub async fn delete<S, C>(
  State(service): State<Service<S, C>>,
  path: Result<Path<PersonId>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
  C: Clock + Send + Sync,
{
  let Path(id) = path?;
  service.delete_person(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
