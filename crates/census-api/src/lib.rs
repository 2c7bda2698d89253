//! JSON REST API for Census.
//!
//! Exposes an axum [`Router`] backed by a [`PersonService`] over any
//! [`census_core::store::PersonStore`]. TLS, CORS and request tracing are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = census_api::router(Arc::new(service));
//! ```

pub mod error;
pub mod persons;

use std::sync::Arc;

use axum::{Router, routing::get};
use census_core::{service::PersonService, store::PersonStore};
use mockable::Clock;

pub use error::ApiError;

/// Path prefix under which [`router`] mounts the API.
pub const API_PREFIX: &str = "/api";

/// Build the person routes for `service`, without a prefix.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(service: Arc<PersonService<S, C>>) -> Router<()>
where
  S: PersonStore + 'static,
  C: Clock + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/person",
      get(persons::list::<S, C>).post(persons::create::<S, C>),
    )
    .route(
      "/person/{id}",
      get(persons::get_one::<S, C>)
        .put(persons::update::<S, C>)
        .delete(persons::delete::<S, C>),
    )
    .with_state(service)
}

/// [`api_router`] nested under [`API_PREFIX`].
pub fn router<S, C>(service: Arc<PersonService<S, C>>) -> Router<()>
where
  S: PersonStore + 'static,
  C: Clock + Send + Sync + 'static,
{
  Router::new().nest(API_PREFIX, api_router(service))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use mockable::DefaultClock;
  use census_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(PersonService::new(store, DefaultClock)))
  }

  struct Reply {
    status:   StatusCode,
    location: Option<String>,
    body:     Value,
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let location = resp
      .headers()
      .get(header::LOCATION)
      .map(|v| v.to_str().unwrap().to_owned());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    Reply { status, location, body }
  }

  fn ana() -> Value {
    json!({
      "name":      "Ana Silva",
      "taxId":     "111.444.777-35",
      "birthDate": "1990-01-01",
      "email":     "ana@example.com",
    })
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_location() {
    let app = app().await;
    let reply = send(&app, "POST", "/api/person", Some(ana())).await;

    assert_eq!(reply.status, StatusCode::CREATED);
    let id = reply.body["id"].as_i64().unwrap();
    assert_eq!(reply.location, Some(format!("/api/person/{id}")));
    assert_eq!(reply.body["taxId"], "11144477735");
    assert_eq!(reply.body["birthDate"], "1990-01-01T00:00:00.000Z");
    assert_eq!(reply.body["createdAt"], reply.body["updatedAt"]);
  }

  #[tokio::test]
  async fn create_accepts_legacy_cpf_key() {
    let app = app().await;
    let body = json!({
      "name":      "Bruno Costa",
      "cpf":       "52998224725",
      "birthDate": "1985-07-14",
    });
    let reply = send(&app, "POST", "/api/person", Some(body)).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["taxId"], "52998224725");
  }

  #[tokio::test]
  async fn create_missing_name_is_400_with_kind_and_field() {
    let app = app().await;
    let body = json!({ "birthDate": "1990-01-01" });
    let reply = send(&app, "POST", "/api/person", Some(body)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["kind"], "required_field");
    assert_eq!(reply.body["field"], "name");
    assert_eq!(reply.body["error"], "name is required");
  }

  #[tokio::test]
  async fn create_bad_checksum_is_400() {
    let app = app().await;
    let mut body = ana();
    body["taxId"] = json!("11144477736");
    let reply = send(&app, "POST", "/api/person", Some(body)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["kind"], "invalid_format");
    assert_eq!(reply.body["field"], "taxId");
  }

  #[tokio::test]
  async fn create_duplicate_is_409() {
    let app = app().await;
    send(&app, "POST", "/api/person", Some(ana())).await;
    let reply = send(&app, "POST", "/api/person", Some(ana())).await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["kind"], "duplicate");
    assert_eq!(reply.body["field"], "taxId");
  }

  #[tokio::test]
  async fn malformed_json_is_400_without_kind() {
    let app = app().await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/person")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert!(body.get("kind").is_none());
  }

  #[tokio::test]
  async fn non_numeric_id_is_400_json() {
    let app = app().await;
    for method in ["GET", "DELETE"] {
      let reply = send(&app, method, "/api/person/abc", None).await;
      assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{method}");
      assert!(reply.body["error"].is_string(), "{method}");
      assert!(reply.body.get("kind").is_none());
    }
    let reply = send(&app, "PUT", "/api/person/abc", Some(ana())).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["error"].is_string());
  }

  // ── Read ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_and_get_one() {
    let app = app().await;
    assert_eq!(send(&app, "GET", "/api/person", None).await.body, json!([]));

    let created = send(&app, "POST", "/api/person", Some(ana())).await;
    let id = created.body["id"].as_i64().unwrap();

    let list = send(&app, "GET", "/api/person", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body.as_array().unwrap().len(), 1);

    let one = send(&app, "GET", &format!("/api/person/{id}"), None).await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body, created.body);
  }

  #[tokio::test]
  async fn get_missing_is_404() {
    let app = app().await;
    let reply = send(&app, "GET", "/api/person/999", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "person 999 not found");
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_returns_stored_record() {
    let app = app().await;
    let created = send(&app, "POST", "/api/person", Some(ana())).await;
    let id = created.body["id"].as_i64().unwrap();

    let mut body = ana();
    body["nationality"] = json!("Brazilian");
    let reply =
      send(&app, "PUT", &format!("/api/person/{id}"), Some(body)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["id"], id);
    assert_eq!(reply.body["nationality"], "Brazilian");
    assert_eq!(reply.body["createdAt"], created.body["createdAt"]);
  }

  #[tokio::test]
  async fn update_missing_is_404() {
    let app = app().await;
    let reply = send(&app, "PUT", "/api/person/5", Some(ana())).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_to_taken_tax_id_is_409() {
    let app = app().await;
    send(&app, "POST", "/api/person", Some(ana())).await;
    let bruno = json!({
      "name":      "Bruno Costa",
      "taxId":     "52998224725",
      "birthDate": "1985-07-14",
    });
    let created = send(&app, "POST", "/api/person", Some(bruno.clone())).await;
    let id = created.body["id"].as_i64().unwrap();

    let mut body = bruno;
    body["taxId"] = json!("11144477735");
    let reply =
      send(&app, "PUT", &format!("/api/person/{id}"), Some(body)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_returns_204_then_404() {
    let app = app().await;
    let created = send(&app, "POST", "/api/person", Some(ana())).await;
    let uri = format!("/api/person/{}", created.body["id"]);

    let first = send(&app, "DELETE", &uri, None).await;
    assert_eq!(first.status, StatusCode::NO_CONTENT);
    assert_eq!(first.body, Value::Null);

    let second = send(&app, "DELETE", &uri, None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    assert_eq!(
      send(&app, "GET", &uri, None).await.status,
      StatusCode::NOT_FOUND
    );
  }
}
