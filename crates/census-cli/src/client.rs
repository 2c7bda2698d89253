//! Async HTTP client wrapping the census JSON API.

use std::{str::FromStr as _, time::Duration};

use anyhow::{Context, Result};
use census_core::{
  Field,
  person::{PersonId, PersonInput, PersonView},
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Connection settings for the census API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// A non-success reply from the server, decoded from its JSON error body
/// when there is one.
#[derive(Debug, Error)]
#[error("{message} ({status})")]
pub struct ApiFailure {
  pub status:  StatusCode,
  pub message: String,
  /// The rejected field, for validation failures.
  pub field:   Option<Field>,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
  field: Option<String>,
}

/// Async HTTP client for the census JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// `GET /api/person`
  pub async fn list_persons(&self) -> Result<Vec<PersonView>> {
    let resp = self
      .client
      .get(self.url("/person"))
      .send()
      .await
      .context("GET /person failed")?;
    check(resp).await?.json().await.context("deserialising persons")
  }

  /// `GET /api/person/{id}`
  pub async fn get_person(&self, id: PersonId) -> Result<PersonView> {
    let resp = self
      .client
      .get(self.url(&format!("/person/{id}")))
      .send()
      .await
      .with_context(|| format!("GET /person/{id} failed"))?;
    check(resp).await?.json().await.context("deserialising person")
  }

  /// `POST /api/person`
  pub async fn create_person(&self, input: &PersonInput) -> Result<PersonView> {
    let resp = self
      .client
      .post(self.url("/person"))
      .json(input)
      .send()
      .await
      .context("POST /person failed")?;
    check(resp).await?.json().await.context("deserialising person")
  }

  /// `PUT /api/person/{id}`
  pub async fn update_person(
    &self,
    id: PersonId,
    input: &PersonInput,
  ) -> Result<PersonView> {
    let resp = self
      .client
      .put(self.url(&format!("/person/{id}")))
      .json(input)
      .send()
      .await
      .with_context(|| format!("PUT /person/{id} failed"))?;
    check(resp).await?.json().await.context("deserialising person")
  }

  /// `DELETE /api/person/{id}`
  pub async fn delete_person(&self, id: PersonId) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/person/{id}")))
      .send()
      .await
      .with_context(|| format!("DELETE /person/{id} failed"))?;
    check(resp).await?;
    Ok(())
  }
}

/// Pass a successful response through; turn anything else into an
/// [`ApiFailure`].
async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(failure_from_body(status, &body).into())
}

fn failure_from_body(status: StatusCode, body: &str) -> ApiFailure {
  match serde_json::from_str::<ErrorBody>(body) {
    Ok(b) => ApiFailure {
      status,
      message: b.error,
      field: b.field.as_deref().and_then(|f| Field::from_str(f).ok()),
    },
    Err(_) => ApiFailure {
      status,
      message: status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string(),
      field: None,
    },
  }
}
