//! The `PersonStore` trait.
//!
//! Implemented by storage backends (e.g. `census-store-sqlite`). The service
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::person::{NewPerson, Person, PersonId};

/// Lets the service layer tell apart the storage failures it can translate
/// into client-facing outcomes.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The write was rejected by the storage-level uniqueness constraint on the
  /// tax id.
  fn is_duplicate_tax_id(&self) -> bool;

  /// The targeted record no longer exists.
  fn is_not_found(&self) -> bool;
}

/// Abstraction over a person store backend.
///
/// The backend must enforce uniqueness of the canonical tax id on its own;
/// the validator's check is not atomic with the write.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: StoreError;

  /// Every stored person, ordered by id.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// The holder of a canonical (digits-only) tax id, if any.
  fn find_by_tax_id<'a>(
    &'a self,
    tax_id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Persist a validated person and return it with its assigned id.
  fn insert(
    &self,
    person: NewPerson,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Overwrite the stored row with the same id.
  fn update<'a>(
    &'a self,
    person: &'a Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove the stored row with the same id.
  fn delete<'a>(
    &'a self,
    person: &'a Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
