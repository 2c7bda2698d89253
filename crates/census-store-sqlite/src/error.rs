//! Error type for `census-store-sqlite`.

use census_core::{person::PersonId, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The `UNIQUE` index on `persons.tax_id` rejected a write.
  #[error("tax id {0} is already registered")]
  DuplicateTaxId(String),

  #[error("person not found: {0}")]
  PersonNotFound(PersonId),
}

impl Error {
  /// Classify a failed write, singling out unique-index violations.
  pub(crate) fn from_write(err: tokio_rusqlite::Error, tax_id: &str) -> Self {
    match &err {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
      {
        Error::DuplicateTaxId(tax_id.to_owned())
      }
      _ => Error::Database(err),
    }
  }
}

impl StoreError for Error {
  fn is_duplicate_tax_id(&self) -> bool { matches!(self, Error::DuplicateTaxId(_)) }

  fn is_not_found(&self) -> bool { matches!(self, Error::PersonNotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
