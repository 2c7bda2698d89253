//! Error types for `census-core`.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::person::PersonId;

/// A person field that carries a business rule, named as the JSON API names
/// it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Display,
  AsRefStr,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
  Name,
  TaxId,
  BirthDate,
  Email,
}

/// The first business rule a candidate record failed.
///
/// Exactly one is ever reported per candidate; rules are evaluated in a fixed
/// order and evaluation stops at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  RequiredField(Field),

  #[error("{0} is not valid")]
  InvalidFormat(Field),

  #[error("{0} is outside the allowed range")]
  InvalidRange(Field),

  #[error("{0} is already registered")]
  Duplicate(Field),
}

impl ValidationError {
  /// Machine-readable rule tag, used in API error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::RequiredField(_) => "required_field",
      Self::InvalidFormat(_) => "invalid_format",
      Self::InvalidRange(_) => "invalid_range",
      Self::Duplicate(_) => "duplicate",
    }
  }

  /// The offending field.
  pub fn field(&self) -> Field {
    match *self {
      Self::RequiredField(f)
      | Self::InvalidFormat(f)
      | Self::InvalidRange(f)
      | Self::Duplicate(f) => f,
    }
  }
}

/// Failure of a [`crate::service::PersonService`] operation.
#[derive(Debug, Error)]
pub enum ServiceError<E>
where
  E: std::error::Error + 'static,
{
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("person not found: {0}")]
  NotFound(PersonId),

  #[error("store error: {0}")]
  Store(#[source] E),
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn field_names_match_the_json_api() {
    assert_eq!(Field::TaxId.to_string(), "taxId");
    assert_eq!(Field::BirthDate.as_ref(), "birthDate");
    assert_eq!(Field::from_str("email").unwrap(), Field::Email);
  }

  #[test]
  fn messages_name_the_field() {
    assert_eq!(
      ValidationError::RequiredField(Field::Name).to_string(),
      "name is required"
    );
    assert_eq!(
      ValidationError::Duplicate(Field::TaxId).to_string(),
      "taxId is already registered"
    );
  }

  #[test]
  fn kind_and_field_accessors() {
    let err = ValidationError::InvalidRange(Field::BirthDate);
    assert_eq!(err.kind(), "invalid_range");
    assert_eq!(err.field(), Field::BirthDate);
  }
}
