//! Person records at each stage of their life: raw candidate, validated
//! record, stored record, and outward-facing view.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate identifier assigned by the store on insert.
pub type PersonId = i64;

// ─── Candidate ───────────────────────────────────────────────────────────────

/// Field values as received from a client, not yet trusted.
///
/// Every field is optional at this stage; the validator decides which
/// absences are errors. `taxId` is also accepted under its legacy name `cpf`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonInput {
  pub name:           Option<String>,
  pub gender:         Option<String>,
  pub email:          Option<String>,
  /// `YYYY-MM-DD`, or an RFC 3339 timestamp with an explicit offset.
  pub birth_date:     Option<String>,
  pub place_of_birth: Option<String>,
  pub nationality:    Option<String>,
  #[serde(alias = "cpf")]
  pub tax_id:         Option<String>,
}

// ─── Validated ───────────────────────────────────────────────────────────────

/// A candidate that passed every rule: text trimmed, blanks dropped, tax id
/// reduced to its eleven digits, birth date pinned to UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub name:           String,
  pub gender:         Option<String>,
  pub email:          Option<String>,
  pub birth_date:     DateTime<Utc>,
  pub place_of_birth: Option<String>,
  pub nationality:    Option<String>,
  pub tax_id:         String,
}

impl From<NewPerson> for PersonInput {
  fn from(p: NewPerson) -> Self {
    PersonInput {
      name:           Some(p.name),
      gender:         p.gender,
      email:          p.email,
      birth_date:     Some(birth_date_text(p.birth_date)),
      place_of_birth: p.place_of_birth,
      nationality:    p.nationality,
      tax_id:         Some(p.tax_id),
    }
  }
}

// ─── Stored ──────────────────────────────────────────────────────────────────

/// A persisted person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:             PersonId,
  pub name:           String,
  pub gender:         Option<String>,
  pub email:          Option<String>,
  pub birth_date:     DateTime<Utc>,
  pub place_of_birth: Option<String>,
  pub nationality:    Option<String>,
  pub tax_id:         String,
  /// Set once on insert; never changes.
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Person {
  /// Assemble a stored record from a validated one.
  pub fn from_new(
    id: PersonId,
    new: NewPerson,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> Self {
    Person {
      id,
      name: new.name,
      gender: new.gender,
      email: new.email,
      birth_date: new.birth_date,
      place_of_birth: new.place_of_birth,
      nationality: new.nationality,
      tax_id: new.tax_id,
      created_at,
      updated_at,
    }
  }

  /// Overwrite every mutable field. `id` and `created_at` are kept.
  pub fn apply(&mut self, new: NewPerson, updated_at: DateTime<Utc>) {
    self.name = new.name;
    self.gender = new.gender;
    self.email = new.email;
    self.birth_date = new.birth_date;
    self.place_of_birth = new.place_of_birth;
    self.nationality = new.nationality;
    self.tax_id = new.tax_id;
    self.updated_at = updated_at;
  }
}

// ─── View ────────────────────────────────────────────────────────────────────

/// The outward-facing representation returned by the API. All timestamps use
/// the same RFC 3339 UTC millisecond format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
  pub id:             PersonId,
  pub name:           String,
  pub gender:         Option<String>,
  pub email:          Option<String>,
  #[serde(with = "timestamp")]
  pub birth_date:     DateTime<Utc>,
  pub place_of_birth: Option<String>,
  pub nationality:    Option<String>,
  pub tax_id:         String,
  #[serde(with = "timestamp")]
  pub created_at:     DateTime<Utc>,
  #[serde(with = "timestamp")]
  pub updated_at:     DateTime<Utc>,
}

impl From<Person> for PersonView {
  fn from(p: Person) -> Self {
    PersonView {
      id:             p.id,
      name:           p.name,
      gender:         p.gender,
      email:          p.email,
      birth_date:     p.birth_date,
      place_of_birth: p.place_of_birth,
      nationality:    p.nationality,
      tax_id:         p.tax_id,
      created_at:     p.created_at,
      updated_at:     p.updated_at,
    }
  }
}

impl From<&PersonView> for PersonInput {
  fn from(v: &PersonView) -> Self {
    PersonInput {
      name:           Some(v.name.clone()),
      gender:         v.gender.clone(),
      email:          v.email.clone(),
      birth_date:     Some(birth_date_text(v.birth_date)),
      place_of_birth: v.place_of_birth.clone(),
      nationality:    v.nationality.clone(),
      tax_id:         Some(v.tax_id.clone()),
    }
  }
}

/// Render a birth date the way a client would type it back in: a bare
/// calendar date at midnight, otherwise a full timestamp.
pub fn birth_date_text(dt: DateTime<Utc>) -> String {
  if dt.time() == NaiveTime::MIN {
    dt.format("%Y-%m-%d").to_string()
  } else {
    timestamp::format(&dt)
  }
}

/// Serde adapter that pins `DateTime<Utc>` to one textual format.
pub mod timestamp {
  use super::*;
  use serde::{Deserializer, Serializer};

  pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
  }

  pub fn serialize<S: Serializer>(
    dt: &DateTime<Utc>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(dt))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(serde::de::Error::custom)
  }
}
