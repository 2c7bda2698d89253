//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.

use census_core::person::{Person, PersonId};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width RFC 3339, e.g. `2024-06-01T12:00:00.000000000Z`.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that produces a [`RawPerson`].
pub const PERSON_COLUMNS: &str = "id, name, gender, email, birth_date, \
                                  place_of_birth, nationality, tax_id, \
                                  created_at, updated_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:             PersonId,
  pub name:           String,
  pub gender:         Option<String>,
  pub email:          Option<String>,
  pub birth_date:     String,
  pub place_of_birth: Option<String>,
  pub nationality:    Option<String>,
  pub tax_id:         String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawPerson {
  /// Map a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      id:             row.get(0)?,
      name:           row.get(1)?,
      gender:         row.get(2)?,
      email:          row.get(3)?,
      birth_date:     row.get(4)?,
      place_of_birth: row.get(5)?,
      nationality:    row.get(6)?,
      tax_id:         row.get(7)?,
      created_at:     row.get(8)?,
      updated_at:     row.get(9)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:             self.id,
      name:           self.name,
      gender:         self.gender,
      email:          self.email,
      birth_date:     decode_dt(&self.birth_date)?,
      place_of_birth: self.place_of_birth,
      nationality:    self.nationality,
      tax_id:         self.tax_id,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}
