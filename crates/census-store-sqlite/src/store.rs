//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use census_core::{
  person::{NewPerson, Person, PersonId},
  store::PersonStore,
};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Error, Result,
  encode::{PERSON_COLUMNS, RawPerson, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person store backed by a single SQLite database.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Contents vanish with the last clone.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("schema initialised");
    Ok(())
  }

  /// Run a single-row `SELECT` over [`PERSON_COLUMNS`] filtered by `filter`.
  async fn find_one(
    &self,
    filter: &'static str,
    value: rusqlite::types::Value,
  ) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE {filter}");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawPerson::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  async fn find_all(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>> {
    self.find_one("id = ?1", id.into()).await
  }

  async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<Person>> {
    self.find_one("tax_id = ?1", tax_id.to_owned().into()).await
  }

  async fn insert(
    &self,
    person:     NewPerson,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> Result<Person> {
    let name_str           = person.name.clone();
    let gender_str         = person.gender.clone();
    let email_str          = person.email.clone();
    let birth_date_str     = encode_dt(person.birth_date);
    let place_of_birth_str = person.place_of_birth.clone();
    let nationality_str    = person.nationality.clone();
    let tax_id_str         = person.tax_id.clone();
    let created_at_str     = encode_dt(created_at);
    let updated_at_str     = encode_dt(updated_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             name, gender, email, birth_date, place_of_birth,
             nationality, tax_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            name_str,
            gender_str,
            email_str,
            birth_date_str,
            place_of_birth_str,
            nationality_str,
            tax_id_str,
            created_at_str,
            updated_at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| Error::from_write(e, &person.tax_id))?;

    debug!(id, "inserted person row");
    Ok(Person::from_new(id, person, created_at, updated_at))
  }

  async fn update(&self, person: &Person) -> Result<()> {
    let id                 = person.id;
    let name_str           = person.name.clone();
    let gender_str         = person.gender.clone();
    let email_str          = person.email.clone();
    let birth_date_str     = encode_dt(person.birth_date);
    let place_of_birth_str = person.place_of_birth.clone();
    let nationality_str    = person.nationality.clone();
    let tax_id_str         = person.tax_id.clone();
    let updated_at_str     = encode_dt(person.updated_at);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE persons SET
             name = ?2, gender = ?3, email = ?4, birth_date = ?5,
             place_of_birth = ?6, nationality = ?7, tax_id = ?8,
             updated_at = ?9
           WHERE id = ?1",
          rusqlite::params![
            id,
            name_str,
            gender_str,
            email_str,
            birth_date_str,
            place_of_birth_str,
            nationality_str,
            tax_id_str,
            updated_at_str,
          ],
        )?)
      })
      .await
      .map_err(|e| Error::from_write(e, &person.tax_id))?;

    if affected == 0 {
      return Err(Error::PersonNotFound(id));
    }
    Ok(())
  }

  async fn delete(&self, person: &Person) -> Result<()> {
    let id = person.id;
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::PersonNotFound(id));
    }
    Ok(())
  }
}
