//! [`PersonService`]: the create/read/update/delete operations exposed to
//! transport layers.
//!
//! Every write goes through the [`Validator`]; storage-level uniqueness
//! rejections are folded back into [`ValidationError::Duplicate`].

use mockable::{Clock, DefaultClock};
use tracing::{debug, info};

use crate::{
  error::{Field, ServiceError, ValidationError},
  person::{Person, PersonId, PersonInput, PersonView},
  store::{PersonStore, StoreError},
  validate::{Validator, normalize_tax_id},
};

type Result<T, E> = std::result::Result<T, ServiceError<E>>;

/// Person operations over a [`PersonStore`].
pub struct PersonService<S, C = DefaultClock> {
  store:     S,
  validator: Validator<C>,
}

impl<S, C> PersonService<S, C>
where
  S: PersonStore,
  C: Clock + Send + Sync,
{
  pub fn new(store: S, clock: C) -> Self {
    Self { store, validator: Validator::new(clock) }
  }

  pub fn store(&self) -> &S { &self.store }

  /// All persons, ordered by id.
  pub async fn list_persons(&self) -> Result<Vec<PersonView>, S::Error> {
    let persons = self.store.find_all().await.map_err(ServiceError::Store)?;
    Ok(persons.into_iter().map(PersonView::from).collect())
  }

  pub async fn get_person(&self, id: PersonId) -> Result<PersonView, S::Error> {
    self
      .store
      .find_by_id(id)
      .await
      .map_err(ServiceError::Store)?
      .map(PersonView::from)
      .ok_or(ServiceError::NotFound(id))
  }

  /// Validate and insert a new person. `createdAt` and `updatedAt` are both
  /// set to the clock's current instant.
  pub async fn create_person(
    &self,
    input: &PersonInput,
  ) -> Result<PersonView, S::Error> {
    let holder = self.tax_id_holder(input).await?;
    let new = self
      .validator
      .validate_for_create(input, holder.as_slice())
      .inspect_err(log_rejection)?;

    let now = self.validator.clock().utc();
    let person = self
      .store
      .insert(new, now, now)
      .await
      .map_err(|e| map_write_error(e, None))?;

    info!(id = person.id, "person created");
    Ok(person.into())
  }

  /// Validate and apply a replacement for person `id`. `id` and `createdAt`
  /// are preserved; `updatedAt` is refreshed.
  pub async fn update_person(
    &self,
    id: PersonId,
    input: &PersonInput,
  ) -> Result<PersonView, S::Error> {
    let mut person = self
      .store
      .find_by_id(id)
      .await
      .map_err(ServiceError::Store)?
      .ok_or(ServiceError::NotFound(id))?;

    let holder = self.tax_id_holder(input).await?;
    let new = self
      .validator
      .validate_for_update(id, input, holder.as_slice())
      .inspect_err(log_rejection)?;

    // A clock that steps backwards must not break created_at <= updated_at.
    let now = self.validator.clock().utc().max(person.created_at);
    person.apply(new, now);
    self
      .store
      .update(&person)
      .await
      .map_err(|e| map_write_error(e, Some(id)))?;

    info!(id, "person updated");
    Ok(person.into())
  }

  pub async fn delete_person(&self, id: PersonId) -> Result<(), S::Error> {
    let person = self
      .store
      .find_by_id(id)
      .await
      .map_err(ServiceError::Store)?
      .ok_or(ServiceError::NotFound(id))?;

    self
      .store
      .delete(&person)
      .await
      .map_err(|e| map_write_error(e, Some(id)))?;

    info!(id, "person deleted");
    Ok(())
  }

  /// Index-backed uniqueness lookup: at most the one record holding the
  /// candidate's canonical tax id.
  async fn tax_id_holder(
    &self,
    input: &PersonInput,
  ) -> Result<Option<Person>, S::Error> {
    let tax_id = input
      .tax_id
      .as_deref()
      .map(normalize_tax_id)
      .unwrap_or_default();
    if tax_id.is_empty() {
      return Ok(None);
    }
    self
      .store
      .find_by_tax_id(&tax_id)
      .await
      .map_err(ServiceError::Store)
  }
}

fn map_write_error<E: StoreError>(
  err: E,
  id: Option<PersonId>,
) -> ServiceError<E> {
  if err.is_duplicate_tax_id() {
    debug!("tax id rejected by storage uniqueness constraint");
    ServiceError::Validation(ValidationError::Duplicate(Field::TaxId))
  } else if let (true, Some(id)) = (err.is_not_found(), id) {
    ServiceError::NotFound(id)
  } else {
    ServiceError::Store(err)
  }
}

fn log_rejection(err: &ValidationError) {
  debug!(kind = err.kind(), field = %err.field(), "candidate rejected");
}
