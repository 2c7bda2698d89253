//! The create/edit form: one text buffer per person field, checked with the
//! same rules the server applies before anything is sent.

use census_core::{
  Field, ValidationError,
  person::{PersonId, PersonInput, PersonView},
  validate::Validator,
};
use mockable::DefaultClock;

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Form rows, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  Name,
  TaxId,
  BirthDate,
  Email,
  Gender,
  PlaceOfBirth,
  Nationality,
}

impl FormField {
  pub const ALL: [FormField; 7] = [
    FormField::Name,
    FormField::TaxId,
    FormField::BirthDate,
    FormField::Email,
    FormField::Gender,
    FormField::PlaceOfBirth,
    FormField::Nationality,
  ];

  pub fn label(self) -> &'static str {
    match self {
      FormField::Name => "Name*",
      FormField::TaxId => "CPF*",
      FormField::BirthDate => "Birth date*",
      FormField::Email => "Email",
      FormField::Gender => "Gender",
      FormField::PlaceOfBirth => "Place of birth",
      FormField::Nationality => "Nationality",
    }
  }

  fn index(self) -> usize {
    Self::ALL.iter().position(|f| *f == self).unwrap_or_default()
  }

  pub fn next(self) -> Self { Self::ALL[(self.index() + 1) % Self::ALL.len()] }

  pub fn prev(self) -> Self {
    let len = Self::ALL.len();
    Self::ALL[(self.index() + len - 1) % len]
  }
}

impl From<Field> for FormField {
  fn from(field: Field) -> Self {
    match field {
      Field::Name => FormField::Name,
      Field::TaxId => FormField::TaxId,
      Field::BirthDate => FormField::BirthDate,
      Field::Email => FormField::Email,
    }
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PersonForm {
  /// `Some` when editing an existing record.
  pub editing: Option<PersonId>,
  pub focus:   FormField,
  /// Last rejection, local or from the server.
  pub error:   Option<String>,
  values:      [String; 7],
}

impl PersonForm {
  pub fn blank() -> Self {
    Self {
      editing: None,
      focus:   FormField::Name,
      error:   None,
      values:  Default::default(),
    }
  }

  /// A form pre-filled from a stored record.
  pub fn from_view(view: &PersonView) -> Self {
    let input = PersonInput::from(view);
    let mut form = Self::blank();
    form.editing = Some(view.id);
    for field in FormField::ALL {
      let value = match field {
        FormField::Name => &input.name,
        FormField::TaxId => &input.tax_id,
        FormField::BirthDate => &input.birth_date,
        FormField::Email => &input.email,
        FormField::Gender => &input.gender,
        FormField::PlaceOfBirth => &input.place_of_birth,
        FormField::Nationality => &input.nationality,
      };
      *form.value_mut(field) = value.clone().unwrap_or_default();
    }
    form
  }

  pub fn value(&self, field: FormField) -> &str { &self.values[field.index()] }

  fn value_mut(&mut self, field: FormField) -> &mut String {
    &mut self.values[field.index()]
  }

  pub fn push(&mut self, c: char) { self.value_mut(self.focus).push(c); }

  pub fn pop(&mut self) { self.value_mut(self.focus).pop(); }

  pub fn to_input(&self) -> PersonInput {
    let get = |f| Some(self.value(f).to_string());
    PersonInput {
      name:           get(FormField::Name),
      gender:         get(FormField::Gender),
      email:          get(FormField::Email),
      birth_date:     get(FormField::BirthDate),
      place_of_birth: get(FormField::PlaceOfBirth),
      nationality:    get(FormField::Nationality),
      tax_id:         get(FormField::TaxId),
    }
  }

  /// Run the field rules. On failure the offending row is focused and the
  /// message recorded.
  pub fn check(&mut self) -> Result<PersonInput, ValidationError> {
    let input = self.to_input();
    match Validator::new(DefaultClock).validate_fields(&input) {
      Ok(_) => {
        self.error = None;
        Ok(input)
      }
      Err(e) => {
        self.reject(e.to_string(), Some(e.field()));
        Err(e)
      }
    }
  }

  pub fn reject(&mut self, message: String, field: Option<Field>) {
    if let Some(field) = field {
      self.focus = field.into();
    }
    self.error = Some(message);
  }
}
