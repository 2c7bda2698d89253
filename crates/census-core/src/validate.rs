//! Validation and normalization of candidate person records.
//!
//! Rules run in a fixed order and stop at the first failure:
//!
//! 1. `name` required
//! 2. `taxId` required
//! 3. `taxId` passes the CPF checksum
//! 4. `taxId` not held by another record
//! 5. `birthDate` present and parseable
//! 6. `birthDate` not after now
//! 7. `email`, when given, is a single bare address

use chrono::{Datelike as _, DateTime, NaiveDate, Utc};
use mockable::{Clock, DefaultClock};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
  error::{Field, ValidationError},
  person::{NewPerson, Person, PersonId, PersonInput},
};

// Dot-atom local part, hostname-style domain labels. No display names, no
// angle brackets, no lists.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
  )
  .unwrap()
});

const TAX_ID_LEN: usize = 11;

const BIRTH_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

// ─── Uniqueness lookup ───────────────────────────────────────────────────────

/// Answers "does some other record already hold this tax id?".
///
/// Implemented for a slice of records, so callers can hand over a full
/// snapshot or just the rows an index lookup returned.
pub trait TaxIdRegistry {
  /// `tax_id` is in canonical digit form. A record whose id equals `except`
  /// is ignored.
  fn is_taken(&self, tax_id: &str, except: Option<PersonId>) -> bool;
}

impl TaxIdRegistry for [Person] {
  fn is_taken(&self, tax_id: &str, except: Option<PersonId>) -> bool {
    self
      .iter()
      .filter(|p| Some(p.id) != except)
      .any(|p| normalize_tax_id(&p.tax_id) == tax_id)
  }
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// Checks candidates against the business rules. Pure apart from reading the
/// injected clock.
#[derive(Debug, Clone, Default)]
pub struct Validator<C = DefaultClock> {
  clock: C,
}

impl<C: Clock + Send + Sync> Validator<C> {
  pub fn new(clock: C) -> Self { Self { clock } }

  pub fn clock(&self) -> &C { &self.clock }

  /// Validate a candidate for insertion. Any existing holder of the same tax
  /// id is a conflict.
  pub fn validate_for_create<R>(
    &self,
    candidate: &PersonInput,
    existing: &R,
  ) -> Result<NewPerson, ValidationError>
  where
    R: TaxIdRegistry + ?Sized,
  {
    self.validate(candidate, existing, None)
  }

  /// Validate a candidate replacing record `id`. The record itself does not
  /// count as a conflicting holder of its own tax id.
  pub fn validate_for_update<R>(
    &self,
    id: PersonId,
    candidate: &PersonInput,
    existing: &R,
  ) -> Result<NewPerson, ValidationError>
  where
    R: TaxIdRegistry + ?Sized,
  {
    self.validate(candidate, existing, Some(id))
  }

  /// Every rule except uniqueness, for clients checking a form before
  /// submitting it.
  pub fn validate_fields(
    &self,
    candidate: &PersonInput,
  ) -> Result<NewPerson, ValidationError> {
    let nobody: &[Person] = &[];
    self.validate(candidate, nobody, None)
  }

  fn validate<R>(
    &self,
    candidate: &PersonInput,
    existing: &R,
    except: Option<PersonId>,
  ) -> Result<NewPerson, ValidationError>
  where
    R: TaxIdRegistry + ?Sized,
  {
    let name = required(candidate.name.as_deref(), Field::Name)?;
    let raw_tax_id = required(candidate.tax_id.as_deref(), Field::TaxId)?;

    if !is_valid_tax_id(raw_tax_id) {
      return Err(ValidationError::InvalidFormat(Field::TaxId));
    }
    let tax_id = normalize_tax_id(raw_tax_id);
    if existing.is_taken(&tax_id, except) {
      return Err(ValidationError::Duplicate(Field::TaxId));
    }

    let birth_date = candidate
      .birth_date
      .as_deref()
      .and_then(parse_birth_date)
      .ok_or(ValidationError::RequiredField(Field::BirthDate))?;
    if birth_date > self.clock.utc() {
      return Err(ValidationError::InvalidRange(Field::BirthDate));
    }

    let email = optional(candidate.email.as_deref());
    if let Some(address) = &email
      && !is_valid_email(address)
    {
      return Err(ValidationError::InvalidFormat(Field::Email));
    }

    Ok(NewPerson {
      name: name.to_owned(),
      gender: optional(candidate.gender.as_deref()),
      email,
      birth_date,
      place_of_birth: optional(candidate.place_of_birth.as_deref()),
      nationality: optional(candidate.nationality.as_deref()),
      tax_id,
    })
  }
}

fn required(value: Option<&str>, field: Field) -> Result<&str, ValidationError> {
  value
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or(ValidationError::RequiredField(field))
}

fn optional(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

// ─── Field rules ─────────────────────────────────────────────────────────────

/// Reduce a tax id to its ASCII digits, dropping punctuation such as the
/// `000.000.000-00` mask.
pub fn normalize_tax_id(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// The CPF checksum.
///
/// The first check digit is computed from the nine-digit prefix but is never
/// compared with the candidate's tenth digit; it only feeds the second check
/// digit, and the eleventh digit is the sole comparison against input. A
/// string with a wrong tenth digit can therefore pass.
pub fn is_valid_tax_id(raw: &str) -> bool {
  let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
  let Ok(digits) = <[u32; TAX_ID_LEN]>::try_from(digits) else {
    return false;
  };
  if digits.iter().all(|&d| d == digits[0]) {
    return false;
  }

  let first = check_digit(&digits[..9]);
  let mut rebuilt = [0u32; 10];
  rebuilt[..9].copy_from_slice(&digits[..9]);
  rebuilt[9] = first;

  digits[10] == check_digit(&rebuilt)
}

/// Weighted mod-11 check digit; weights run from `len + 1` down to 2.
fn check_digit(digits: &[u32]) -> u32 {
  let top = digits.len() as u32 + 1;
  let sum: u32 = digits
    .iter()
    .zip((2..=top).rev())
    .map(|(d, w)| d * w)
    .sum();
  let rest = sum % 11;
  if rest < 2 { 0 } else { 11 - rest }
}

/// Whether `email` is exactly one bare `local-part@domain` address.
pub fn is_valid_email(email: &str) -> bool { EMAIL_REGEX.is_match(email) }

/// Parse a birth date into a UTC instant.
///
/// A bare calendar date means midnight UTC. Timestamps must carry an
/// explicit offset; a naive date-time is ambiguous and yields `None`.
///
/// The UTC year must lie in `1..=9999`: signed or five-digit years have no
/// fixed-width RFC 3339 form and cannot be stored.
pub fn parse_birth_date(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  let parsed = match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => dt.with_timezone(&Utc),
    Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
      .ok()?
      .and_hms_opt(0, 0, 0)?
      .and_utc(),
  };
  BIRTH_YEARS.contains(&parsed.year()).then_some(parsed)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{Duration, Local, TimeZone};

  use super::*;

  struct FixedClock(DateTime<Utc>);

  impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> { self.0.with_timezone(&Local) }

    fn utc(&self) -> DateTime<Utc> { self.0 }
  }

  // Known to satisfy the checksum.
  const ANA_TAX_ID: &str = "11144477735";
  const OTHER_TAX_ID: &str = "52998224725";

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

  fn validator() -> Validator<FixedClock> { Validator::new(FixedClock(now())) }

  fn ana() -> PersonInput {
    PersonInput {
      name: Some("Ana Silva".into()),
      tax_id: Some(ANA_TAX_ID.into()),
      birth_date: Some("1990-01-01".into()),
      email: Some(String::new()),
      ..Default::default()
    }
  }

  fn stored(id: PersonId, tax_id: &str) -> Person {
    Person {
      id,
      name: "Someone".into(),
      gender: None,
      email: None,
      birth_date: Utc.with_ymd_and_hms(1980, 5, 5, 0, 0, 0).unwrap(),
      place_of_birth: None,
      nationality: None,
      tax_id: tax_id.into(),
      created_at: now(),
      updated_at: now(),
    }
  }

  // ── Checksum ────────────────────────────────────────────────────────────

  #[test]
  fn checksum_accepts_known_valid_numbers() {
    for cpf in [ANA_TAX_ID, OTHER_TAX_ID, "12345678909", "111.444.777-35"] {
      assert!(is_valid_tax_id(cpf), "{cpf} should be valid");
    }
  }

  #[test]
  fn checksum_is_deterministic() {
    for cpf in [ANA_TAX_ID, "11144477736", "123"] {
      let first = is_valid_tax_id(cpf);
      assert!((0..10).all(|_| is_valid_tax_id(cpf) == first));
    }
  }

  #[test]
  fn checksum_rejects_repeated_digits() {
    for d in 0..=9 {
      let cpf = d.to_string().repeat(11);
      assert!(!is_valid_tax_id(&cpf), "{cpf} should be rejected");
    }
  }

  #[test]
  fn checksum_rejects_wrong_length_and_wrong_last_digit() {
    assert!(!is_valid_tax_id("1114447773"));
    assert!(!is_valid_tax_id("111444777350"));
    assert!(!is_valid_tax_id("11144477736"));
    assert!(!is_valid_tax_id(""));
  }

  #[test]
  fn checksum_does_not_compare_the_tenth_digit() {
    // The correct tenth digit is 3; the last digit still matches the value
    // derived from the rebuilt prefix, so this passes.
    assert!(is_valid_tax_id("11144477705"));
  }

  #[test]
  fn normalize_strips_mask_characters() {
    assert_eq!(normalize_tax_id(" 111.444.777-35 "), ANA_TAX_ID);
  }

  // ── Email ───────────────────────────────────────────────────────────────

  #[test]
  fn email_accepts_bare_addresses() {
    for email in ["ana@example.com", "ana.silva+tag@mail.example.com.br", "a@b"] {
      assert!(is_valid_email(email), "{email} should be valid");
    }
  }

  #[test]
  fn email_rejects_everything_else() {
    for email in [
      "not-an-email",
      "Ana <ana@example.com>",
      "<ana@example.com>",
      "ana@example.com, bob@example.com",
      "ana@@example.com",
      "ana @example.com",
      ".ana@example.com",
      "ana@-example.com",
    ] {
      assert!(!is_valid_email(email), "{email} should be rejected");
    }
  }

  // ── Birth date parsing ──────────────────────────────────────────────────

  #[test]
  fn birth_date_forms() {
    let midnight = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_birth_date("1990-01-01"), Some(midnight));
    assert_eq!(parse_birth_date("1990-01-01T00:00:00Z"), Some(midnight));
    assert_eq!(
      parse_birth_date("1989-12-31T21:00:00-03:00"),
      Some(midnight)
    );
    assert_eq!(parse_birth_date("1990-01-01T00:00:00"), None);
    assert_eq!(parse_birth_date("01/01/1990"), None);
    assert_eq!(parse_birth_date("   "), None);
  }

  #[test]
  fn birth_year_must_have_four_unsigned_digits() {
    assert_eq!(parse_birth_date("-0001-01-01"), None);
    assert_eq!(parse_birth_date("+12345-01-01"), None);
    assert_eq!(parse_birth_date("0000-06-01"), None);
    // Shifts into year 0 once converted to UTC.
    assert_eq!(parse_birth_date("0001-01-01T00:30:00+01:00"), None);
    assert!(parse_birth_date("0001-01-01").is_some());
    assert!(parse_birth_date("9999-12-31T23:59:59Z").is_some());

    let input = PersonInput { birth_date: Some("-0001-01-01".into()), ..ana() };
    assert_eq!(
      validator().validate_fields(&input),
      Err(ValidationError::RequiredField(Field::BirthDate))
    );
  }

  // ── Rules ───────────────────────────────────────────────────────────────

  #[test]
  fn ana_is_accepted_and_normalized() {
    let mut input = ana();
    input.name = Some("  Ana Silva  ".into());
    input.nationality = Some(" Brazilian ".into());
    input.gender = Some("   ".into());

    let person = validator().validate_for_create(&input, &[] as &[Person]).unwrap();
    assert_eq!(person.name, "Ana Silva");
    assert_eq!(person.tax_id, ANA_TAX_ID);
    assert_eq!(person.nationality.as_deref(), Some("Brazilian"));
    assert_eq!(person.gender, None);
    assert_eq!(person.email, None);
    assert_eq!(
      person.birth_date,
      Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()
    );
  }

  #[test]
  fn missing_name_is_reported_before_missing_tax_id() {
    let input = PersonInput {
      name: Some("  ".into()),
      tax_id: None,
      ..ana()
    };
    assert_eq!(
      validator().validate_fields(&input),
      Err(ValidationError::RequiredField(Field::Name))
    );
  }

  #[test]
  fn missing_tax_id() {
    let input = PersonInput { tax_id: Some(" ".into()), ..ana() };
    assert_eq!(
      validator().validate_fields(&input),
      Err(ValidationError::RequiredField(Field::TaxId))
    );
  }

  #[test]
  fn bad_checksum_is_an_invalid_format() {
    let input = PersonInput { tax_id: Some("11111111111".into()), ..ana() };
    assert_eq!(
      validator().validate_fields(&input),
      Err(ValidationError::InvalidFormat(Field::TaxId))
    );
  }

  #[test]
  fn duplicate_tax_id_on_create() {
    let existing = vec![stored(1, ANA_TAX_ID)];
    assert_eq!(
      validator().validate_for_create(&ana(), existing.as_slice()),
      Err(ValidationError::Duplicate(Field::TaxId))
    );
  }

  #[test]
  fn duplicate_detection_compares_canonical_digits() {
    let existing = vec![stored(1, ANA_TAX_ID)];
    let input = PersonInput { tax_id: Some("111.444.777-35".into()), ..ana() };
    assert_eq!(
      validator().validate_for_create(&input, existing.as_slice()),
      Err(ValidationError::Duplicate(Field::TaxId))
    );
  }

  #[test]
  fn update_excludes_its_own_record() {
    let existing = vec![stored(1, ANA_TAX_ID), stored(2, OTHER_TAX_ID)];
    assert!(validator().validate_for_update(1, &ana(), existing.as_slice()).is_ok());
    assert_eq!(
      validator().validate_for_update(2, &ana(), existing.as_slice()),
      Err(ValidationError::Duplicate(Field::TaxId))
    );
  }

  #[test]
  fn duplicate_is_checked_before_birth_date() {
    let existing = vec![stored(1, ANA_TAX_ID)];
    let input = PersonInput { birth_date: None, ..ana() };
    assert_eq!(
      validator().validate_for_create(&input, existing.as_slice()),
      Err(ValidationError::Duplicate(Field::TaxId))
    );
  }

  #[test]
  fn missing_or_unparseable_birth_date() {
    for birth_date in [None, Some(""), Some("yesterday")] {
      let input = PersonInput {
        birth_date: birth_date.map(str::to_owned),
        ..ana()
      };
      assert_eq!(
        validator().validate_fields(&input),
        Err(ValidationError::RequiredField(Field::BirthDate))
      );
    }
  }

  #[test]
  fn future_birth_date_is_out_of_range() {
    let tomorrow = now() + Duration::days(1);
    let input = PersonInput {
      birth_date: Some(tomorrow.to_rfc3339()),
      ..ana()
    };
    assert_eq!(
      validator().validate_fields(&input),
      Err(ValidationError::InvalidRange(Field::BirthDate))
    );
  }

  #[test]
  fn birth_date_equal_to_now_is_accepted() {
    let input = PersonInput { birth_date: Some(now().to_rfc3339()), ..ana() };
    let person = validator().validate_fields(&input).unwrap();
    assert_eq!(person.birth_date, now());
  }

  #[test]
  fn email_is_optional() {
    for email in [None, Some(""), Some("   ")] {
      let input = PersonInput { email: email.map(str::to_owned), ..ana() };
      assert!(validator().validate_fields(&input).is_ok());
    }
  }

  #[test]
  fn malformed_email_is_rejected() {
    let input = PersonInput { email: Some("not-an-email".into()), ..ana() };
    assert_eq!(
      validator().validate_fields(&input),
      Err(ValidationError::InvalidFormat(Field::Email))
    );
  }

  #[test]
  fn email_is_trimmed_before_checking() {
    let input = PersonInput { email: Some(" ana@example.com ".into()), ..ana() };
    let person = validator().validate_fields(&input).unwrap();
    assert_eq!(person.email.as_deref(), Some("ana@example.com"));
  }

  #[test]
  fn normalization_is_idempotent() {
    let input = PersonInput {
      name: Some(" Ana Silva ".into()),
      gender: Some(" F ".into()),
      email: Some(" ana@example.com".into()),
      birth_date: Some("1990-01-01T10:30:00-03:00".into()),
      place_of_birth: Some(" Recife ".into()),
      nationality: Some("".into()),
      tax_id: Some("111.444.777-35".into()),
    };
    let once = validator().validate_fields(&input).unwrap();
    let twice = validator()
      .validate_fields(&PersonInput::from(once.clone()))
      .unwrap();
    assert_eq!(once, twice);
  }
}
