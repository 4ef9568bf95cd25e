//! Field validation for signup drafts.
//!
//! Every rule runs independently, so one submit attempt reports every failing
//! field at once. Validation never fails as an operation: problems come back
//! as an [`ErrorMap`], and an empty map means the draft is valid.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{DraftForm, Field};
use crate::config::ValidationConfig;

/// `local-part@domain.tld` without whitespace or extra `@`.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorKind {
    /// The field is empty, blank, unchecked or unset.
    Required,
    /// The value is shorter than the configured minimum.
    TooShort,
    /// The value is not shaped like an email address.
    InvalidFormat,
    /// The password lacks a lowercase letter, an uppercase letter or a digit.
    Weak,
    /// The confirmation does not equal the password.
    Mismatch,
    /// The birth year is too recent.
    TooYoung,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Required => "required",
            Self::TooShort => "tooShort",
            Self::InvalidFormat => "invalidFormat",
            Self::Weak => "weak",
            Self::Mismatch => "mismatch",
            Self::TooYoung => "tooYoung",
        };
        f.write_str(name)
    }
}

/// A field-level validation failure with its display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Which rule failed.
    pub kind: ValidationErrorKind,
    /// Message shown next to the field.
    pub message: String,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn required(message: &str) -> Self {
        Self::new(ValidationErrorKind::Required, message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Field name to validation error. Empty means valid.
///
/// Serializes as a JSON object of field name to message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<Field, ValidationError>);

impl ErrorMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether `field` has an error.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Error recorded for `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.get(&field)
    }

    /// Message recorded for `field`.
    #[must_use]
    pub fn message(&self, field: Field) -> Option<&str> {
        self.get(field).map(|e| e.message.as_str())
    }

    /// Kind of error recorded for `field`.
    #[must_use]
    pub fn kind(&self, field: Field) -> Option<ValidationErrorKind> {
        self.get(field).map(|e| e.kind)
    }

    /// Record an error, replacing any previous one for the field.
    pub fn insert(&mut self, field: Field, error: ValidationError) {
        self.0.insert(field, error);
    }

    /// Remove the error for `field`, returning it if there was one.
    pub fn remove(&mut self, field: Field) -> Option<ValidationError> {
        self.0.remove(&field)
    }

    /// Copy of this map without an entry for `field`.
    #[must_use]
    pub fn without(&self, field: Field) -> Self {
        let mut next = self.clone();
        next.remove(field);
        next
    }

    /// Iterate over failing fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.0.iter().map(|(field, error)| (*field, error))
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, error) in &self.0 {
            map.serialize_entry(field.as_str(), &error.message)?;
        }
        map.end()
    }
}

/// The validation engine.
///
/// Thresholds come from [`ValidationConfig`]; the defaults are a two character
/// name, an eight character password, a ten character bio and age 13.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationConfig,
}

impl Validator {
    /// Create a validator with the given thresholds.
    #[must_use]
    pub fn new(rules: ValidationConfig) -> Self {
        Self { rules }
    }

    /// The thresholds in use.
    #[must_use]
    pub fn rules(&self) -> &ValidationConfig {
        &self.rules
    }

    /// Validate `draft` against today's local date.
    #[must_use]
    pub fn validate(&self, draft: &DraftForm) -> ErrorMap {
        self.validate_on(draft, Local::now().date_naive())
    }

    /// Validate `draft` as of `today`.
    #[must_use]
    pub fn validate_on(&self, draft: &DraftForm, today: NaiveDate) -> ErrorMap {
        let checks = [
            (Field::FullName, self.check_full_name(&draft.full_name)),
            (Field::Email, check_email(&draft.email)),
            (Field::Password, self.check_password(&draft.password)),
            (
                Field::ConfirmPassword,
                check_confirm_password(&draft.password, &draft.confirm_password),
            ),
            (Field::Bio, self.check_bio(&draft.bio)),
            (
                Field::Country,
                draft
                    .country
                    .is_empty()
                    .then(|| ValidationError::required("Please select a country")),
            ),
            (
                Field::Gender,
                draft
                    .gender
                    .is_empty()
                    .then(|| ValidationError::required("Please select a gender")),
            ),
            (
                Field::AcceptTerms,
                (!draft.accept_terms).then(|| {
                    ValidationError::required("You must accept the terms and conditions")
                }),
            ),
            (
                Field::DateOfBirth,
                self.check_date_of_birth(draft.date_of_birth, today),
            ),
        ];

        let mut errors = ErrorMap::new();
        for (field, error) in checks {
            if let Some(error) = error {
                errors.insert(field, error);
            }
        }
        errors
    }

    fn check_full_name(&self, name: &str) -> Option<ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Some(ValidationError::required("Full name is required"));
        }
        if trimmed.chars().count() < self.rules.min_name_length {
            return Some(ValidationError::new(
                ValidationErrorKind::TooShort,
                format!(
                    "Full name must be at least {} characters",
                    self.rules.min_name_length
                ),
            ));
        }
        None
    }

    fn check_password(&self, password: &str) -> Option<ValidationError> {
        if password.is_empty() {
            return Some(ValidationError::required("Password is required"));
        }
        if password.chars().count() < self.rules.min_password_length {
            return Some(ValidationError::new(
                ValidationErrorKind::TooShort,
                format!(
                    "Password must be at least {} characters",
                    self.rules.min_password_length
                ),
            ));
        }
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !(has_lower && has_upper && has_digit) {
            return Some(ValidationError::new(
                ValidationErrorKind::Weak,
                "Password must contain at least one uppercase letter, one lowercase letter, and one number",
            ));
        }
        None
    }

    fn check_bio(&self, bio: &str) -> Option<ValidationError> {
        let trimmed = bio.trim();
        if trimmed.is_empty() {
            return Some(ValidationError::required("Bio is required"));
        }
        if trimmed.chars().count() < self.rules.min_bio_length {
            return Some(ValidationError::new(
                ValidationErrorKind::TooShort,
                format!(
                    "Bio must be at least {} characters",
                    self.rules.min_bio_length
                ),
            ));
        }
        None
    }

    /// Age is the difference of calendar years; month and day are ignored.
    fn check_date_of_birth(
        &self,
        date_of_birth: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Option<ValidationError> {
        let Some(date_of_birth) = date_of_birth else {
            return Some(ValidationError::required("Date of birth is required"));
        };
        let age = i64::from(today.year()) - i64::from(date_of_birth.year());
        if age < i64::from(self.rules.min_age_years) {
            return Some(ValidationError::new(
                ValidationErrorKind::TooYoung,
                format!(
                    "You must be at least {} years old",
                    self.rules.min_age_years
                ),
            ));
        }
        None
    }
}

fn check_email(email: &str) -> Option<ValidationError> {
    if email.is_empty() {
        return Some(ValidationError::required("Email is required"));
    }
    if !email_regex().is_match(email) {
        return Some(ValidationError::new(
            ValidationErrorKind::InvalidFormat,
            "Please enter a valid email address",
        ));
    }
    None
}

/// Compared raw, without trimming either side.
fn check_confirm_password(password: &str, confirm: &str) -> Option<ValidationError> {
    if confirm.is_empty() {
        return Some(ValidationError::required("Please confirm your password"));
    }
    if confirm != password {
        return Some(ValidationError::new(
            ValidationErrorKind::Mismatch,
            "Passwords do not match",
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn valid_draft() -> DraftForm {
        DraftForm {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "GoodPass1".to_string(),
            confirm_password: "GoodPass1".to_string(),
            bio: "Writes programs for engines.".to_string(),
            country: "uk".to_string(),
            gender: "female".to_string(),
            accept_terms: true,
            hobbies: Vec::new(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10),
        }
    }

    fn validate(draft: &DraftForm) -> ErrorMap {
        Validator::default().validate_on(draft, today())
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn test_blank_draft_flags_every_required_field() {
        let errors = validate(&DraftForm::default());

        for field in Field::ALL {
            if field == Field::Hobbies {
                assert!(!errors.contains(field));
            } else {
                assert_eq!(
                    errors.kind(field),
                    Some(ValidationErrorKind::Required),
                    "{field}"
                );
            }
        }
        assert_eq!(errors.len(), 9);
    }

    #[test]
    fn test_unaccepted_terms_always_flagged() {
        let mut draft = valid_draft();
        draft.accept_terms = false;
        assert!(validate(&draft).contains(Field::AcceptTerms));
        assert!(validate(&DraftForm::default()).contains(Field::AcceptTerms));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut draft = valid_draft();
        draft.email = "broken".to_string();
        draft.bio = "short".to_string();
        assert_eq!(validate(&draft), validate(&draft));
    }

    #[test]
    fn test_full_name_rules() {
        let mut draft = valid_draft();
        draft.full_name = "   ".to_string();
        assert_eq!(
            validate(&draft).kind(Field::FullName),
            Some(ValidationErrorKind::Required)
        );

        draft.full_name = " A ".to_string();
        assert_eq!(
            validate(&draft).kind(Field::FullName),
            Some(ValidationErrorKind::TooShort)
        );

        draft.full_name = "Al".to_string();
        assert!(!validate(&draft).contains(Field::FullName));
    }

    #[test]
    fn test_email_formats() {
        let mut draft = valid_draft();

        draft.email = "a@b.co".to_string();
        assert!(!validate(&draft).contains(Field::Email));

        draft.email = "no-at-sign".to_string();
        assert_eq!(
            validate(&draft).kind(Field::Email),
            Some(ValidationErrorKind::InvalidFormat)
        );

        draft.email = "a@b".to_string();
        assert_eq!(
            validate(&draft).kind(Field::Email),
            Some(ValidationErrorKind::InvalidFormat)
        );

        draft.email = String::new();
        assert_eq!(
            validate(&draft).kind(Field::Email),
            Some(ValidationErrorKind::Required)
        );
    }

    #[test]
    fn test_email_rejects_spaces_and_double_at() {
        let mut draft = valid_draft();
        for bad in ["a b@c.de", "a@@c.de", "@c.de", "a@.de", "a@c.", " "] {
            draft.email = bad.to_string();
            assert!(validate(&draft).contains(Field::Email), "{bad}");
        }

        draft.email = "first.last@mail.example.org".to_string();
        assert!(!validate(&draft).contains(Field::Email));
    }

    #[test]
    fn test_password_rules() {
        let mut draft = valid_draft();

        draft.password = "short1A".to_string();
        draft.confirm_password = draft.password.clone();
        assert_eq!(
            validate(&draft).kind(Field::Password),
            Some(ValidationErrorKind::TooShort)
        );

        draft.password = "alllowercase1".to_string();
        draft.confirm_password = draft.password.clone();
        assert_eq!(
            validate(&draft).kind(Field::Password),
            Some(ValidationErrorKind::Weak)
        );

        draft.password = "GoodPass1".to_string();
        draft.confirm_password = draft.password.clone();
        assert!(!validate(&draft).contains(Field::Password));
    }

    #[test]
    fn test_short_weak_password_reports_length_only() {
        let mut draft = valid_draft();
        draft.password = "abc".to_string();
        assert_eq!(
            validate(&draft).kind(Field::Password),
            Some(ValidationErrorKind::TooShort)
        );
    }

    #[test]
    fn test_confirm_password_rules() {
        let mut draft = valid_draft();

        draft.confirm_password = String::new();
        assert_eq!(
            validate(&draft).kind(Field::ConfirmPassword),
            Some(ValidationErrorKind::Required)
        );

        draft.confirm_password = "GoodPass1 ".to_string();
        assert_eq!(
            validate(&draft).kind(Field::ConfirmPassword),
            Some(ValidationErrorKind::Mismatch)
        );
        assert_eq!(
            validate(&draft).message(Field::ConfirmPassword),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn test_bio_rules() {
        let mut draft = valid_draft();

        draft.bio = "\n\t".to_string();
        assert_eq!(
            validate(&draft).kind(Field::Bio),
            Some(ValidationErrorKind::Required)
        );

        draft.bio = "  nine chr  ".to_string();
        assert_eq!(
            validate(&draft).kind(Field::Bio),
            Some(ValidationErrorKind::TooShort)
        );

        draft.bio = "ten chars!".to_string();
        assert!(!validate(&draft).contains(Field::Bio));
    }

    #[test]
    fn test_age_boundary_uses_year_only() {
        let mut draft = valid_draft();

        draft.date_of_birth = NaiveDate::from_ymd_opt(2013, 12, 31);
        assert!(!validate(&draft).contains(Field::DateOfBirth));

        draft.date_of_birth = NaiveDate::from_ymd_opt(2014, 1, 1);
        assert_eq!(
            validate(&draft).kind(Field::DateOfBirth),
            Some(ValidationErrorKind::TooYoung)
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let validator = Validator::new(ValidationConfig {
            min_name_length: 5,
            min_password_length: 12,
            min_bio_length: 1,
            min_age_years: 18,
        });
        let mut draft = valid_draft();
        draft.full_name = "Ada".to_string();
        draft.bio = "x".to_string();
        draft.date_of_birth = NaiveDate::from_ymd_opt(2010, 1, 1);

        let errors = validator.validate_on(&draft, today());
        assert_eq!(errors.kind(Field::FullName), Some(ValidationErrorKind::TooShort));
        assert_eq!(errors.kind(Field::Password), Some(ValidationErrorKind::TooShort));
        assert!(!errors.contains(Field::Bio));
        assert_eq!(
            errors.message(Field::DateOfBirth),
            Some("You must be at least 18 years old")
        );
    }

    #[test]
    fn test_error_map_without() {
        let errors = validate(&DraftForm::default());
        let fewer = errors.without(Field::Email);

        assert!(errors.contains(Field::Email));
        assert!(!fewer.contains(Field::Email));
        assert_eq!(fewer.len(), errors.len() - 1);
    }

    #[test]
    fn test_error_map_serializes_messages() {
        let mut draft = valid_draft();
        draft.email = "nope".to_string();
        let json = serde_json::to_value(validate(&draft)).unwrap();

        assert_eq!(json["email"], "Please enter a valid email address");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_kind_display_names() {
        assert_eq!(ValidationErrorKind::TooShort.to_string(), "tooShort");
        assert_eq!(ValidationErrorKind::InvalidFormat.to_string(), "invalidFormat");
    }
}
