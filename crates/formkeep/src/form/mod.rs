//! Signup form data model.
//!
//! A [`DraftForm`] is the single in-progress record edited through
//! [`apply_update`]. Once it passes validation it becomes an immutable
//! [`SubmittedForm`].
//!
//! # Example
//!
//! ```
//! use formkeep::form::{apply_update, DraftForm, Field, FieldValue};
//!
//! let draft = DraftForm::default();
//! let draft = apply_update(&draft, Field::FullName, FieldValue::text("Ada Lovelace")).unwrap();
//! assert_eq!(draft.full_name, "Ada Lovelace");
//! ```

mod controller;
mod dates;
mod validation;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use controller::{FormController, FormState, SubmitOutcome};
pub use validation::{ErrorMap, ValidationError, ValidationErrorKind, Validator};

/// Selectable countries as `(code, label)`.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("us", "United States"),
    ("ca", "Canada"),
    ("uk", "United Kingdom"),
    ("au", "Australia"),
    ("de", "Germany"),
    ("fr", "France"),
    ("in", "India"),
    ("jp", "Japan"),
];

/// Selectable genders.
pub const GENDERS: &[&str] = &["male", "female", "other", "prefer_not_to_say"];

/// Selectable hobbies.
pub const HOBBIES: &[&str] = &[
    "reading",
    "sports",
    "music",
    "travel",
    "cooking",
    "gaming",
    "photography",
    "art",
];

/// A field of the signup form, named as it appears in persisted JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Full name.
    FullName,
    /// Email address.
    Email,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
    /// Free-form bio.
    Bio,
    /// Country code.
    Country,
    /// Gender.
    Gender,
    /// Terms acceptance checkbox.
    AcceptTerms,
    /// Selected hobbies.
    Hobbies,
    /// Date of birth.
    DateOfBirth,
}

impl Field {
    /// Every field, in display order.
    pub const ALL: [Field; 10] = [
        Field::FullName,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
        Field::Bio,
        Field::Country,
        Field::Gender,
        Field::AcceptTerms,
        Field::Hobbies,
        Field::DateOfBirth,
    ];

    /// Wire name of the field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Bio => "bio",
            Self::Country => "country",
            Self::Gender => "gender",
            Self::AcceptTerms => "acceptTerms",
            Self::Hobbies => "hobbies",
            Self::DateOfBirth => "dateOfBirth",
        }
    }

    /// Human-readable label of the field.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full name",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm password",
            Self::Bio => "Bio",
            Self::Country => "Country",
            Self::Gender => "Gender",
            Self::AcceptTerms => "Terms",
            Self::Hobbies => "Hobbies",
            Self::DateOfBirth => "Date of birth",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::InvalidField {
                name: s.to_string(),
            })
    }
}

/// A new value for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value for a text field.
    Text(String),
    /// Value for a checkbox.
    Flag(bool),
    /// Replacement hobby selection.
    Hobbies(Vec<String>),
    /// Value for a date picker; `None` clears it.
    Date(Option<NaiveDate>),
}

impl FieldValue {
    /// Shorthand for [`FieldValue::Text`].
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Parse raw text input into the value shape `field` expects.
    ///
    /// Checkboxes accept `true/false`, `yes/no` and `1/0`. Dates use
    /// `YYYY-MM-DD`; an empty string clears the date. Hobbies are a
    /// comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldValue`] if the text cannot be parsed.
    pub fn parse(field: Field, raw: &str) -> Result<Self> {
        match field {
            Field::AcceptTerms => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Self::Flag(true)),
                "false" | "no" | "0" => Ok(Self::Flag(false)),
                other => Err(Error::invalid_value(
                    field.as_str(),
                    format!("expected true or false, got '{other}'"),
                )),
            },
            Field::DateOfBirth => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(Self::Date(None));
                }
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map(|date| Self::Date(Some(date)))
                    .map_err(|e| {
                        Error::invalid_value(field.as_str(), format!("expected YYYY-MM-DD: {e}"))
                    })
            }
            Field::Hobbies => {
                let hobbies: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(String::from)
                    .collect();
                if let Some(unknown) = hobbies.iter().find(|h| !HOBBIES.contains(&h.as_str())) {
                    return Err(unknown_choice(field, unknown));
                }
                Ok(Self::Hobbies(hobbies))
            }
            Field::Country if !raw.is_empty() && !COUNTRIES.iter().any(|(code, _)| *code == raw) => {
                Err(unknown_choice(field, raw))
            }
            Field::Gender if !raw.is_empty() && !GENDERS.contains(&raw) => {
                Err(unknown_choice(field, raw))
            }
            _ => Ok(Self::Text(raw.to_string())),
        }
    }
}

fn unknown_choice(field: Field, value: &str) -> Error {
    Error::invalid_value(field.as_str(), format!("'{value}' is not one of the choices"))
}

/// The single in-progress, not-yet-submitted signup record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftForm {
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Free-form bio.
    pub bio: String,
    /// Country code, one of [`COUNTRIES`].
    pub country: String,
    /// Gender, one of [`GENDERS`].
    pub gender: String,
    /// Whether the terms were accepted.
    pub accept_terms: bool,
    /// Selected hobbies in the order they were picked.
    pub hobbies: Vec<String>,
    /// Date of birth, stored as a midnight UTC timestamp.
    #[serde(with = "dates::timestamp_date")]
    pub date_of_birth: Option<NaiveDate>,
}

impl DraftForm {
    /// Add `hobby` if absent, remove it if present.
    pub fn toggle_hobby(&mut self, hobby: &str) {
        if let Some(pos) = self.hobbies.iter().position(|h| h == hobby) {
            self.hobbies.remove(pos);
        } else {
            self.hobbies.push(hobby.to_string());
        }
    }

    /// Check whether every field still holds its default.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply one field edit, returning the edited copy of `draft`.
///
/// Hobby selections are de-duplicated keeping first occurrence order.
///
/// # Errors
///
/// Returns [`Error::InvalidFieldValue`] if `value` has the wrong shape for
/// `field`, for example a checkbox value for the email field.
pub fn apply_update(draft: &DraftForm, field: Field, value: FieldValue) -> Result<DraftForm> {
    let mut next = draft.clone();
    match (field, value) {
        (Field::FullName, FieldValue::Text(v)) => next.full_name = v,
        (Field::Email, FieldValue::Text(v)) => next.email = v,
        (Field::Password, FieldValue::Text(v)) => next.password = v,
        (Field::ConfirmPassword, FieldValue::Text(v)) => next.confirm_password = v,
        (Field::Bio, FieldValue::Text(v)) => next.bio = v,
        (Field::Country, FieldValue::Text(v)) => next.country = v,
        (Field::Gender, FieldValue::Text(v)) => next.gender = v,
        (Field::AcceptTerms, FieldValue::Flag(v)) => next.accept_terms = v,
        (Field::DateOfBirth, FieldValue::Date(v)) => next.date_of_birth = v,
        (Field::Hobbies, FieldValue::Hobbies(list)) => {
            let mut hobbies: Vec<String> = Vec::with_capacity(list.len());
            for hobby in list {
                if !hobbies.contains(&hobby) {
                    hobbies.push(hobby);
                }
            }
            next.hobbies = hobbies;
        }
        (field, value) => {
            return Err(Error::invalid_value(
                field.as_str(),
                format!("cannot apply {value:?}"),
            ))
        }
    }
    Ok(next)
}

/// An immutable record created from a draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedForm {
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Free-form bio.
    pub bio: String,
    /// Country code.
    pub country: String,
    /// Gender.
    pub gender: String,
    /// Whether the terms were accepted.
    pub accept_terms: bool,
    /// Selected hobbies.
    #[serde(default)]
    pub hobbies: Vec<String>,
    /// Date of birth as `YYYY-MM-DD`.
    pub date_of_birth: Option<NaiveDate>,
    /// When the record was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl SubmittedForm {
    /// Freeze `draft` into a submitted record stamped with `submitted_at`.
    #[must_use]
    pub fn from_draft(draft: &DraftForm, submitted_at: DateTime<Utc>) -> Self {
        Self {
            full_name: draft.full_name.clone(),
            email: draft.email.clone(),
            password: draft.password.clone(),
            confirm_password: draft.confirm_password.clone(),
            bio: draft.bio.clone(),
            country: draft.country.clone(),
            gender: draft.gender.clone(),
            accept_terms: draft.accept_terms,
            hobbies: draft.hobbies.clone(),
            date_of_birth: draft.date_of_birth,
            submitted_at,
        }
    }
}
