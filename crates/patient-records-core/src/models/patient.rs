//! Patient models.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A stored patient record.
///
/// The storage row key is never selected into this type; records are
/// addressed by `patient_id` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// External identifier, `PAT<year><seq>`
    pub patient_id: String,
    /// Patient name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender as entered (not normalized)
    pub gender: String,
    /// Phone or other contact
    pub contact: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Free-text medical history
    pub medical_history: Option<String>,
    /// Known allergies
    pub allergies: Option<String>,
    /// Current medications
    pub medications: Option<String>,
    /// Date of last visit (as entered)
    pub last_visit: Option<String>,
    /// Emergency contact
    pub emergency_contact: Option<String>,
    /// Blood type
    pub blood_type: Option<String>,
    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS` UTC
    pub created_at: String,
}

/// Raw patient input as submitted by a client.
///
/// Every field is kept as text so that missing and blank values can be told
/// apart from malformed ones during validation. JSON numbers and `null` are
/// accepted for any field, so a serialized [`Patient`] reads back as a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub age: String,
    #[serde(deserialize_with = "lenient_text")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_text")]
    pub contact: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(deserialize_with = "lenient_text")]
    pub medical_history: String,
    #[serde(deserialize_with = "lenient_text")]
    pub allergies: String,
    #[serde(deserialize_with = "lenient_text")]
    pub medications: String,
    #[serde(deserialize_with = "lenient_text")]
    pub last_visit: String,
    #[serde(deserialize_with = "lenient_text")]
    pub emergency_contact: String,
    #[serde(deserialize_with = "lenient_text")]
    pub blood_type: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Text, number or `null`; `null` reads as blank.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FormValue>::deserialize(deserializer)? {
        None => String::new(),
        Some(FormValue::Text(text)) => text,
        Some(FormValue::Integer(n)) => n.to_string(),
        Some(FormValue::Float(f)) => f.to_string(),
    })
}

/// Validated patient fields, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientFields {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub last_visit: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
}

/// Input validation failures. Nothing is written when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all required fields ({})", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("Age must be a whole number, got {0:?}")]
    InvalidAge(String),

    #[error("Please enter a search term")]
    EmptySearchQuery,
}

impl PatientForm {
    /// Create a form with only the required fields set.
    pub fn new(name: impl Into<String>, age: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            gender: gender.into(),
            ..Default::default()
        }
    }

    /// Trim every field and check that name, age and gender are present.
    pub fn validate(&self) -> Result<PatientFields, ValidationError> {
        let name = self.name.trim();
        let age = self.age.trim();
        let gender = self.gender.trim();

        let missing: Vec<&'static str> = [("Name", name), ("Age", age), ("Gender", gender)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| label)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequired(missing));
        }

        let age = age
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidAge(age.to_string()))?;

        Ok(PatientFields {
            name: name.to_string(),
            age,
            gender: gender.to_string(),
            contact: optional(&self.contact),
            email: optional(&self.email),
            address: optional(&self.address),
            medical_history: optional(&self.medical_history),
            allergies: optional(&self.allergies),
            medications: optional(&self.medications),
            last_visit: optional(&self.last_visit),
            emergency_contact: optional(&self.emergency_contact),
            blood_type: optional(&self.blood_type),
        })
    }
}

/// Blank optional input is stored as NULL.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A non-empty search term.
///
/// Callers build one before searching, which is where blank queries are
/// turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySearchQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
