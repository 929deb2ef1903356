//! CSV export of the full patient list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::models::Patient;

/// Column titles, in output order.
pub const CSV_HEADERS: [&str; 14] = [
    "Patient ID",
    "Name",
    "Age",
    "Gender",
    "Contact",
    "Email",
    "Address",
    "Medical History",
    "Allergies",
    "Medications",
    "Last Visit",
    "Emergency Contact",
    "Blood Type",
    "Created At",
];

/// A finished CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvExport {
    /// Suggested download name, `patients_export_YYYYMMDD_HHMMSS.csv`
    pub filename: String,
    /// UTF-8 CSV text
    pub content: String,
    /// Number of data rows
    pub row_count: usize,
}

impl CsvExport {
    /// Render `patients` in the order given.
    pub fn from_patients(patients: &[Patient], exported_at: DateTime<Utc>) -> Self {
        Self {
            filename: export_filename(exported_at),
            content: patients_to_csv(patients),
            row_count: patients.len(),
        }
    }
}

/// `patients_export_YYYYMMDD_HHMMSS.csv`
pub fn export_filename(exported_at: DateTime<Utc>) -> String {
    format!(
        "patients_export_{}.csv",
        exported_at.format("%Y%m%d_%H%M%S")
    )
}

/// Render a header row plus one row per patient.
pub fn patients_to_csv(patients: &[Patient]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, CSV_HEADERS.iter().copied());

    for patient in patients {
        let age = patient.age.to_string();
        push_row(
            &mut csv,
            [
                patient.patient_id.as_str(),
                patient.name.as_str(),
                age.as_str(),
                patient.gender.as_str(),
                optional(&patient.contact),
                optional(&patient.email),
                optional(&patient.address),
                optional(&patient.medical_history),
                optional(&patient.allergies),
                optional(&patient.medications),
                optional(&patient.last_visit),
                optional(&patient.emergency_contact),
                optional(&patient.blood_type),
                patient.created_at.as_str(),
            ],
        );
    }

    csv
}

/// Absent optional fields render as empty cells.
fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn push_row<'a>(csv: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            csv.push(',');
        }
        csv.push_str(&escape_csv(field));
    }
    csv.push_str("\r\n");
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// CSV exporter over the patient table.
pub struct CsvExporter<'a> {
    db: &'a Database,
}

impl<'a> CsvExporter<'a> {
    /// Create a new CSV exporter.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Export every patient, ordered by name.
    pub fn export_all(&self, exported_at: DateTime<Utc>) -> DbResult<CsvExport> {
        let patients = self.db.list_patients_by_name()?;
        Ok(CsvExport::from_patients(&patients, exported_at))
    }
}
