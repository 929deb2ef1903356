//! Patient database operations.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use super::{reserve_patient_id, Database, DbError, DbResult};
use crate::models::{Patient, PatientFields, PatientId, ValidationError};

/// Columns selected into a [`Patient`], in `row_to_patient` order.
const PATIENT_COLUMNS: &str = r#"
    patient_id, name, age, gender, contact, email, address,
    medical_history, allergies, medications, last_visit,
    emergency_contact, blood_type, created_at
"#;

/// Timestamp layout used for `created_at` (matches `CURRENT_TIMESTAMP`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        age: read_age(row, 2)?,
        gender: row.get(3)?,
        contact: row.get(4)?,
        email: row.get(5)?,
        address: row.get(6)?,
        medical_history: row.get(7)?,
        allergies: row.get(8)?,
        medications: row.get(9)?,
        last_visit: row.get(10)?,
        emergency_contact: row.get(11)?,
        blood_type: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Ages written by older front ends may be stored as text or real values.
/// Anything that still reads as a whole number is accepted.
fn read_age(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let (raw, column_type) = match row.get_ref(idx)? {
        ValueRef::Integer(n) => (n.to_string(), Type::Integer),
        ValueRef::Real(f) if f.fract() == 0.0 => (format!("{f:.0}"), Type::Real),
        ValueRef::Text(bytes) => (String::from_utf8_lossy(bytes).trim().to_string(), Type::Text),
        other => {
            return Err(rusqlite::Error::InvalidColumnType(
                idx,
                "age".to_string(),
                other.data_type(),
            ))
        }
    };
    raw.parse::<u32>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            column_type,
            Box::new(ValidationError::InvalidAge(raw)),
        )
    })
}

/// Escape `LIKE` wildcards so the query matches literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Database {
    /// Insert a new patient, assigning the next identifier for the year of
    /// `now` in its own time zone. `created_at` is stored in UTC. The
    /// reservation and the insert commit together.
    pub fn create_patient<Tz: TimeZone>(
        &mut self,
        fields: &PatientFields,
        now: DateTime<Tz>,
    ) -> DbResult<PatientId> {
        let created_at = now.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let patient_id = reserve_patient_id(&tx, now.year())?;
        tx.execute(
            r#"
            INSERT INTO patients (
                patient_id, name, age, gender, contact, email, address,
                medical_history, allergies, medications, last_visit,
                emergency_contact, blood_type, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                patient_id.as_str(),
                fields.name,
                fields.age,
                fields.gender,
                fields.contact,
                fields.email,
                fields.address,
                fields.medical_history,
                fields.allergies,
                fields.medications,
                fields.last_visit,
                fields.emergency_contact,
                fields.blood_type,
                created_at,
            ],
        )
        .map_err(DbError::classify)?;

        tx.commit()?;
        Ok(patient_id)
    }

    /// Update an existing patient. The identifier and creation timestamp
    /// are never touched.
    ///
    /// Returns `false` when no row matched; that is not treated as an error.
    pub fn update_patient(&self, patient_id: &str, fields: &PatientFields) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE patients SET
                    name = ?2,
                    age = ?3,
                    gender = ?4,
                    contact = ?5,
                    email = ?6,
                    address = ?7,
                    medical_history = ?8,
                    allergies = ?9,
                    medications = ?10,
                    last_visit = ?11,
                    emergency_contact = ?12,
                    blood_type = ?13
                WHERE patient_id = ?1
                "#,
                params![
                    patient_id,
                    fields.name,
                    fields.age,
                    fields.gender,
                    fields.contact,
                    fields.email,
                    fields.address,
                    fields.medical_history,
                    fields.allergies,
                    fields.medications,
                    fields.last_visit,
                    fields.emergency_contact,
                    fields.blood_type,
                ],
            )
            .map_err(DbError::classify)?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by identifier.
    pub fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?"),
                [patient_id],
                row_to_patient,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients, newest first.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, id DESC"
        ))?;

        let rows = stmt.query_map([], row_to_patient)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List all patients alphabetically.
    pub fn list_patients_by_name(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY name, id"
        ))?;

        let rows = stmt.query_map([], row_to_patient)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search patients whose name, identifier or contact contains `query`
    /// (case-insensitive for ASCII), ordered by name.
    pub fn search_patients(&self, query: &str) -> DbResult<Vec<Patient>> {
        let pattern = like_pattern(query);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE name LIKE ?1 ESCAPE '\'
               OR patient_id LIKE ?1 ESCAPE '\'
               OR contact LIKE ?1 ESCAPE '\'
            ORDER BY name, id
            "#
        ))?;

        let rows = stmt.query_map([pattern], row_to_patient)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Count all patients.
    pub fn count_patients(&self) -> DbResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Rows whose age does not read back as a whole number.
    pub fn count_malformed_ages(&self) -> DbResult<i64> {
        let count = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM patients
            WHERE (typeof(age) = 'integer' AND age < 0)
               OR (typeof(age) = 'real' AND (age < 0 OR age != CAST(age AS INTEGER)))
               OR (typeof(age) = 'text' AND (trim(age) = '' OR trim(age) GLOB '*[^0-9]*'))
               OR typeof(age) IN ('blob', 'null')
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a patient. Returns `false` if it did not exist.
    pub fn delete_patient(&self, patient_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE patient_id = ?", [patient_id])?;
        Ok(rows_affected > 0)
    }
}
