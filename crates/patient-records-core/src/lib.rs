//! Patient Records Core Library
//!
//! Storage, identifier assignment and reporting for a single-table patient
//! register.
//!
//! # Architecture
//!
//! ```text
//!   PatientForm ──validate──► PatientFields
//!                                  │
//!                     PatientStore (one connection per operation)
//!                                  │
//!        ┌─────────────────────────┼─────────────────────────┐
//!        │                         │                         │
//!        ▼                         ▼                         ▼
//!   create/update/delete     get/list/search          CSV export
//!   (BEGIN IMMEDIATE:                                  statistics
//!    reserve PAT<year><seq>
//!    + insert)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer and identifier sequences
//! - [`models`]: Domain types (Patient, PatientForm, PatientId, statistics)
//! - [`export`]: CSV export

pub mod db;
pub mod export;
pub mod models;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use export::{CsvExport, CsvExporter};
pub use models::{
    GenderCount, Patient, PatientFields, PatientForm, PatientId, PatientStatistics,
    SearchQuery, ValidationError,
};

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

// =========================================================================
// Error Type
// =========================================================================

/// Failure of a patient record operation.
///
/// A missing record is not an error here; lookups return `Option` and
/// writes return whether a row was affected.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

pub type RecordsResult<T> = Result<T, RecordsError>;

// =========================================================================
// Configuration
// =========================================================================

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "patients.db";

/// Default time a writer waits for another writer's lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to open the patient store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_PATH)
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Patient record operations over a SQLite file.
///
/// Holds no connection; every call opens its own and drops it before
/// returning, so one `PatientStore` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct PatientStore {
    config: StoreConfig,
}

impl PatientStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn open(&self) -> RecordsResult<Database> {
        Ok(Database::open_with_timeout(
            &self.config.database_path,
            self.config.busy_timeout,
        )?)
    }

    /// Create the database file and schema if they do not exist yet.
    pub fn initialize(&self) -> RecordsResult<()> {
        let db = self.open()?;
        let total = db.count_patients()?;
        let malformed = db.count_malformed_ages()?;
        if malformed > 0 {
            tracing::warn!(
                malformed,
                "patients with a non-numeric age cannot be read until corrected"
            );
        }
        tracing::info!(
            path = %self.config.database_path.display(),
            total,
            "patient store initialized"
        );
        Ok(())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Validate and insert a new patient, returning its identifier.
    ///
    /// The identifier year is the local calendar year.
    pub fn create(&self, form: &PatientForm) -> RecordsResult<PatientId> {
        self.create_at(form, Local::now())
    }

    /// [`create`](Self::create) with an explicit creation time. The
    /// identifier year is taken in `now`'s own time zone.
    pub fn create_at<Tz: TimeZone>(
        &self,
        form: &PatientForm,
        now: DateTime<Tz>,
    ) -> RecordsResult<PatientId> {
        let fields = form.validate()?;
        let mut db = self.open()?;
        let patient_id = db.create_patient(&fields, now)?;
        tracing::info!(patient_id = %patient_id, "patient created");
        Ok(patient_id)
    }

    /// Validate and overwrite a patient's fields.
    ///
    /// Returns `Ok(false)` when no patient has `patient_id`; nothing is
    /// written in that case and it is not reported as an error.
    pub fn update(&self, patient_id: &str, form: &PatientForm) -> RecordsResult<bool> {
        let fields = form.validate()?;
        let db = self.open()?;
        let updated = db.update_patient(patient_id, &fields)?;
        if updated {
            tracing::info!(patient_id, "patient updated");
        } else {
            tracing::warn!(patient_id, "update matched no patient");
        }
        Ok(updated)
    }

    /// Delete a patient. Deleting an unknown identifier is a no-op.
    pub fn delete(&self, patient_id: &str) -> RecordsResult<bool> {
        let deleted = self.open()?.delete_patient(patient_id)?;
        if deleted {
            tracing::info!(patient_id, "patient deleted");
        }
        Ok(deleted)
    }

    pub fn get(&self, patient_id: &str) -> RecordsResult<Option<Patient>> {
        Ok(self.open()?.get_patient(patient_id)?)
    }

    /// All patients, newest first.
    pub fn list(&self) -> RecordsResult<Vec<Patient>> {
        Ok(self.open()?.list_patients()?)
    }

    /// All patients, alphabetically.
    pub fn list_by_name(&self) -> RecordsResult<Vec<Patient>> {
        Ok(self.open()?.list_patients_by_name()?)
    }

    pub fn count(&self) -> RecordsResult<i64> {
        Ok(self.open()?.count_patients()?)
    }

    /// Patients whose name, identifier or contact contains the query.
    pub fn search(&self, query: &SearchQuery) -> RecordsResult<Vec<Patient>> {
        let results = self.open()?.search_patients(query.as_str())?;
        tracing::debug!(query = query.as_str(), hits = results.len(), "patient search");
        Ok(results)
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    pub fn export_csv(&self) -> RecordsResult<CsvExport> {
        self.export_csv_at(Utc::now())
    }

    pub fn export_csv_at(&self, exported_at: DateTime<Utc>) -> RecordsResult<CsvExport> {
        let db = self.open()?;
        let export = CsvExporter::new(&db).export_all(exported_at)?;
        tracing::info!(
            filename = %export.filename,
            rows = export.row_count,
            "patients exported"
        );
        Ok(export)
    }

    pub fn statistics(&self) -> RecordsResult<PatientStatistics> {
        Ok(self.open()?.patient_statistics()?)
    }

    pub fn statistics_as_of(&self, today: NaiveDate) -> RecordsResult<PatientStatistics> {
        Ok(self.open()?.patient_statistics_as_of(today)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (PatientStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = PatientStore::new(StoreConfig::new(dir.path().join("patients.db")));
        (store, dir)
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.database_path, PathBuf::from("patients.db"));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_initialize_creates_file() {
        let (store, dir) = temp_store();
        store.initialize().unwrap();
        assert!(dir.path().join("patients.db").exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_invalid_form_writes_nothing() {
        let (store, _dir) = temp_store();
        let err = store.create(&PatientForm::new("", "34", "F")).unwrap_err();
        assert!(matches!(
            err,
            RecordsError::Validation(ValidationError::MissingRequired(_))
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_invalid_update_writes_nothing() {
        let (store, _dir) = temp_store();
        let id = store.create(&PatientForm::new("Jane", "34", "F")).unwrap();

        let err = store
            .update(id.as_str(), &PatientForm::new("Jane", "", "F"))
            .unwrap_err();
        assert!(matches!(err, RecordsError::Validation(_)));
        assert_eq!(store.get(id.as_str()).unwrap().unwrap().age, 34);
    }

    #[test]
    fn test_create_uses_local_year() {
        use chrono::Datelike;
        let (store, _dir) = temp_store();
        let before = Local::now().year();
        let id = store.create(&PatientForm::new("Jane", "34", "F")).unwrap();
        let after = Local::now().year();

        let (year, seq) = PatientId::parse(id.as_str()).unwrap();
        assert!(year == before || year == after);
        assert_eq!(seq, 1);
    }

    #[test]
    fn test_initialize_tolerates_malformed_ages() {
        let (store, dir) = temp_store();
        store.initialize().unwrap();
        Database::open_with_timeout(dir.path().join("patients.db"), DEFAULT_BUSY_TIMEOUT)
            .unwrap()
            .conn()
            .execute(
                "INSERT INTO patients (patient_id, name, age, gender) VALUES ('PAT20200001', 'Legacy', 'thirty', 'F')",
                [],
            )
            .unwrap();

        store.initialize().unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(matches!(
            store.list().unwrap_err(),
            RecordsError::Persistence(DbError::Sqlite(_))
        ));
    }

    #[test]
    fn test_persistence_error_display() {
        let err = RecordsError::from(DbError::Constraint("UNIQUE constraint failed".into()));
        assert_eq!(
            err.to_string(),
            "Persistence error: Constraint violation: UNIQUE constraint failed"
        );
    }
}
