//! Aggregate queries over the patient table.

use chrono::NaiveDate;

use super::{Database, DbResult};
use crate::models::{GenderCount, PatientStatistics};

/// Days before today still counted as a recent registration.
pub const RECENT_WINDOW_DAYS: i64 = 30;

impl Database {
    /// Statistics relative to the store's own current date.
    pub fn patient_statistics(&self) -> DbResult<PatientStatistics> {
        self.statistics_relative_to("now")
    }

    /// Statistics with "today" pinned to `today`.
    pub fn patient_statistics_as_of(&self, today: NaiveDate) -> DbResult<PatientStatistics> {
        self.statistics_relative_to(&today.format("%Y-%m-%d").to_string())
    }

    /// `today` is any SQLite time value (`'now'` or `YYYY-MM-DD`).
    fn statistics_relative_to(&self, today: &str) -> DbResult<PatientStatistics> {
        let total = self.count_patients()?;

        let mut stmt = self.conn.prepare(
            "SELECT gender, COUNT(*) FROM patients GROUP BY gender ORDER BY gender",
        )?;
        let by_gender = stmt
            .query_map([], |row| {
                Ok(GenderCount {
                    gender: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let window = format!("-{RECENT_WINDOW_DAYS} days");
        let recent = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM patients
            WHERE date(created_at) >= date(?1, ?2)
            "#,
            [today, window.as_str()],
            |row| row.get(0),
        )?;

        Ok(PatientStatistics {
            total,
            by_gender,
            recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientForm;
    use chrono::{TimeZone, Utc};

    fn create(db: &mut Database, name: &str, gender: &str, date: (i32, u32, u32)) {
        let fields = PatientForm::new(name, "30", gender).validate().unwrap();
        let now = Utc
            .with_ymd_and_hms(date.0, date.1, date.2, 23, 59, 0)
            .unwrap();
        db.create_patient(&fields, now).unwrap();
    }

    #[test]
    fn test_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.patient_statistics().unwrap();
        assert_eq!(stats, PatientStatistics::default());
    }

    #[test]
    fn test_gender_grouping_is_raw() {
        let mut db = Database::open_in_memory().unwrap();
        create(&mut db, "A", "F", (2024, 1, 1));
        create(&mut db, "B", "F", (2024, 1, 2));
        create(&mut db, "C", "f", (2024, 1, 3));
        create(&mut db, "D", "M", (2024, 1, 4));

        let stats = db
            .patient_statistics_as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(
            stats.by_gender,
            vec![
                GenderCount { gender: "F".into(), count: 2 },
                GenderCount { gender: "M".into(), count: 1 },
                GenderCount { gender: "f".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_recent_window_is_by_date() {
        let mut db = Database::open_in_memory().unwrap();
        // 2024-03-31 minus 30 days is 2024-03-01
        create(&mut db, "Too old", "F", (2024, 2, 29));
        create(&mut db, "Edge", "F", (2024, 3, 1));
        create(&mut db, "Today", "M", (2024, 3, 31));

        let stats = db
            .patient_statistics_as_of(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
            .unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 2);
    }

    #[test]
    fn test_recent_against_store_clock() {
        let mut db = Database::open_in_memory().unwrap();
        let fields = PatientForm::new("Fresh", "30", "F").validate().unwrap();
        db.create_patient(&fields, Utc::now()).unwrap();
        create(&mut db, "Ancient", "M", (2001, 1, 1));

        let stats = db.patient_statistics().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.recent, 1);
    }
}
