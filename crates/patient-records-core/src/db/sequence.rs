//! Per-year identifier sequences.
//!
//! Each calendar year owns one counter row in `patient_id_sequences`.
//! Reserving an identifier bumps that row, so the reservation and the
//! patient insert can share one write transaction and two concurrent
//! creations can never be handed the same sequence number.

use rusqlite::{params, Connection};

use super::DbResult;
use crate::models::PatientId;

/// Highest sequence already issued for `year`, derived from the stored
/// identifiers. Used to seed a year's counter the first time it is touched.
fn max_existing_sequence(conn: &Connection, year: i32) -> DbResult<u32> {
    let pattern = format!("{}%", PatientId::year_prefix(year));
    let max: Option<i64> = conn.query_row(
        r#"
        SELECT MAX(CAST(substr(patient_id, 8) AS INTEGER))
        FROM patients
        WHERE patient_id LIKE ?1
        "#,
        [pattern],
        |row| row.get(0),
    )?;
    Ok(max.unwrap_or(0).max(0) as u32)
}

/// Reserve the next identifier for `year`.
///
/// The counter never falls behind the identifiers actually stored, so rows
/// written without going through the counter are skipped over.
///
/// Must run inside a write transaction together with the insert that uses
/// the identifier; otherwise a failed insert burns the sequence number.
pub fn reserve_patient_id(conn: &Connection, year: i32) -> DbResult<PatientId> {
    let seed = max_existing_sequence(conn, year)?;
    conn.execute(
        "INSERT OR IGNORE INTO patient_id_sequences (year, last_seq) VALUES (?1, ?2)",
        params![year, seed],
    )?;
    conn.execute(
        "UPDATE patient_id_sequences SET last_seq = MAX(last_seq, ?2) + 1 WHERE year = ?1",
        params![year, seed],
    )?;
    let seq: u32 = conn.query_row(
        "SELECT last_seq FROM patient_id_sequences WHERE year = ?1",
        [year],
        |row| row.get(0),
    )?;
    Ok(PatientId::new(year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn insert_raw(db: &Database, patient_id: &str) {
        db.conn()
            .execute(
                "INSERT INTO patients (patient_id, name, age, gender) VALUES (?1, 'Test', 30, 'F')",
                [patient_id],
            )
            .unwrap();
    }

    #[test]
    fn test_first_reservation_of_year() {
        let db = Database::open_in_memory().unwrap();
        let id = reserve_patient_id(db.conn(), 2024).unwrap();
        assert_eq!(id.as_str(), "PAT20240001");
    }

    #[test]
    fn test_sequential_reservations_increment_by_one() {
        let db = Database::open_in_memory().unwrap();
        let first = reserve_patient_id(db.conn(), 2024).unwrap();
        let second = reserve_patient_id(db.conn(), 2024).unwrap();

        let (_, a) = PatientId::parse(first.as_str()).unwrap();
        let (_, b) = PatientId::parse(second.as_str()).unwrap();
        assert_eq!(b, a + 1);
    }

    #[test]
    fn test_sequences_scoped_per_year() {
        let db = Database::open_in_memory().unwrap();
        reserve_patient_id(db.conn(), 2023).unwrap();
        reserve_patient_id(db.conn(), 2023).unwrap();

        let id = reserve_patient_id(db.conn(), 2024).unwrap();
        assert_eq!(id.as_str(), "PAT20240001");
    }

    #[test]
    fn test_seeds_from_existing_identifiers() {
        let db = Database::open_in_memory().unwrap();
        insert_raw(&db, "PAT20240001");
        insert_raw(&db, "PAT20240002");
        insert_raw(&db, "PAT20230007");

        let id = reserve_patient_id(db.conn(), 2024).unwrap();
        assert_eq!(id.as_str(), "PAT20240003");
    }

    #[test]
    fn test_counter_catches_up_with_stored_identifiers() {
        let db = Database::open_in_memory().unwrap();
        reserve_patient_id(db.conn(), 2024).unwrap();
        insert_raw(&db, "PAT20240001");
        insert_raw(&db, "PAT20240002");

        let id = reserve_patient_id(db.conn(), 2024).unwrap();
        assert_eq!(id.as_str(), "PAT20240003");
    }

    #[test]
    fn test_seed_uses_highest_suffix_not_count() {
        let db = Database::open_in_memory().unwrap();
        insert_raw(&db, "PAT20240001");
        insert_raw(&db, "PAT20240005");

        let id = reserve_patient_id(db.conn(), 2024).unwrap();
        assert_eq!(id.as_str(), "PAT20240006");
    }
}
