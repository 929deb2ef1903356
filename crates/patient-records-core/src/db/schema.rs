//! SQLite schema definition.

/// Complete database schema. Every statement is idempotent, so it is
/// applied on each connection open.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,        -- internal row key, never exposed
    patient_id TEXT UNIQUE NOT NULL,             -- PAT<year><seq>
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL,
    contact TEXT,
    email TEXT,
    address TEXT,
    medical_history TEXT,
    allergies TEXT,
    medications TEXT,
    last_visit DATE,
    emergency_contact TEXT,
    blood_type TEXT,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);

-- Never update the creation timestamp
CREATE TRIGGER IF NOT EXISTS patients_created_at_immutable
BEFORE UPDATE OF created_at ON patients
WHEN new.created_at IS NOT old.created_at
BEGIN
    SELECT RAISE(ABORT, 'created_at is immutable');
END;

-- ============================================================================
-- Identifier sequences (one counter row per calendar year)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_id_sequences (
    year INTEGER PRIMARY KEY,
    last_seq INTEGER NOT NULL DEFAULT 0 CHECK (last_seq >= 0)
);
"#;
