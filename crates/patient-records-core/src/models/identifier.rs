//! Human-readable patient identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every patient identifier.
pub const PATIENT_ID_PREFIX: &str = "PAT";

/// External patient identifier: `PAT`, a 4-digit year, then a zero-padded
/// sequence of at least 4 digits (`PAT20240001`).
///
/// The sequence restarts at 1 each calendar year. Past 9999 the suffix
/// simply grows wider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Format the identifier for `seq` within `year`.
    pub fn new(year: i32, seq: u32) -> Self {
        Self(format!("{PATIENT_ID_PREFIX}{year:04}{seq:04}"))
    }

    /// `PAT{year}`, the prefix every identifier issued in `year` starts with.
    pub fn year_prefix(year: i32) -> String {
        format!("{PATIENT_ID_PREFIX}{year:04}")
    }

    /// Split a well-formed identifier into `(year, seq)`.
    pub fn parse(id: &str) -> Option<(i32, u32)> {
        let rest = id.strip_prefix(PATIENT_ID_PREFIX)?;
        if rest.len() < 8 || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (year, seq) = rest.split_at(4);
        Some((year.parse().ok()?, seq.parse().ok()?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
