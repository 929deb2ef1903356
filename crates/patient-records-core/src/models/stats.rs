//! Aggregate statistics models.

use serde::{Deserialize, Serialize};

/// Number of records sharing one raw gender value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenderCount {
    pub gender: String,
    pub count: i64,
}

/// Summary counts over the whole patient table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientStatistics {
    /// Total record count
    pub total: i64,
    /// Counts grouped by gender exactly as stored (no case folding)
    pub by_gender: Vec<GenderCount>,
    /// Records created within the last 30 days, today included
    pub recent: i64,
}
