//! Export functionality for patient reports.

mod csv;

pub use self::csv::*;
