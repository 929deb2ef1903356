//! Domain models for the patient records system.

mod identifier;
mod patient;
mod stats;

pub use identifier::*;
pub use patient::*;
pub use stats::*;
