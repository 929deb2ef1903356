//! JSON API over the patient store.
//!
//! Routes live in [`router`]; handlers are grouped by resource under
//! [`endpoints`].

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;
