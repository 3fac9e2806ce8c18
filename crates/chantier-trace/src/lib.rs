//! Traceability tracking for construction project supervisors.
//!
//! Decisions, site visits, snags, company contracts and payment applications are
//! recorded per project; the scoring rules turn documentation quality into a
//! traceability score and a risk level.

pub mod config;
pub mod error;
pub mod projects;
pub mod telemetry;
