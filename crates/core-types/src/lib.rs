//! # AMU Core Types
//!
//! Layer 0 of the workspace: the herd, treatment and medication records shared
//! by every other crate, plus the input validation applied at the API boundary.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::MetricType;
pub use error::CoreError;
pub use structs::{AmuEntry, Herd, Medication, MedicationFilter, NewAmuEntry, NewMedication};
