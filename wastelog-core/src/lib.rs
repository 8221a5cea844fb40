//! Core types and service wiring for the wastelog collection tracker.

/// Bundles of record and schedule stores the service runs on.
pub mod backend;
/// In-process store adapters.
pub mod memory;
/// Domain models and identifiers for records and schedules.
pub mod model;
/// Traits describing the persistence and clock interfaces.
pub mod ports;
/// Per-day record reports.
pub mod report;
/// High-level service facade used by clients.
pub mod service;
/// Summary statistics over records and schedules.
pub mod stats;
/// Input shapes and field validation at the store boundary.
pub mod validation;

pub use backend::*;
pub use model::*;
pub use ports::*;
pub use report::*;
pub use service::*;
pub use stats::*;
pub use validation::*;
