//! Core attendance logic for the madrasa dashboard.
//!
//! This crate contains the fundamental types and logic for:
//! - Ingestion: normalizing backend attendance rows into typed session records
//! - Reconciliation: merging AM/PM sessions into daily credit and summaries
//! - Class roll-up: per-subject summaries for a whole class

mod class;
pub mod filter;
mod reconcile;
pub mod record;
pub mod status;
pub mod types;

pub use class::{ClassSummary, SubjectSummary, summarize_class};
pub use filter::{AttendanceFilter, MonthFilter};
pub use reconcile::{
    AttendanceSummary, DailyStatus, PresentCredit, Reconciliation, reconcile, reconcile_raw,
};
pub use record::{AttendanceSessionRecord, Ingested, RawAttendanceRecord, SkipReason, ingest};
pub use status::{AttendanceStatus, Session, UnknownSession};
pub use types::{SubjectId, ValidationError};
