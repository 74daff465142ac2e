//! Next-occurrence calculation for birthdays, anniversaries and dated events,
//! and ranking of what is coming up.
//!
//! Everything here is pure: callers load a snapshot from the store and pass
//! it in, and nothing is written back.

mod engine;
pub mod labels;
pub mod models;

pub use engine::{collect_upcoming, compute_next_occurrence, compute_standalone_occurrence};
pub use labels::{days_until_label, Urgency};
pub use models::{OccurrenceKind, OccurrenceResult};
