use chrono::NaiveDate;
use serde::Serialize;

/// Where an occurrence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    Birthday,
    Anniversary,
    /// An entry from a person's own event list
    Custom,
    /// A standalone calendar event
    Event,
}

/// One upcoming occurrence. Computed per query and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceResult {
    pub source_id: String,
    pub title: String,
    pub occurs_on: NaiveDate,
    pub days_until: i64,
    pub kind: OccurrenceKind,
    pub person_name: String,
    /// `None` for events not linked to a known person
    pub person_id: Option<String>,
}

impl OccurrenceResult {
    /// Whether the occurrence belongs to nobody in particular
    pub fn is_unassigned(&self) -> bool {
        self.person_id.is_none()
    }
}
