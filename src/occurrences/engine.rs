use super::models::{OccurrenceKind, OccurrenceResult};
use crate::components::store::models::{Person, StandaloneEvent};
use crate::utils::time::parse_event_date;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::warn;

/// Next yearly occurrence of `base_date`'s month and day, counted from `today`.
///
/// Only the month and day of `base_date` matter. A Feb 29 date lands on Feb 28
/// in non-leap years. Returns `None` only when the projected year falls outside
/// the representable calendar.
pub fn compute_next_occurrence(base_date: NaiveDate, today: NaiveDate) -> Option<(NaiveDate, i64)> {
    let mut occurs_on = date_in_year(base_date, today.year())?;
    if occurs_on < today {
        occurs_on = date_in_year(base_date, today.year() + 1)?;
    }
    Some((occurs_on, (occurs_on - today).num_days()))
}

/// Occurrence of a dated event. Recurring events repeat yearly, the rest happen
/// once and yield `None` after their date.
pub fn compute_standalone_occurrence(
    event_date: NaiveDate,
    recurring: bool,
    today: NaiveDate,
) -> Option<(NaiveDate, i64)> {
    if recurring {
        return compute_next_occurrence(event_date, today);
    }
    if event_date < today {
        return None;
    }
    Some((event_date, (event_date - today).num_days()))
}

/// Upcoming occurrences within `horizon_days`, soonest first, at most `limit`.
///
/// Equal distances keep input order: each person's birthday, anniversary and
/// own events, then standalone events. Records with unreadable dates are
/// skipped. Negative `horizon_days` or `limit` behave as zero. Generated
/// titles and the unassigned name are rendered in `locale`.
pub fn collect_upcoming(
    people: &[Person],
    events: &[StandaloneEvent],
    today: NaiveDate,
    horizon_days: i64,
    limit: i64,
    locale: &str,
) -> Vec<OccurrenceResult> {
    let horizon_days = horizon_days.max(0);
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    if limit == 0 {
        return Vec::new();
    }

    let mut upcoming = Vec::new();

    for person in people {
        if let Some(raw) = present(&person.birthday) {
            let source_id = format!("birthday-{}", person.id);
            if let Some((occurs_on, days_until)) =
                parse_or_skip(raw, &source_id).and_then(|d| compute_next_occurrence(d, today))
            {
                upcoming.push(OccurrenceResult {
                    title: t!("occurrence_birthday_title", locale = locale, name = &person.name).to_string(),
                    source_id,
                    occurs_on,
                    days_until,
                    kind: OccurrenceKind::Birthday,
                    person_name: person.name.clone(),
                    person_id: Some(person.id.clone()),
                });
            }
        }

        if let Some(raw) = present(&person.anniversary) {
            let source_id = format!("anniversary-{}", person.id);
            if let Some((occurs_on, days_until)) =
                parse_or_skip(raw, &source_id).and_then(|d| compute_next_occurrence(d, today))
            {
                upcoming.push(OccurrenceResult {
                    title: t!("occurrence_anniversary_title", locale = locale, name = &person.name).to_string(),
                    source_id,
                    occurs_on,
                    days_until,
                    kind: OccurrenceKind::Anniversary,
                    person_name: person.name.clone(),
                    person_id: Some(person.id.clone()),
                });
            }
        }

        for event in &person.other_events {
            let Some((occurs_on, days_until)) = parse_or_skip(&event.date, &event.id)
                .and_then(|d| compute_standalone_occurrence(d, event.recurring, today))
            else {
                continue;
            };
            upcoming.push(OccurrenceResult {
                source_id: event.id.clone(),
                title: event.title.clone(),
                occurs_on,
                days_until,
                kind: OccurrenceKind::Custom,
                person_name: person.name.clone(),
                person_id: Some(person.id.clone()),
            });
        }
    }

    let names: HashMap<&str, &str> = people
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    for event in events {
        let Some((occurs_on, days_until)) = parse_or_skip(&event.date, &event.id)
            .and_then(|d| compute_standalone_occurrence(d, event.recurring, today))
        else {
            continue;
        };

        let owner = event
            .person_id
            .as_deref()
            .and_then(|id| names.get_key_value(id));
        let (person_id, person_name) = match owner {
            Some((id, name)) => (Some(id.to_string()), name.to_string()),
            None => (None, t!("unassigned", locale = locale).to_string()),
        };

        upcoming.push(OccurrenceResult {
            source_id: event.id.clone(),
            title: event.title.clone(),
            occurs_on,
            days_until,
            kind: OccurrenceKind::Event,
            person_name,
            person_id,
        });
    }

    upcoming.retain(|o| (0..=horizon_days).contains(&o.days_until));
    // Stable, so ties keep input order
    upcoming.sort_by_key(|o| o.days_until);
    upcoming.truncate(limit);
    upcoming
}

// Same month and day in `year`, with Feb 29 falling back to Feb 28
fn date_in_year(base_date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, base_date.month(), base_date.day()).or_else(|| {
        if base_date.month() == 2 && base_date.day() == 29 {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}

// Blank form fields mean "not set", not "malformed"
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or_skip(raw: &str, source_id: &str) -> Option<NaiveDate> {
    let date = parse_event_date(raw);
    if date.is_none() {
        warn!(source_id, date = raw, "Skipping occurrence with malformed date");
    }
    date
}
