use super::dispatcher::{is_valid_email, NotificationDispatcher};
use super::emails::{
    backup_email, event_reminder_email, monthly_digest_email, welcome_email, DigestIdea,
    DigestStats, EventReminder, MonthlyDigest,
};
use crate::components::store::backup::encode_backup;
use crate::components::store::models::{AppState, GiftIdea};
use crate::components::store::StateStore;
use crate::config::Config;
use crate::error::{notification_error, MementoResult};
use crate::occurrences::{collect_upcoming, OccurrenceResult};
use crate::utils::time::is_day_of_month;
use chrono::{Datelike, NaiveDate};
use tracing::{debug, error, info};

/// What one daily check sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckSummary {
    pub reminders_sent: usize,
    pub reminders_failed: usize,
    pub digest_sent: bool,
}

/// Occurrences that hit one of the configured lead times today
pub fn due_reminders(
    state: &AppState,
    today: NaiveDate,
    horizon_days: i64,
    locale: &str,
) -> Vec<OccurrenceResult> {
    let settings = &state.settings.notifications.event_reminders;
    let lead_times = settings.lead_times();
    // Look far enough ahead for the longest lead time
    let horizon = lead_times.iter().copied().fold(horizon_days, i64::max);

    collect_upcoming(&state.people, &state.events, today, horizon, i64::MAX, locale)
        .into_iter()
        .filter(|o| lead_times.contains(&o.days_until))
        .collect()
}

/// Open gift ideas for the person an occurrence belongs to
pub fn suggestions_for<'a>(state: &'a AppState, occurrence: &OccurrenceResult) -> Vec<&'a GiftIdea> {
    match occurrence.person_id.as_deref() {
        Some(person_id) => state
            .ideas_for(person_id)
            .filter(|idea| idea.is_open())
            .take(4)
            .collect(),
        None => Vec::new(),
    }
}

/// Most recent ideas first, at most `limit`
pub fn recent_ideas(state: &AppState, limit: usize) -> Vec<DigestIdea<'_>> {
    let mut ideas: Vec<&GiftIdea> = state.gift_ideas.iter().collect();
    // RFC 3339 timestamps sort lexically; stable keeps stored order for ties
    ideas.sort_by(|a, b| b.recency_key().cmp(a.recency_key()));
    ideas
        .into_iter()
        .take(limit)
        .map(|idea| DigestIdea {
            idea,
            person_name: idea
                .person_id
                .as_deref()
                .and_then(|id| state.person(id))
                .map(|p| p.name.as_str()),
        })
        .collect()
}

/// Send one reminder per due occurrence. Failures are logged and counted.
pub async fn send_event_reminders(
    config: &Config,
    state: &AppState,
    dispatcher: &dyn NotificationDispatcher,
    today: NaiveDate,
) -> (usize, usize) {
    let to = &state.settings.notifications.email;
    let due = due_reminders(state, today, config.reminder_horizon_days, &config.locale);
    info!("{} reminder(s) due on {}", due.len(), today);

    let mut sent = 0;
    let mut failed = 0;
    for occurrence in &due {
        let reminder = EventReminder {
            occurrence,
            relationship: occurrence
                .person_id
                .as_deref()
                .and_then(|id| state.person(id))
                .map(|p| p.relationship),
            suggestions: suggestions_for(state, occurrence),
        };
        let email = event_reminder_email(to, &reminder, &config.app_url, &config.locale);

        match dispatcher.send(&email).await {
            Ok(()) => sent += 1,
            Err(e) => {
                error!("Failed to send reminder for {}: {}", occurrence.source_id, e);
                failed += 1;
            }
        }
    }

    (sent, failed)
}

/// Send the monthly digest for `today`'s month
pub async fn send_monthly_digest(
    config: &Config,
    state: &AppState,
    dispatcher: &dyn NotificationDispatcher,
    today: NaiveDate,
) -> MementoResult<()> {
    let upcoming_all = collect_upcoming(
        &state.people,
        &state.events,
        today,
        config.digest_horizon_days,
        i64::MAX,
        &config.locale,
    );
    let limit = usize::try_from(config.upcoming_limit).unwrap_or(0);
    let shown = upcoming_all.len().min(limit);

    let digest = MonthlyDigest {
        month: today.month(),
        stats: DigestStats::from_state(state, upcoming_all.len()),
        upcoming: &upcoming_all[..shown],
        recent_ideas: recent_ideas(state, 5),
    };

    let email = monthly_digest_email(
        &state.settings.notifications.email,
        &digest,
        &config.app_url,
        &config.locale,
    );
    dispatcher.send(&email).await
}

/// Run everything due on `today`: event reminders and, on its day, the digest
pub async fn run_daily_check(
    config: &Config,
    store: &dyn StateStore,
    dispatcher: &dyn NotificationDispatcher,
    today: NaiveDate,
) -> MementoResult<CheckSummary> {
    let state = store.load().await?;
    let settings = &state.settings.notifications;
    let mut summary = CheckSummary::default();

    if !settings.subscribed || !is_valid_email(&settings.email) {
        debug!("Notifications not subscribed or no valid email, nothing to send");
        return Ok(summary);
    }

    if settings.event_reminders.enabled {
        let (sent, failed) = send_event_reminders(config, &state, dispatcher, today).await;
        summary.reminders_sent = sent;
        summary.reminders_failed = failed;
    }

    if settings.monthly_digest.enabled && is_day_of_month(today, settings.monthly_digest.day_of_month) {
        match send_monthly_digest(config, &state, dispatcher, today).await {
            Ok(()) => {
                info!("Monthly digest sent for {}", today.format("%Y-%m"));
                summary.digest_sent = true;
            }
            Err(e) => error!("Failed to send monthly digest: {}", e),
        }
    }

    Ok(summary)
}

/// Email an encoded backup to `to` and remember the address
pub async fn send_backup(
    config: &Config,
    store: &dyn StateStore,
    dispatcher: &dyn NotificationDispatcher,
    to: &str,
    today: NaiveDate,
) -> MementoResult<String> {
    if !is_valid_email(to) {
        return Err(notification_error(&format!("Invalid email address '{}'", to)));
    }

    let mut state = store.load().await?;
    let encoded = encode_backup(&state)?;
    let token: String = uuid::Uuid::new_v4().simple().to_string().chars().take(13).collect();

    let email = backup_email(to, &encoded, &token, today, &config.locale);
    dispatcher.send(&email).await?;

    state.settings.last_backup_email = Some(to.to_string());
    store.save(&state).await?;

    info!("Backup sent to {}", to);
    Ok(token)
}

/// Subscribe `to` to notifications and send the welcome email.
///
/// The address and `subscribed` flag are saved only once the email was
/// accepted. Returns the unsubscribe token used in the email.
pub async fn send_welcome(
    config: &Config,
    store: &dyn StateStore,
    dispatcher: &dyn NotificationDispatcher,
    to: &str,
) -> MementoResult<String> {
    if !is_valid_email(to) {
        return Err(notification_error(&format!("Invalid email address '{}'", to)));
    }

    let mut state = store.load().await?;
    let token = uuid::Uuid::new_v4().simple().to_string();

    let email = welcome_email(
        to,
        &state.settings.notifications,
        &config.app_url,
        &token,
        &config.locale,
    );
    dispatcher.send(&email).await?;

    state.settings.notifications.email = to.to_string();
    state.settings.notifications.subscribed = true;
    store.save(&state).await?;

    info!("Subscribed {} to notifications", to);
    Ok(token)
}

/// Stop all notification emails. Returns whether anything changed.
pub async fn unsubscribe(store: &dyn StateStore) -> MementoResult<bool> {
    let mut state = store.load().await?;
    if !state.settings.notifications.subscribed {
        return Ok(false);
    }

    state.settings.notifications.subscribed = false;
    store.save(&state).await?;
    info!("Unsubscribed {} from notifications", state.settings.notifications.email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::reminders::dispatcher::OutgoingEmail;
    use crate::components::store::models::{IdeaStatus, Person, Relationship, StandaloneEvent};
    use crate::components::store::MemoryStore;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail_subjects_containing: Option<String>,
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send(&self, email: &OutgoingEmail) -> MementoResult<()> {
            if let Some(needle) = &self.fail_subjects_containing {
                if email.subject.contains(needle.as_str()) {
                    return Err(notification_error("provider down"));
                }
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn idea(id: &str, person_id: Option<&str>, status: IdeaStatus, created_at: &str) -> GiftIdea {
        GiftIdea {
            id: id.to_string(),
            title: format!("Idea {}", id),
            person_id: person_id.map(str::to_string),
            description: None,
            price: None,
            image_url: None,
            url: None,
            category: None,
            status,
            created_at: Some(created_at.to_string()),
            saved_at: None,
        }
    }

    fn state() -> AppState {
        let mut ana = Person::new("ana", "Ana", Relationship::Sibling);
        ana.birthday = Some("1990-06-11".to_string()); // 1 day from 2024-06-10
        let mut luis = Person::new("luis", "Luis", Relationship::Friend);
        luis.birthday = Some("1988-06-17".to_string()); // 7 days
        let mut eva = Person::new("eva", "Eva", Relationship::Parent);
        eva.birthday = Some("1960-06-14".to_string()); // 4 days, not a lead time

        let mut state = AppState::default();
        state.people = vec![ana, luis, eva];
        state.events.push(StandaloneEvent {
            id: "cena".to_string(),
            title: "Cena de empresa".to_string(),
            date: "2024-06-24".to_string(), // 14 days
            person_id: None,
            recurring: false,
        });
        state.gift_ideas = vec![
            idea("g1", Some("ana"), IdeaStatus::Pending, "2024-05-01T10:00:00.000Z"),
            idea("g2", Some("ana"), IdeaStatus::Purchased, "2024-05-03T10:00:00.000Z"),
            idea("g3", None, IdeaStatus::Pending, "2024-05-02T10:00:00.000Z"),
        ];
        state.settings.notifications.email = "yo@example.com".to_string();
        state.settings.notifications.subscribed = true;
        state
    }

    #[test]
    fn test_due_reminders_match_lead_times() {
        let due = due_reminders(&state(), date(2024, 6, 10), 30, "es");
        let ids: Vec<&str> = due.iter().map(|o| o.source_id.as_str()).collect();
        assert_eq!(ids, vec!["birthday-ana", "birthday-luis", "cena"]);
    }

    #[test]
    fn test_custom_days_beyond_horizon_still_fire() {
        let mut state = state();
        state.settings.notifications.event_reminders.custom_days = 14;
        let due = due_reminders(&state, date(2024, 6, 10), 5, "es");
        assert!(due.iter().any(|o| o.source_id == "cena"));
    }

    #[test]
    fn test_suggestions_skip_bought_ideas() {
        let state = state();
        let due = due_reminders(&state, date(2024, 6, 10), 30, "es");
        let ids: Vec<&str> = suggestions_for(&state, &due[0]).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["g1"]);
        // Unassigned events get no suggestions
        assert!(suggestions_for(&state, &due[2]).is_empty());
    }

    #[test]
    fn test_recent_ideas_newest_first() {
        let state = state();
        let recent = recent_ideas(&state, 2);
        let ids: Vec<&str> = recent.iter().map(|r| r.idea.id.as_str()).collect();
        assert_eq!(ids, vec!["g2", "g3"]);
        assert_eq!(recent[0].person_name, Some("Ana"));
        assert_eq!(recent[1].person_name, None);
    }

    #[tokio::test]
    async fn test_daily_check_sends_reminders_and_digest() {
        let store = MemoryStore::new(state());
        let dispatcher = RecordingDispatcher::default();
        let config = Config::default();

        // June 1st: digest day, and Ana's birthday is ten days out (no reminder)
        let summary = run_daily_check(&config, &store, &dispatcher, date(2024, 6, 1))
            .await
            .unwrap();
        assert!(summary.digest_sent);
        assert_eq!(summary.reminders_sent, 0);

        let sent = dispatcher.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "yo@example.com");
        assert!(sent[0].subject.contains("junio"));
    }

    #[tokio::test]
    async fn test_daily_check_counts_failures_and_continues() {
        let store = MemoryStore::new(state());
        let dispatcher = RecordingDispatcher {
            fail_subjects_containing: Some("Luis".to_string()),
            ..RecordingDispatcher::default()
        };
        let config = Config::default();

        let summary = run_daily_check(&config, &store, &dispatcher, date(2024, 6, 10))
            .await
            .unwrap();
        assert_eq!(summary.reminders_sent, 2);
        assert_eq!(summary.reminders_failed, 1);
        assert!(!summary.digest_sent);
    }

    #[tokio::test]
    async fn test_daily_check_respects_subscription() {
        let mut unsubscribed = state();
        unsubscribed.settings.notifications.subscribed = false;
        let store = MemoryStore::new(unsubscribed);
        let dispatcher = RecordingDispatcher::default();

        let summary = run_daily_check(&Config::default(), &store, &dispatcher, date(2024, 6, 10))
            .await
            .unwrap();
        assert_eq!(summary, CheckSummary::default());
        assert!(dispatcher.sent.lock().unwrap().is_empty());

        let mut no_reminders = state();
        no_reminders.settings.notifications.event_reminders.enabled = false;
        let store = MemoryStore::new(no_reminders);
        let summary = run_daily_check(&Config::default(), &store, &dispatcher, date(2024, 6, 10))
            .await
            .unwrap();
        assert_eq!(summary.reminders_sent, 0);
    }

    #[tokio::test]
    async fn test_send_backup_records_address() {
        let store = MemoryStore::new(state());
        let dispatcher = RecordingDispatcher::default();
        let config = Config::default();

        let token = send_backup(&config, &store, &dispatcher, "copia@example.com", date(2024, 6, 10))
            .await
            .unwrap();
        assert_eq!(token.len(), 13);

        let sent = dispatcher.sent.lock().unwrap().clone();
        assert_eq!(sent[0].attachments[0].filename, "memento-backup-2024-06-10.txt");
        assert!(sent[0].html.contains(&token));

        let saved = store.load().await.unwrap();
        assert_eq!(saved.settings.last_backup_email.as_deref(), Some("copia@example.com"));

        let err = send_backup(&config, &store, &dispatcher, "not-an-email", date(2024, 6, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Notification(_)));
    }

    #[tokio::test]
    async fn test_welcome_subscribes_after_sending() {
        let mut fresh = state();
        fresh.settings.notifications.subscribed = false;
        fresh.settings.notifications.email = String::new();
        let store = MemoryStore::new(fresh);
        let dispatcher = RecordingDispatcher::default();
        let config = Config::default();

        let token = send_welcome(&config, &store, &dispatcher, "nueva@example.com")
            .await
            .unwrap();

        let sent = dispatcher.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "nueva@example.com");
        assert!(sent[0].html.contains(&format!("/unsubscribe?token={}", token)));

        let saved = store.load().await.unwrap();
        assert!(saved.settings.notifications.subscribed);
        assert_eq!(saved.settings.notifications.email, "nueva@example.com");

        // Subscribed now, so the daily check picks up reminders
        let summary = run_daily_check(&config, &store, &dispatcher, date(2024, 6, 10))
            .await
            .unwrap();
        assert_eq!(summary.reminders_sent, 3);

        assert!(unsubscribe(&store).await.unwrap());
        assert!(!unsubscribe(&store).await.unwrap());
        assert!(!store.load().await.unwrap().settings.notifications.subscribed);
    }

    #[tokio::test]
    async fn test_welcome_failure_leaves_state_alone() {
        let mut fresh = state();
        fresh.settings.notifications.subscribed = false;
        let store = MemoryStore::new(fresh.clone());
        let dispatcher = RecordingDispatcher {
            fail_subjects_containing: Some("Memento".to_string()),
            ..RecordingDispatcher::default()
        };

        assert!(send_welcome(&Config::default(), &store, &dispatcher, "nueva@example.com")
            .await
            .is_err());
        assert_eq!(store.load().await.unwrap(), fresh);

        let err = send_welcome(&Config::default(), &store, &dispatcher, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Notification(_)));
    }
}
