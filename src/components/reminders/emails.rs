use super::dispatcher::{EmailAttachment, OutgoingEmail};
use crate::components::store::backup::backup_file_name;
use crate::components::store::models::{AppState, GiftIdea, IdeaStatus, NotificationSettings, Relationship};
use crate::occurrences::labels::{countdown_label, subject_countdown};
use crate::occurrences::{days_until_label, OccurrenceResult, Urgency};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Datelike, NaiveDate};

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

const BASE_STYLE: &str = "body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 0; background-color: #f8f9fa; }
.container { max-width: 600px; margin: 0 auto; background-color: white; }
.content { padding: 40px 20px; }
.cta-button { display: inline-block; background: linear-gradient(135deg, #8B5A87 0%, #D4A574 100%); color: white; text-decoration: none; padding: 15px 30px; border-radius: 25px; font-weight: bold; margin: 10px 5px; }
.footer { background-color: #f8f9fa; padding: 20px; text-align: center; color: #666; font-size: 14px; }";

/// Everything the event reminder email shows
#[derive(Debug)]
pub struct EventReminder<'a> {
    pub occurrence: &'a OccurrenceResult,
    pub relationship: Option<Relationship>,
    /// Open gift ideas for the person, at most four are shown
    pub suggestions: Vec<&'a GiftIdea>,
}

/// Counters at the top of the monthly digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigestStats {
    pub total_people: usize,
    pub total_ideas: usize,
    pub purchased_ideas: usize,
    pub upcoming_events: usize,
}

impl DigestStats {
    pub fn from_state(state: &AppState, upcoming_events: usize) -> Self {
        Self {
            total_people: state.people.len(),
            total_ideas: state.gift_ideas.len(),
            purchased_ideas: state
                .gift_ideas
                .iter()
                .filter(|idea| idea.status == IdeaStatus::Purchased)
                .count(),
            upcoming_events,
        }
    }
}

/// A recent idea row with its resolved person name
#[derive(Debug)]
pub struct DigestIdea<'a> {
    pub idea: &'a GiftIdea,
    pub person_name: Option<&'a str>,
}

/// Everything the monthly digest shows
#[derive(Debug)]
pub struct MonthlyDigest<'a> {
    pub month: u32,
    pub stats: DigestStats,
    pub upcoming: &'a [OccurrenceResult],
    pub recent_ideas: Vec<DigestIdea<'a>>,
}

/// Render the reminder for one upcoming occurrence
pub fn event_reminder_email(to: &str, reminder: &EventReminder<'_>, app_url: &str, locale: &str) -> OutgoingEmail {
    let occurrence = reminder.occurrence;
    let urgency = Urgency::from_days(occurrence.days_until);
    let title = escape_html(&occurrence.title);
    let person = escape_html(&occurrence.person_name);

    let relationship_row = reminder
        .relationship
        .map(|relationship| {
            detail_row(
                &t!("reminder_label_relationship", locale = locale),
                &escape_html(&relationship.label(locale)),
            )
        })
        .unwrap_or_default();

    let suggestions = if reminder.suggestions.is_empty() {
        String::new()
    } else {
        let cards: String = reminder
            .suggestions
            .iter()
            .take(4)
            .map(|idea| suggestion_card(idea))
            .collect();
        format!(
            r#"<h3 style="color: #8B5A87;">{heading}</h3>
<div class="suggestions-grid">{cards}</div>"#,
            heading = t!("reminder_suggestions_heading", locale = locale, name = &person),
            cards = cards,
        )
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{page_title}</title>
<style>
{base_style}
.header {{ background: linear-gradient(135deg, {color} 0%, #D4A574 100%); padding: 40px 20px; text-align: center; color: white; }}
.urgency-badge {{ background-color: rgba(255,255,255,0.2); padding: 8px 16px; border-radius: 20px; font-size: 12px; font-weight: bold; margin-bottom: 10px; display: inline-block; }}
.countdown {{ font-size: 48px; font-weight: bold; margin: 20px 0; }}
.event-details {{ background-color: #f8f9fa; border-radius: 12px; padding: 20px; margin: 20px 0; }}
.detail-row {{ display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #e9ecef; }}
.suggestions-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin: 30px 0; }}
.suggestion-card {{ border: 1px solid #e9ecef; border-radius: 12px; overflow: hidden; }}
.suggestion-image {{ width: 100%; height: 150px; object-fit: cover; }}
</style>
</head>
<body>
<div class="container">
<div class="header">
<div class="urgency-badge">{badge}</div>
<h1>{heading}</h1>
<div class="countdown">{countdown}</div>
</div>
<div class="content">
<div class="event-details">
<h3 style="color: #8B5A87; margin-top: 0;">{details_heading}</h3>
{event_row}{person_row}{relationship_row}{date_row}
</div>
{suggestions}
<div style="text-align: center; margin: 30px 0;">
<a href="{app_url}/gift-suggestions" class="cta-button">{cta_suggestions}</a>
<a href="{app_url}/ideas" class="cta-button">{cta_ideas}</a>
</div>
<p style="color: #666; text-align: center; line-height: 1.6;">{closing}</p>
</div>
<div class="footer"><p>{footer}</p></div>
</div>
</body>
</html>"#,
        page_title = t!("reminder_page_title", locale = locale, title = &title),
        base_style = BASE_STYLE,
        color = urgency.color(),
        badge = urgency.badge(locale),
        heading = t!("reminder_heading", locale = locale),
        countdown = countdown_label(occurrence.days_until, locale),
        details_heading = t!("reminder_details_heading", locale = locale),
        event_row = detail_row(&t!("reminder_label_event", locale = locale), &title),
        person_row = detail_row(&t!("reminder_label_person", locale = locale), &person),
        relationship_row = relationship_row,
        date_row = detail_row(
            &t!("reminder_label_date", locale = locale),
            &long_date(occurrence.occurs_on, locale)
        ),
        suggestions = suggestions,
        app_url = escape_html(app_url),
        cta_suggestions = t!("reminder_cta_suggestions", locale = locale),
        cta_ideas = t!("reminder_cta_ideas", locale = locale),
        closing = urgency.closing(locale),
        footer = t!("footer_tagline", locale = locale),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: format!(
            "{} {} - {}",
            urgency.badge(locale),
            occurrence.title,
            subject_countdown(occurrence.days_until, locale)
        ),
        html,
        attachments: Vec::new(),
    }
}

/// Render the monthly digest
pub fn monthly_digest_email(to: &str, digest: &MonthlyDigest<'_>, app_url: &str, locale: &str) -> OutgoingEmail {
    let month = month_name(digest.month, locale);
    let stats = digest.stats;

    let events = if digest.upcoming.is_empty() {
        String::new()
    } else {
        let rows: String = digest
            .upcoming
            .iter()
            .map(|o| {
                format!(
                    r#"<div class="event-item"><div><div class="event-title">{}</div><div class="event-person">{}</div></div><div class="event-date">{}</div></div>"#,
                    escape_html(&o.title),
                    escape_html(&o.person_name),
                    days_until_label(o.days_until, locale),
                )
            })
            .collect();
        format!(
            r#"<div class="section"><div class="section-title">{}</div>{}</div>"#,
            t!("digest_events_heading", locale = locale),
            rows
        )
    };

    let ideas = if digest.recent_ideas.is_empty() {
        String::new()
    } else {
        let unassigned = t!("unassigned", locale = locale).to_string();
        let rows: String = digest
            .recent_ideas
            .iter()
            .take(5)
            .map(|row| {
                format!(
                    r#"<div class="idea-item"><img src="{}" alt="{}" class="idea-image"><div class="idea-details"><div class="idea-title">{}</div><div class="idea-person">{}</div></div></div>"#,
                    escape_html(row.idea.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)),
                    escape_html(&row.idea.title),
                    escape_html(&row.idea.title),
                    escape_html(row.person_name.unwrap_or(&unassigned)),
                )
            })
            .collect();
        format!(
            r#"<div class="section"><div class="section-title">{}</div>{}</div>"#,
            t!("digest_ideas_heading", locale = locale),
            rows
        )
    };

    let tip = if stats.upcoming_events > 0 {
        t!("digest_tip_upcoming", locale = locale)
    } else if stats.total_ideas == 0 {
        t!("digest_tip_empty", locale = locale)
    } else {
        t!("digest_tip_keep_going", locale = locale)
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{page_title}</title>
<style>
{base_style}
.header {{ background: linear-gradient(135deg, #8B5A87 0%, #D4A574 100%); padding: 40px 20px; text-align: center; color: white; }}
.stats-grid {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 20px; margin: 30px 0; }}
.stat-card {{ background-color: #f8f9fa; border-radius: 12px; padding: 20px; text-align: center; }}
.stat-number {{ font-size: 32px; font-weight: bold; color: #8B5A87; margin-bottom: 5px; }}
.stat-label {{ color: #666; font-size: 14px; }}
.section-title {{ color: #8B5A87; font-size: 20px; font-weight: bold; margin-bottom: 15px; }}
.event-item, .idea-item {{ background-color: #f8f9fa; border-radius: 8px; padding: 15px; margin-bottom: 10px; display: flex; justify-content: space-between; align-items: center; }}
.event-date {{ color: #8B5A87; font-weight: bold; }}
.idea-image {{ width: 50px; height: 50px; object-fit: cover; border-radius: 8px; margin-right: 15px; }}
</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>{heading}</h1>
<p style="margin: 10px 0 0 0; opacity: 0.9;">{subheading}</p>
</div>
<div class="content">
<p style="font-size: 18px; color: #333; line-height: 1.6; text-align: center;">{intro}</p>
<div class="stats-grid">
{stat_people}{stat_ideas}{stat_purchased}{stat_upcoming}
</div>
{events}
{ideas}
<div style="text-align: center; margin: 40px 0;">
<a href="{app_url}" class="cta-button">{cta_home}</a>
<a href="{app_url}/gift-suggestions" class="cta-button">{cta_search}</a>
</div>
<div style="background-color: #f8f9fa; border-radius: 12px; padding: 20px; text-align: center; margin: 30px 0;">
<h3 style="color: #8B5A87; margin-top: 0;">{tip_heading}</h3>
<p style="color: #666; line-height: 1.6; margin-bottom: 0;">{tip}</p>
</div>
</div>
<div class="footer">
<p>{footer}</p>
<p style="margin-top: 10px; font-size: 12px; color: #999;">{footer_reason}</p>
</div>
</div>
</body>
</html>"#,
        page_title = t!("digest_page_title", locale = locale, month = &month),
        base_style = BASE_STYLE,
        heading = t!("digest_heading", locale = locale, month = &month),
        subheading = t!("digest_subheading", locale = locale),
        intro = t!("digest_intro", locale = locale, month = &month),
        stat_people = stat_card(stats.total_people, &t!("digest_stat_people", locale = locale)),
        stat_ideas = stat_card(stats.total_ideas, &t!("digest_stat_ideas", locale = locale)),
        stat_purchased = stat_card(stats.purchased_ideas, &t!("digest_stat_purchased", locale = locale)),
        stat_upcoming = stat_card(stats.upcoming_events, &t!("digest_stat_upcoming", locale = locale)),
        events = events,
        ideas = ideas,
        app_url = escape_html(app_url),
        cta_home = t!("digest_cta_home", locale = locale),
        cta_search = t!("digest_cta_search", locale = locale),
        tip_heading = t!("digest_tip_heading", locale = locale),
        tip = tip,
        footer = t!("footer_tagline", locale = locale),
        footer_reason = t!("digest_footer_reason", locale = locale),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: t!("digest_subject", locale = locale, month = &month).to_string(),
        html,
        attachments: Vec::new(),
    }
}

/// Render the backup email with `encoded` attached as a text file
pub fn backup_email(to: &str, encoded: &str, token: &str, date: NaiveDate, locale: &str) -> OutgoingEmail {
    let html = format!(
        "<div>\n<p>{}</p>\n<p>{}</p>\n<p><strong>{}</strong> {}</p>\n<p>{}</p>\n<p>{}</p>\n</div>",
        t!("backup_greeting", locale = locale),
        t!("backup_body", locale = locale),
        t!("backup_token_label", locale = locale),
        escape_html(token),
        t!("backup_usage", locale = locale),
        t!("backup_signature", locale = locale),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: t!("backup_subject", locale = locale).to_string(),
        html,
        attachments: vec![EmailAttachment {
            filename: backup_file_name(date, "txt"),
            content: STANDARD.encode(encoded),
        }],
    }
}

/// Render the welcome email sent when someone subscribes.
///
/// Lists the reminder and digest settings, and links to the unsubscribe page
/// with `unsubscribe_token`.
pub fn welcome_email(
    to: &str,
    settings: &NotificationSettings,
    app_url: &str,
    unsubscribe_token: &str,
    locale: &str,
) -> OutgoingEmail {
    let on_off = |enabled: bool| {
        if enabled {
            t!("welcome_enabled", locale = locale).to_string()
        } else {
            t!("welcome_disabled", locale = locale).to_string()
        }
    };

    let reminders = &settings.event_reminders;
    let mut rows = detail_row(&t!("welcome_label_reminders", locale = locale), &on_off(reminders.enabled));
    if reminders.enabled {
        rows.push_str(&detail_row(
            &t!("welcome_label_custom", locale = locale),
            &t!("welcome_custom_value", locale = locale, count = reminders.custom_days),
        ));
        rows.push_str(&detail_row(
            &t!("welcome_label_week_before", locale = locale),
            &on_off(reminders.week_before),
        ));
        rows.push_str(&detail_row(
            &t!("welcome_label_day_before", locale = locale),
            &on_off(reminders.day_before),
        ));
    }

    let digest = &settings.monthly_digest;
    let digest_value = if digest.enabled {
        t!("welcome_digest_day", locale = locale, day = digest.day_of_month).to_string()
    } else {
        on_off(false)
    };
    rows.push_str(&detail_row(&t!("welcome_label_digest", locale = locale), &digest_value));

    let app_url = escape_html(app_url);
    let subject = t!("welcome_subject", locale = locale).to_string();
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{subject}</title>
<style>
{base_style}
.header {{ background: linear-gradient(135deg, #8B5A87 0%, #D4A574 100%); padding: 40px 20px; text-align: center; color: white; }}
.settings-box {{ background-color: #f8f9fa; border-radius: 12px; padding: 20px; margin: 20px 0; }}
.detail-row {{ display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #e9ecef; }}
.unsubscribe {{ color: #999; font-size: 12px; margin-top: 20px; }}
</style>
</head>
<body>
<div class="container">
<div class="header"><h1>{subject}</h1></div>
<div class="content">
<p style="font-size: 18px; color: #333; line-height: 1.6;">{intro}</p>
<div class="settings-box">
<h3 style="color: #8B5A87; margin-top: 0;">{settings_heading}</h3>
{rows}
</div>
<p style="color: #666; line-height: 1.6;">{outro}</p>
<div style="text-align: center;"><a href="{app_url}" class="cta-button">{cta}</a></div>
</div>
<div class="footer">
<p>{footer}</p>
<div class="unsubscribe"><a href="{app_url}/unsubscribe?token={token}">{unsubscribe}</a></div>
</div>
</div>
</body>
</html>"#,
        subject = escape_html(&subject),
        base_style = BASE_STYLE,
        intro = t!("welcome_intro", locale = locale),
        settings_heading = t!("welcome_settings_heading", locale = locale),
        rows = rows,
        outro = t!("welcome_outro", locale = locale),
        app_url = app_url,
        cta = t!("welcome_cta", locale = locale),
        footer = t!("footer_tagline", locale = locale),
        token = escape_html(unsubscribe_token),
        unsubscribe = t!("welcome_unsubscribe", locale = locale),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject,
        html,
        attachments: Vec::new(),
    }
}

/// Localized month name, 1-based
pub fn month_name(month: u32, locale: &str) -> String {
    match month {
        1 => t!("month_1", locale = locale),
        2 => t!("month_2", locale = locale),
        3 => t!("month_3", locale = locale),
        4 => t!("month_4", locale = locale),
        5 => t!("month_5", locale = locale),
        6 => t!("month_6", locale = locale),
        7 => t!("month_7", locale = locale),
        8 => t!("month_8", locale = locale),
        9 => t!("month_9", locale = locale),
        10 => t!("month_10", locale = locale),
        11 => t!("month_11", locale = locale),
        _ => t!("month_12", locale = locale),
    }
    .to_string()
}

/// Date in words, e.g. "15 de junio de 2024"
pub fn long_date(date: NaiveDate, locale: &str) -> String {
    t!(
        "long_date",
        locale = locale,
        day = date.day(),
        month = month_name(date.month(), locale),
        year = date.year()
    )
    .to_string()
}

/// Escape text for interpolation into HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn detail_row(label: &str, value: &str) -> String {
    format!(r#"<div class="detail-row"><span>{}</span><strong>{}</strong></div>"#, label, value)
}

fn stat_card(number: usize, label: &str) -> String {
    format!(
        r#"<div class="stat-card"><div class="stat-number">{}</div><div class="stat-label">{}</div></div>"#,
        number, label
    )
}

fn suggestion_card(idea: &GiftIdea) -> String {
    let price = idea
        .price
        .map(|p| format!(r#"<div class="suggestion-price">€{:.2}</div>"#, p))
        .unwrap_or_default();
    format!(
        r#"<div class="suggestion-card"><img src="{}" alt="{}" class="suggestion-image"><div class="suggestion-content"><div class="suggestion-title">{}</div>{}</div></div>"#,
        escape_html(idea.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)),
        escape_html(&idea.title),
        escape_html(&idea.title),
        price,
    )
}
