use serde::{Deserialize, Deserializer, Serialize};

/// Everything the app persists, as one blob
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub events: Vec<StandaloneEvent>,
    #[serde(default, alias = "savedIdeas")]
    pub gift_ideas: Vec<GiftIdea>,
    #[serde(default)]
    pub settings: Settings,
}

impl AppState {
    /// Find a person by id
    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    /// Gift ideas saved for a person, in stored order
    pub fn ideas_for<'a, 'b>(&'a self, person_id: &'b str) -> impl Iterator<Item = &'a GiftIdea> + 'b
    where
        'a: 'b,
    {
        self.gift_ideas
            .iter()
            .filter(move |idea| idea.person_id.as_deref() == Some(person_id))
    }
}

/// Relationship between the user and a person
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Partner,
    Spouse,
    Parent,
    Sibling,
    Child,
    Friend,
    Coworker,
    Colleague,
    Grandparent,
    #[default]
    #[serde(other)]
    Other,
}

impl Relationship {
    /// Localized label
    pub fn label(&self, locale: &str) -> String {
        match self {
            Relationship::Partner => t!("relationship_partner", locale = locale),
            Relationship::Spouse => t!("relationship_spouse", locale = locale),
            Relationship::Parent => t!("relationship_parent", locale = locale),
            Relationship::Sibling => t!("relationship_sibling", locale = locale),
            Relationship::Child => t!("relationship_child", locale = locale),
            Relationship::Friend => t!("relationship_friend", locale = locale),
            Relationship::Coworker => t!("relationship_coworker", locale = locale),
            Relationship::Colleague => t!("relationship_colleague", locale = locale),
            Relationship::Grandparent => t!("relationship_grandparent", locale = locale),
            Relationship::Other => t!("relationship_other", locale = locale),
        }
        .to_string()
    }
}

/// A tracked person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anniversary: Option<String>,
    #[serde(default)]
    pub other_events: Vec<PersonEvent>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Person {
    /// Create a person with only the required fields
    pub fn new(id: impl Into<String>, name: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            relationship,
            birthday: None,
            anniversary: None,
            other_events: Vec::new(),
            interests: Vec::new(),
            tags: Vec::new(),
            notes: None,
            gender: None,
            created_at: None,
        }
    }
}

/// A dated event that belongs to a person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An event from the calendar, optionally linked to a person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

/// Purchase state of a gift idea
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    #[default]
    Pending,
    Purchased,
    Given,
    #[serde(other)]
    Other,
}

/// A saved gift idea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GiftIdea {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_price", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: IdeaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl GiftIdea {
    /// Whether the idea still needs buying
    pub fn is_open(&self) -> bool {
        !matches!(self.status, IdeaStatus::Purchased | IdeaStatus::Given)
    }

    /// Timestamp used to order ideas by recency
    pub fn recency_key(&self) -> &str {
        self.created_at
            .as_deref()
            .or(self.saved_at.as_deref())
            .unwrap_or("")
    }
}

// Prices were saved either as numbers or as the raw text of the form field
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(n)) => Some(n),
        Some(RawPrice::Text(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        None => None,
    })
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub has_seen_onboarding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backup_email: Option<String>,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Email notification preferences
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subscribed: bool,
    #[serde(default)]
    pub event_reminders: EventReminderSettings,
    #[serde(default)]
    pub monthly_digest: MonthlyDigestSettings,
}

/// When event reminder emails are sent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventReminderSettings {
    pub enabled: bool,
    pub custom_days: i64,
    pub week_before: bool,
    pub day_before: bool,
}

impl Default for EventReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            custom_days: 14,
            week_before: true,
            day_before: true,
        }
    }
}

impl EventReminderSettings {
    /// Days before an occurrence on which a reminder is due
    pub fn lead_times(&self) -> Vec<i64> {
        let mut days = vec![0];
        if self.day_before {
            days.push(1);
        }
        if self.week_before {
            days.push(7);
        }
        if self.custom_days > 0 && !days.contains(&self.custom_days) {
            days.push(self.custom_days);
        }
        days
    }
}

/// Monthly digest preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyDigestSettings {
    pub enabled: bool,
    pub day_of_month: u32,
}

impl Default for MonthlyDigestSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            day_of_month: 1,
        }
    }
}
