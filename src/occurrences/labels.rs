/// How close an occurrence is, as shown in reminder emails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Three days or less
    Urgent,
    /// Within a week
    Soon,
    Upcoming,
}

impl Urgency {
    pub fn from_days(days_until: i64) -> Self {
        if days_until <= 3 {
            Urgency::Urgent
        } else if days_until <= 7 {
            Urgency::Soon
        } else {
            Urgency::Upcoming
        }
    }

    /// Header colour for the reminder email
    pub fn color(&self) -> &'static str {
        match self {
            Urgency::Urgent => "#dc3545",
            Urgency::Soon => "#fd7e14",
            Urgency::Upcoming => "#8B5A87",
        }
    }

    pub fn badge(&self, locale: &str) -> String {
        match self {
            Urgency::Urgent => t!("urgency_urgent", locale = locale),
            Urgency::Soon => t!("urgency_soon", locale = locale),
            Urgency::Upcoming => t!("urgency_upcoming", locale = locale),
        }
        .to_string()
    }

    /// Closing line of the reminder email
    pub fn closing(&self, locale: &str) -> String {
        match self {
            Urgency::Urgent => t!("reminder_closing_urgent", locale = locale),
            Urgency::Soon => t!("reminder_closing_soon", locale = locale),
            Urgency::Upcoming => t!("reminder_closing_upcoming", locale = locale),
        }
        .to_string()
    }
}

/// Row label for an upcoming event: "Hoy", "Mañana" or "{n} días"
pub fn days_until_label(days_until: i64, locale: &str) -> String {
    match days_until {
        0 => t!("days_today", locale = locale).to_string(),
        1 => t!("days_tomorrow", locale = locale).to_string(),
        n => t!("days_many", locale = locale, count = n).to_string(),
    }
}

/// Big countdown in the reminder email header
pub fn countdown_label(days_until: i64, locale: &str) -> String {
    match days_until {
        0 => t!("countdown_today", locale = locale).to_string(),
        1 => t!("countdown_tomorrow", locale = locale).to_string(),
        n => t!("days_many", locale = locale, count = n).to_string(),
    }
}

/// Countdown used in the reminder email subject
pub fn subject_countdown(days_until: i64, locale: &str) -> String {
    match days_until {
        0 => t!("subject_today", locale = locale).to_string(),
        1 => t!("subject_tomorrow", locale = locale).to_string(),
        n => t!("subject_days", locale = locale, count = n).to_string(),
    }
}

/// Shown when nothing falls inside the horizon
pub fn empty_upcoming_label(locale: &str) -> String {
    t!("upcoming_none", locale = locale).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_until_label_spanish() {
        assert_eq!(days_until_label(0, "es"), "Hoy");
        assert_eq!(days_until_label(1, "es"), "Mañana");
        assert_eq!(days_until_label(12, "es"), "12 días");
    }

    #[test]
    fn test_days_until_label_english() {
        assert_eq!(days_until_label(0, "en"), "Today");
        assert_eq!(days_until_label(1, "en"), "Tomorrow");
        assert_eq!(days_until_label(2, "en"), "2 days");
        assert_eq!(empty_upcoming_label("en"), "No upcoming events");
    }

    #[test]
    fn test_countdowns() {
        assert_eq!(countdown_label(0, "es"), "¡HOY!");
        assert_eq!(countdown_label(5, "es"), "5 días");
        assert_eq!(subject_countdown(1, "es"), "¡Es mañana!");
        assert_eq!(subject_countdown(9, "es"), "En 9 días");
    }

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(Urgency::from_days(0), Urgency::Urgent);
        assert_eq!(Urgency::from_days(3), Urgency::Urgent);
        assert_eq!(Urgency::from_days(4), Urgency::Soon);
        assert_eq!(Urgency::from_days(7), Urgency::Soon);
        assert_eq!(Urgency::from_days(8), Urgency::Upcoming);

        assert_eq!(Urgency::Urgent.color(), "#dc3545");
        assert_eq!(Urgency::Soon.badge("es"), "¡Pronto!");
    }
}
