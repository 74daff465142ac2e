use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Parse a stored date. Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
pub fn parse_event_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    // Timestamps keep the calendar date they were written with
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Today's calendar date in the given timezone
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Calculate next daily run time in the timezone of `current_time`
pub fn next_daily_time<Tz: TimeZone>(
    current_time: &DateTime<Tz>,
    time_str: &str,
) -> Option<DateTime<Tz>> {
    let (hour, minute) = parse_time(time_str)?;
    let tz = current_time.timezone();

    // Create a datetime for today at the specified time
    let today = current_time.date_naive().and_hms_opt(hour, minute, 0)?;
    let mut next_time = tz.from_local_datetime(&today).earliest()?;

    // If the time has already passed today, schedule for tomorrow
    if *current_time >= next_time {
        let tomorrow = today.checked_add_signed(Duration::days(1))?;
        next_time = tz.from_local_datetime(&tomorrow).earliest()?;
    }

    Some(next_time)
}

/// Calculate the wait in seconds until `next_time`
pub fn calculate_wait_duration<Tz: TimeZone>(now: &DateTime<Tz>, next_time: &DateTime<Tz>) -> u64 {
    let seconds = next_time.clone().signed_duration_since(now.clone()).num_seconds();

    if seconds <= 0 {
        // Never spin: wait at least a minute when the target is right on top of us
        return 60;
    }

    seconds as u64
}

/// Last day of the given month
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// True when `today` is the configured day of the month, clamped to the month's length
pub fn is_day_of_month(today: NaiveDate, day_of_month: u32) -> bool {
    let last = last_day_of_month(today.year(), today.month());
    today.day() == day_of_month.clamp(1, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Madrid;

    #[test]
    fn test_parse_time() {
        // Valid cases
        assert_eq!(parse_time("00:00"), Some((0, 0)));
        assert_eq!(parse_time("12:30"), Some((12, 30)));
        assert_eq!(parse_time("23:59"), Some((23, 59)));

        // Invalid cases
        assert_eq!(parse_time("24:00"), None); // Hour out of range
        assert_eq!(parse_time("12:60"), None); // Minute out of range
        assert_eq!(parse_time("12:30:45"), None); // Too many parts
        assert_eq!(parse_time("12"), None); // Too few parts
        assert_eq!(parse_time("12:ab"), None); // Invalid minute
    }

    #[test]
    fn test_parse_event_date() {
        let expected = NaiveDate::from_ymd_opt(1990, 6, 15);
        assert_eq!(parse_event_date("1990-06-15"), expected);
        assert_eq!(parse_event_date(" 1990-06-15 "), expected);
        assert_eq!(parse_event_date("1990-06-15T00:00:00.000Z"), expected);
        assert_eq!(parse_event_date("1990-06-15T23:30:00+02:00"), expected);

        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("15/06/1990"), None);
        assert_eq!(parse_event_date("1990-02-30"), None);
        assert_eq!(parse_event_date("tomorrow"), None);
    }

    #[test]
    fn test_next_daily_time() {
        // Sunday, 2023-01-01 at 10:00
        let now = Madrid.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();

        // Later today
        let result = next_daily_time(&now, "15:30").unwrap();
        assert_eq!(result.format("%Y-%m-%d %H:%M").to_string(), "2023-01-01 15:30");

        // Earlier today, so tomorrow
        let result = next_daily_time(&now, "09:30").unwrap();
        assert_eq!(result.format("%Y-%m-%d %H:%M").to_string(), "2023-01-02 09:30");

        // Exactly now, so tomorrow
        let result = next_daily_time(&now, "10:00").unwrap();
        assert_eq!(result.format("%Y-%m-%d %H:%M").to_string(), "2023-01-02 10:00");

        assert_eq!(next_daily_time(&now, "25:00"), None);
    }

    #[test]
    fn test_next_daily_time_across_dst_change() {
        // Madrid moves to summer time on 2024-03-31, so the day is 23 hours long
        let now = Madrid.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
        let next = next_daily_time(&now, "09:00").unwrap();
        assert_eq!(next.format("%Y-%m-%d %H:%M").to_string(), "2024-03-31 09:00");
        assert_eq!(calculate_wait_duration(&now, &next), 20 * 3600);
    }

    #[test]
    fn test_calculate_wait_duration() {
        let now = Madrid.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();

        let target = now + Duration::hours(1);
        assert_eq!(calculate_wait_duration(&now, &target), 3600);

        // Target in the past gets the minimum wait
        let target = now - Duration::minutes(5);
        assert_eq!(calculate_wait_duration(&now, &target), 60);
    }

    #[test]
    fn test_day_of_month_clamps_to_month_length() {
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2023, 2), 28);
        assert_eq!(last_day_of_month(2023, 12), 31);

        let feb_end = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        assert!(is_day_of_month(feb_end, 31));
        assert!(!is_day_of_month(feb_end, 1));

        let first = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        assert!(is_day_of_month(first, 1));
        assert!(is_day_of_month(first, 0));
    }
}
