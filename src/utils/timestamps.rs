use chrono::{DateTime, Datelike, Utc};

/// Describe when a locked group opens:
/// - "unlocks in 3d 4h", "unlocks in 2h 5m", "unlocks in 12m"
/// - "ready to unlock" once the date has passed
pub fn format_countdown(unlock_at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let remaining = unlock_at.signed_duration_since(*now);
    if remaining.num_seconds() <= 0 {
        return "ready to unlock".to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;

    if days > 0 {
        format!("unlocks in {}d {}h", days, hours)
    } else if hours > 0 {
        format!("unlocks in {}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("unlocks in {}m", minutes)
    } else {
        "unlocks in <1m".to_string()
    }
}

/// Short calendar date: "Jan 15" this year, "Dec 3, 2024" otherwise
pub fn format_date(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    if timestamp.year() == now.year() {
        timestamp.format("%b %-d").to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}
