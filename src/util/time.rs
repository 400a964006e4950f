use chrono::{DateTime, Utc};

/// Compact age label for list rows: "now", "5m", "3h", "2d", then "Jan 02".
///
/// Timestamps in the future (clock skew) read as "now".
pub fn format_relative(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(published);
    let minutes = age.num_minutes();

    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else if age.num_hours() < 24 {
        format!("{}h", age.num_hours())
    } else if age.num_days() < 7 {
        format!("{}d", age.num_days())
    } else {
        published.format("%b %d").to_string()
    }
}
