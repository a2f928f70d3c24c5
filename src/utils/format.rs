//! Display formatting helpers

use chrono::{DateTime, Utc};

/// Compact relative time, e.g. "just now", "42s ago", "3h ago"
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 5 {
        return "just now".to_string();
    }
    if seconds < 60 {
        return format!("{}s ago", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

/// Strip a `user/<14-digit timestamp>/` prefix, keeping the description
pub fn shorten_branch_name(name: &str) -> &str {
    let Some((user, rest)) = name.split_once('/') else {
        return name;
    };
    let Some((stamp, description)) = rest.split_once('/') else {
        return name;
    };

    let is_stamp = stamp.len() == 14 && stamp.bytes().all(|b| b.is_ascii_digit());
    if user.is_empty() || !is_stamp || description.is_empty() {
        return name;
    }
    description
}

/// Soft background color for a swimlane, stable for a given label
pub fn swimlane_color(label: &str) -> String {
    // h = c + (h << 5) - h, with the shift done in 32 bits
    let mut hash: f64 = 0.0;
    for unit in label.encode_utf16() {
        let shifted = ((hash as i64) as i32) << 5;
        hash = f64::from(unit) + (f64::from(shifted) - hash);
    }
    let hue = ((hash % 360.0) + 360.0) % 360.0;
    format!("hsl({} 30% 95%)", hue as i64)
}
