use chrono::TimeZone;
use serde::Serialize;

use crate::models::Target;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

impl PushNotification {
    pub fn from_target(target: &Target) -> Self {
        Self {
            title: target.title().to_owned(),
            body: target.description().to_owned(),
        }
    }
}

/// Text read out on a reminder call. Timing is rendered on the local clock of `tz`
/// and left out for undated targets.
pub fn spoken_text<Tz>(target: &Target, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut text = format!("Reminder from TaskYell. {}.", target.title().trim());

    if let Some(starts_at) = target.starts_at() {
        let local = starts_at.with_timezone(tz);
        text.push_str(&format!(" Starts at {}.", local.format("%H:%M")));
    }

    let description = target.description().trim();
    if !description.is_empty() {
        text.push(' ');
        text.push_str(description);
    }

    text
}
