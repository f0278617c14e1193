use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{target::TargetRef, user::UserId};

pub type ReminderId = u64;

/// Delivery mode of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Push,
    Call,
}

impl ReminderChannel {
    pub const ALL: [ReminderChannel; 2] = [ReminderChannel::Push, ReminderChannel::Call];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderChannel::Push => "push",
            ReminderChannel::Call => "call",
        }
    }
}

impl fmt::Display for ReminderChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The instant a reminder fires, kept at whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>", into = "DateTime<Utc>")]
pub struct ReminderFireTime(DateTime<Utc>);

impl ReminderFireTime {
    pub fn new(inner: DateTime<Utc>) -> Self {
        let normalized_time = inner.with_nanosecond(0).expect("Will never fail.");
        Self(normalized_time)
    }

    pub fn datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for ReminderFireTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value)
    }
}

impl From<ReminderFireTime> for DateTime<Utc> {
    fn from(value: ReminderFireTime) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserId,
    pub target: TargetRef,
    pub fire_at: ReminderFireTime,
    pub channel: ReminderChannel,
}
