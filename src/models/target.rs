use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

pub type TargetId = String;

/// Pointer from a reminder to the event or task it is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum TargetRef {
    Event(TargetId),
    Task(TargetId),
}

impl TargetRef {
    pub fn id(&self) -> &TargetId {
        match self {
            TargetRef::Event(id) | TargetRef::Task(id) => id,
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            TargetRef::Event(_) => "events",
            TargetRef::Task(_) => "tasks",
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: TargetId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TargetId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Event(Event),
    Task(Task),
}

impl Target {
    pub fn title(&self) -> &str {
        match self {
            Target::Event(event) => &event.title,
            Target::Task(task) => &task.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Target::Event(event) => &event.description,
            Target::Task(task) => &task.description,
        }
    }

    /// Event start or task due time, if the target is dated at all.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Target::Event(event) => event.start,
            Target::Task(task) => task.due,
        }
    }
}
