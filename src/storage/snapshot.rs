use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{ContactProfile, Event, Task};

use super::{ContactStorage, NewReminder, ReminderStorage, TargetStorage};

/// JSON document used to seed the in-memory stores at startup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub contacts: Vec<ContactProfile>,
    #[serde(default)]
    pub reminders: Vec<NewReminder>,
}

impl StoreSnapshot {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read store snapshot {}", path.display()))?;

        Self::from_json(&raw).with_context(|| format!("Invalid store snapshot {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn seed(
        self,
        reminders: &dyn ReminderStorage,
        targets: &dyn TargetStorage,
        contacts: &dyn ContactStorage,
    ) -> anyhow::Result<()> {
        let StoreSnapshot {
            events,
            tasks,
            contacts: profiles,
            reminders: new_reminders,
        } = self;

        log::info!(
            "Seeding stores: {} events, {} tasks, {} contacts, {} reminders",
            events.len(),
            tasks.len(),
            profiles.len(),
            new_reminders.len()
        );

        for event in events {
            targets.insert_event(event).await?;
        }
        for task in tasks {
            targets.insert_task(task).await?;
        }
        for profile in profiles {
            contacts.upsert(profile).await?;
        }
        for reminder in new_reminders {
            reminders.insert(reminder).await?;
        }

        Ok(())
    }
}
