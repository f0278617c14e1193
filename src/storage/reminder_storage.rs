use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    models::{Reminder, ReminderChannel, ReminderId, UserId},
    window::DispatchWindow,
};

use super::model::{NewReminder, UpdateReminder};

#[async_trait]
pub trait ReminderStorage: Send + Sync {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<Reminder>;
    async fn update(&self, reminder: UpdateReminder) -> anyhow::Result<Reminder>;
    async fn delete(&self, id: ReminderId) -> anyhow::Result<()>;
    async fn get(&self, id: ReminderId) -> anyhow::Result<Option<Reminder>>;
    async fn get_all_user_reminders(&self, user_id: &UserId) -> anyhow::Result<Vec<Reminder>>;

    /// Reminders of `channel` whose fire time lies in `window` (start inclusive, end exclusive).
    async fn query_by_window_and_channel(
        &self,
        window: &DispatchWindow,
        channel: ReminderChannel,
    ) -> anyhow::Result<Vec<Reminder>>;
}

struct InMemoryReminderStore {
    current_id: ReminderId,
    storage: HashMap<ReminderId, Reminder>,
}

pub struct InMemoryReminderStorage {
    store: RwLock<InMemoryReminderStore>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        InMemoryReminderStorage {
            store: RwLock::new(InMemoryReminderStore {
                current_id: 1,
                storage: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<Reminder> {
        let mut store = self.store.write().await;
        let current_id = store.current_id;
        let reminder = reminder.into_reminder(current_id);

        store.storage.insert(current_id, reminder.clone());
        store.current_id += 1;

        log::debug!("Stored reminder {} for user {}", current_id, reminder.user_id);
        Ok(reminder)
    }

    async fn update(&self, update_reminder: UpdateReminder) -> anyhow::Result<Reminder> {
        let mut store = self.store.write().await;
        let id = update_reminder.id;
        if let Some(reminder) = store.storage.get_mut(&id) {
            reminder.fire_at = update_reminder.fire_at.unwrap_or(reminder.fire_at);
            reminder.channel = update_reminder.channel.unwrap_or(reminder.channel);
            Ok(reminder.clone())
        } else {
            anyhow::bail!("Reminder {id} does not exist");
        }
    }

    async fn delete(&self, id: ReminderId) -> anyhow::Result<()> {
        self.store.write().await.storage.remove(&id);
        Ok(())
    }

    async fn get(&self, id: ReminderId) -> anyhow::Result<Option<Reminder>> {
        let store = self.store.read().await;
        Ok(store.storage.get(&id).cloned())
    }

    async fn get_all_user_reminders(&self, user_id: &UserId) -> anyhow::Result<Vec<Reminder>> {
        let store = self.store.read().await;
        let mut reminders: Vec<_> = store
            .storage
            .values()
            .filter(|reminder| &reminder.user_id == user_id)
            .cloned()
            .collect();
        reminders.sort_by_key(|reminder| (reminder.fire_at, reminder.id));

        Ok(reminders)
    }

    async fn query_by_window_and_channel(
        &self,
        window: &DispatchWindow,
        channel: ReminderChannel,
    ) -> anyhow::Result<Vec<Reminder>> {
        let store = self.store.read().await;
        let mut reminders: Vec<_> = store
            .storage
            .values()
            .filter(|reminder| {
                reminder.channel == channel && window.contains(reminder.fire_at.datetime())
            })
            .cloned()
            .collect();
        reminders.sort_by_key(|reminder| (reminder.fire_at, reminder.id));

        Ok(reminders)
    }
}
