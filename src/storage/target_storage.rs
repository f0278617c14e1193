use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Event, Target, TargetId, TargetRef, Task};

#[async_trait]
pub trait TargetStorage: Send + Sync {
    async fn insert_event(&self, event: Event) -> anyhow::Result<TargetRef>;
    async fn insert_task(&self, task: Task) -> anyhow::Result<TargetRef>;
    async fn resolve(&self, target: &TargetRef) -> anyhow::Result<Option<Target>>;
    /// Returns whether anything was removed.
    async fn delete(&self, target: &TargetRef) -> anyhow::Result<bool>;
}

#[derive(Default)]
pub struct InMemoryTargetStorage {
    events: RwLock<HashMap<TargetId, Event>>,
    tasks: RwLock<HashMap<TargetId, Task>>,
}

impl InMemoryTargetStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TargetStorage for InMemoryTargetStorage {
    async fn insert_event(&self, event: Event) -> anyhow::Result<TargetRef> {
        let target = TargetRef::Event(event.id.clone());
        self.events.write().await.insert(event.id.clone(), event);
        Ok(target)
    }

    async fn insert_task(&self, task: Task) -> anyhow::Result<TargetRef> {
        let target = TargetRef::Task(task.id.clone());
        self.tasks.write().await.insert(task.id.clone(), task);
        Ok(target)
    }

    async fn resolve(&self, target: &TargetRef) -> anyhow::Result<Option<Target>> {
        let resolved = match target {
            TargetRef::Event(id) => self.events.read().await.get(id).cloned().map(Target::Event),
            TargetRef::Task(id) => self.tasks.read().await.get(id).cloned().map(Target::Task),
        };

        Ok(resolved)
    }

    async fn delete(&self, target: &TargetRef) -> anyhow::Result<bool> {
        let removed = match target {
            TargetRef::Event(id) => self.events.write().await.remove(id).is_some(),
            TargetRef::Task(id) => self.tasks.write().await.remove(id).is_some(),
        };

        Ok(removed)
    }
}
