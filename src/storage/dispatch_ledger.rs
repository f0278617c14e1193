use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{models::ReminderId, window::DispatchWindow};

/// Persisted "already dispatched" markers keyed by reminder and window.
#[async_trait]
pub trait DispatchLedger: Send + Sync {
    /// Records the dispatch of `reminder` for `window`.
    /// Returns `false` when a marker for the same pair already existed.
    async fn claim(&self, reminder: ReminderId, window: &DispatchWindow) -> anyhow::Result<bool>;

    /// Drops markers for windows starting before `cutoff`.
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<usize>;
}

#[derive(Default)]
pub struct InMemoryDispatchLedger {
    claims: Mutex<HashSet<(ReminderId, DateTime<Utc>)>>,
}

impl InMemoryDispatchLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DispatchLedger for InMemoryDispatchLedger {
    async fn claim(&self, reminder: ReminderId, window: &DispatchWindow) -> anyhow::Result<bool> {
        Ok(self.claims.lock().await.insert((reminder, window.start())))
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<usize> {
        let mut claims = self.claims.lock().await;
        let before = claims.len();
        claims.retain(|(_, window_start)| *window_start >= cutoff);

        Ok(before - claims.len())
    }
}
