use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{ContactProfile, UserId};

#[async_trait]
pub trait ContactStorage: Send + Sync {
    async fn get(&self, user_id: &UserId) -> anyhow::Result<Option<ContactProfile>>;
    async fn upsert(&self, profile: ContactProfile) -> anyhow::Result<ContactProfile>;

    /// Adds a device token to the user's profile, creating the profile if needed.
    /// Registering a token twice leaves a single copy.
    async fn register_push_token(
        &self,
        user_id: &UserId,
        token: String,
    ) -> anyhow::Result<ContactProfile>;

    async fn set_phone_number(
        &self,
        user_id: &UserId,
        phone_number: Option<String>,
    ) -> anyhow::Result<ContactProfile>;
}

#[derive(Default)]
pub struct InMemoryContactStorage {
    profiles: RwLock<HashMap<UserId, ContactProfile>>,
}

impl InMemoryContactStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStorage for InMemoryContactStorage {
    async fn get(&self, user_id: &UserId) -> anyhow::Result<Option<ContactProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, profile: ContactProfile) -> anyhow::Result<ContactProfile> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }

    async fn register_push_token(
        &self,
        user_id: &UserId,
        token: String,
    ) -> anyhow::Result<ContactProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id.clone())
            .or_insert_with(|| ContactProfile::new(user_id.clone()));

        if profile.push_tokens.insert(token) {
            log::info!("Registered push token for user {user_id}");
        }

        Ok(profile.clone())
    }

    async fn set_phone_number(
        &self,
        user_id: &UserId,
        phone_number: Option<String>,
    ) -> anyhow::Result<ContactProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id.clone())
            .or_insert_with(|| ContactProfile::new(user_id.clone()));
        profile.phone_number = phone_number;

        Ok(profile.clone())
    }
}
