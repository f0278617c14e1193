use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Whether a reminder may be delivered again when its window is reprocessed.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    #[default]
    AtLeastOnce,
    AtMostOnce,
}

#[derive(Deserialize, Debug)]
pub struct SchedulerSettings {
    pub timezone: chrono_tz::Tz,
    #[serde(default = "default_tick_offset_secs")]
    pub tick_offset_secs: u64,
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
    #[serde(default = "default_max_concurrent_deliveries")]
    pub max_concurrent_deliveries: usize,
}

#[derive(Deserialize, Debug)]
pub struct PushSettings {
    pub project_id: String,
    /// Google service account JSON key with the Firebase messaging role.
    pub credentials_path: PathBuf,
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
}

#[derive(Deserialize, Debug)]
pub struct VoiceSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    #[serde(default = "default_voice_language")]
    pub language: String,
    #[serde(default = "default_voice_endpoint")]
    pub endpoint: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct StoreSettings {
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub scheduler: SchedulerSettings,
    pub push: PushSettings,
    pub voice: VoiceSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(true))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

fn default_tick_offset_secs() -> u64 {
    1
}

fn default_max_concurrent_deliveries() -> usize {
    8
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com".to_owned()
}

fn default_voice_language() -> String {
    "ja-JP".to_owned()
}

fn default_voice_endpoint() -> String {
    "https://api.twilio.com".to_owned()
}
