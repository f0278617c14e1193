mod content;
mod fcm;
mod oauth;
mod twilio;

pub use content::{PushNotification, spoken_text};
pub use fcm::FcmPushTransport;
pub use oauth::{AccessTokenProvider, ServiceAccountKey, ServiceAccountTokenProvider};
pub use twilio::TwilioVoiceTransport;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDelivery {
    Delivered,
    Failed(String),
}

/// Per-token outcome of a multicast send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticastReport {
    pub results: Vec<(String, TokenDelivery)>,
}

impl MulticastReport {
    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, result)| matches!(result, TokenDelivery::Delivered))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|(token, result)| match result {
            TokenDelivery::Failed(reason) => Some((token.as_str(), reason.as_str())),
            TokenDelivery::Delivered => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHandle(pub String);

#[async_trait]
pub trait PushTransport: Send + Sync + 'static {
    /// Sends `notification` to every token. `Err` means the whole call failed;
    /// individual token failures are reported in the [`MulticastReport`].
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
    ) -> anyhow::Result<MulticastReport>;
}

#[async_trait]
pub trait VoiceTransport: Send + Sync + 'static {
    async fn place_call(&self, to_number: &str, spoken_text: &str) -> anyhow::Result<CallHandle>;
}
