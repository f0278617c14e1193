use std::sync::Arc;

use anyhow::anyhow;

use crate::delivery::{CallHandle, PushNotification, PushTransport, VoiceTransport, spoken_text};

use super::{
    error::DispatchError,
    resolver::{ChannelTargets, ResolvedNotification},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Push { delivered: usize, failed: usize },
    Call(CallHandle),
}

/// Hands a resolved reminder to the transport matching its channel.
pub struct DeliveryDispatcher {
    push: Arc<dyn PushTransport>,
    voice: Arc<dyn VoiceTransport>,
    timezone: chrono_tz::Tz,
}

impl DeliveryDispatcher {
    pub fn new(
        push: Arc<dyn PushTransport>,
        voice: Arc<dyn VoiceTransport>,
        timezone: chrono_tz::Tz,
    ) -> Self {
        Self {
            push,
            voice,
            timezone,
        }
    }

    pub async fn dispatch(
        &self,
        resolved: &ResolvedNotification,
    ) -> Result<Delivery, DispatchError> {
        let reminder_id = resolved.reminder.id;
        let delivery_failed = |source: anyhow::Error| DispatchError::DeliveryFailed {
            reminder: reminder_id,
            source,
        };

        match &resolved.channel_targets {
            ChannelTargets::Push(tokens) => {
                let notification = PushNotification::from_target(&resolved.target);
                let report = self
                    .push
                    .send_multicast(tokens, &notification)
                    .await
                    .map_err(delivery_failed)?;

                for (token, reason) in report.failures() {
                    log::warn!(
                        "Push to token failed. [reminder_id = {}, token = {}, reason = {}]",
                        reminder_id,
                        token,
                        reason
                    );
                }

                if report.success_count() == 0 {
                    return Err(delivery_failed(anyhow!(
                        "all {} push tokens were rejected",
                        report.failure_count()
                    )));
                }

                Ok(Delivery::Push {
                    delivered: report.success_count(),
                    failed: report.failure_count(),
                })
            }
            ChannelTargets::Call(number) => {
                let text = spoken_text(&resolved.target, &self.timezone);
                let handle = self
                    .voice
                    .place_call(number, &text)
                    .await
                    .map_err(delivery_failed)?;

                Ok(Delivery::Call(handle))
            }
        }
    }
}
