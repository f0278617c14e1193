use std::sync::Arc;

use crate::{
    models::{ContactProfile, Reminder, ReminderChannel, Target},
    storage::{ContactStorage, TargetStorage},
};

use super::error::DispatchError;

/// Where a resolved reminder goes, depending on its channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTargets {
    Push(Vec<String>),
    Call(String),
}

#[derive(Debug, Clone)]
pub struct ResolvedNotification {
    pub reminder: Reminder,
    pub target: Target,
    pub channel_targets: ChannelTargets,
}

impl ResolvedNotification {
    pub fn title(&self) -> &str {
        self.target.title()
    }

    pub fn description(&self) -> &str {
        self.target.description()
    }
}

/// Follows a reminder's links to its event or task and its owner's contact profile.
pub struct ReferenceResolver {
    targets: Arc<dyn TargetStorage>,
    contacts: Arc<dyn ContactStorage>,
}

impl ReferenceResolver {
    pub fn new(targets: Arc<dyn TargetStorage>, contacts: Arc<dyn ContactStorage>) -> Self {
        Self { targets, contacts }
    }

    pub async fn resolve(
        &self,
        reminder: Reminder,
    ) -> Result<ResolvedNotification, DispatchError> {
        let (target, profile) = tokio::join!(
            self.targets.resolve(&reminder.target),
            self.contacts.get(&reminder.user_id)
        );

        let target = target
            .map_err(DispatchError::StoreUnavailable)?
            .ok_or_else(|| DispatchError::TargetNotFound(reminder.target.clone()))?;
        let profile = profile
            .map_err(DispatchError::StoreUnavailable)?
            .ok_or_else(|| DispatchError::ContactNotFound(reminder.user_id.clone()))?;

        let channel_targets = channel_targets(&profile, reminder.channel).ok_or_else(|| {
            DispatchError::NoDeliveryTarget {
                user: reminder.user_id.clone(),
                channel: reminder.channel,
            }
        })?;

        Ok(ResolvedNotification {
            reminder,
            target,
            channel_targets,
        })
    }
}

fn channel_targets(profile: &ContactProfile, channel: ReminderChannel) -> Option<ChannelTargets> {
    match channel {
        ReminderChannel::Push if !profile.push_tokens.is_empty() => Some(ChannelTargets::Push(
            profile.push_tokens.iter().cloned().collect(),
        )),
        ReminderChannel::Push => None,
        ReminderChannel::Call => profile
            .phone_number()
            .map(|number| ChannelTargets::Call(number.to_owned())),
    }
}
