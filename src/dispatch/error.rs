use thiserror::Error;

use crate::models::{ReminderChannel, ReminderId, TargetRef, UserId};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Store unavailable: {0:#}")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("Target {0} no longer exists")]
    TargetNotFound(TargetRef),

    #[error("User {0} has no contact profile")]
    ContactNotFound(UserId),

    #[error("User {user} has nothing to deliver {channel} reminders to")]
    NoDeliveryTarget {
        user: UserId,
        channel: ReminderChannel,
    },

    #[error("Delivery of reminder {reminder} failed: {source:#}")]
    DeliveryFailed {
        reminder: ReminderId,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Skips are expected conditions of the data, not faults of the system.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            DispatchError::TargetNotFound(_)
                | DispatchError::ContactNotFound(_)
                | DispatchError::NoDeliveryTarget { .. }
        )
    }
}
