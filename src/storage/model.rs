use serde::{Deserialize, Serialize};

use crate::models::{
    Reminder, ReminderChannel, ReminderFireTime, ReminderId, TargetRef, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReminder {
    pub user_id: UserId,
    pub target: TargetRef,
    pub fire_at: ReminderFireTime,
    pub channel: ReminderChannel,
}

impl NewReminder {
    pub fn into_reminder(self, id: ReminderId) -> Reminder {
        let NewReminder {
            user_id,
            target,
            fire_at,
            channel,
        } = self;

        Reminder {
            id,
            user_id,
            target,
            fire_at,
            channel,
        }
    }
}

pub struct UpdateReminder {
    pub id: ReminderId,
    pub fire_at: Option<ReminderFireTime>,
    pub channel: Option<ReminderChannel>,
}
