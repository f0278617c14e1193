pub mod reminder;
pub mod target;
pub mod user;

pub use reminder::{Reminder, ReminderChannel, ReminderFireTime, ReminderId};
pub use target::{Event, Target, TargetId, TargetRef, Task};
pub use user::{ContactProfile, UserId};
