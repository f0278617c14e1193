mod contact_storage;
mod dispatch_ledger;
mod model;
mod reminder_storage;
pub mod snapshot;
mod target_storage;

pub use contact_storage::{ContactStorage, InMemoryContactStorage};
pub use dispatch_ledger::{DispatchLedger, InMemoryDispatchLedger};
pub use model::{NewReminder, UpdateReminder};
pub use reminder_storage::{InMemoryReminderStorage, ReminderStorage};
pub use target_storage::{InMemoryTargetStorage, TargetStorage};
