mod dispatcher;
mod error;
mod pipeline;
mod report;
mod resolver;

pub use dispatcher::{Delivery, DeliveryDispatcher};
pub use error::DispatchError;
pub use pipeline::NotificationPipeline;
pub use report::{ReminderOutcome, TickReport, TickSummary};
pub use resolver::{ChannelTargets, ReferenceResolver, ResolvedNotification};
