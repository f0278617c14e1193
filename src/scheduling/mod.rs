mod clock;
mod driver;

pub use clock::{Clock, SystemClock};
pub use driver::{SchedulerDriver, get_start_delay};
