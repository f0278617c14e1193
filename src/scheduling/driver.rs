use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{dispatch::NotificationPipeline, models::ReminderChannel, window::DispatchWindow};

use super::clock::Clock;

/// Time until the next minute boundary of `tz`, plus `offset`.
pub fn get_start_delay<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz, offset: Duration) -> Duration {
    let window = DispatchWindow::resolve(now, tz);
    let until_boundary = (window.end() - now)
        .to_std()
        .expect("The window end is always in the future.");

    until_boundary + offset
}

/// Fires the notification pipeline once per wall-clock minute.
///
/// Every tick runs in its own task: a slow tick keeps running while the next one
/// starts, and shutting the driver down leaves in-flight ticks alone.
pub struct SchedulerDriver {
    pipeline: Arc<NotificationPipeline>,
    clock: Arc<dyn Clock>,
    tick_offset: Duration,
}

impl SchedulerDriver {
    pub fn new(
        pipeline: Arc<NotificationPipeline>,
        clock: Arc<dyn Clock>,
        tick_offset: Duration,
    ) -> Self {
        Self {
            pipeline,
            clock,
            tick_offset: Duration::from_secs(tick_offset.as_secs() % 60),
        }
    }

    pub fn spawn(self, cancellation: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancellation))
    }

    async fn run(self, cancellation: CancellationToken) {
        let timezone = self.pipeline.timezone();
        log::info!("Starting reminder scheduler [timezone = {timezone}]");

        loop {
            let delay = get_start_delay(self.clock.now(), &timezone, self.tick_offset);

            tokio::select! {
                _ = cancellation.cancelled() => {
                    log::info!("Reminder scheduler shutting down");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    self.fire_tick();
                }
            }
        }
    }

    fn fire_tick(&self) {
        let now = self.clock.now();
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(async move {
            let summary = pipeline.run_all_channels(now).await;

            for channel in ReminderChannel::ALL {
                if let Err(error) = summary.get(channel) {
                    log::error!("{channel} pipeline aborted for tick at {now}: {error}");
                }
            }
        });
    }
}
