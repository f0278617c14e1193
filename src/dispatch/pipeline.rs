use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use futures::{StreamExt, stream};

use crate::{
    models::{Reminder, ReminderChannel, ReminderId},
    storage::{DispatchLedger, ReminderStorage},
    window::DispatchWindow,
};

use super::{
    dispatcher::DeliveryDispatcher,
    error::DispatchError,
    report::{ReminderOutcome, TickReport, TickSummary},
    resolver::ReferenceResolver,
};

const DEFAULT_MAX_CONCURRENCY: usize = 8;
const LEDGER_RETENTION_HOURS: i64 = 1;

/// Query, resolve and dispatch for one window and channel. Holds no state between
/// ticks apart from the optional dispatch ledger.
pub struct NotificationPipeline {
    reminders: Arc<dyn ReminderStorage>,
    resolver: ReferenceResolver,
    dispatcher: DeliveryDispatcher,
    timezone: chrono_tz::Tz,
    ledger: Option<Arc<dyn DispatchLedger>>,
    max_concurrency: usize,
}

impl NotificationPipeline {
    pub fn new(
        reminders: Arc<dyn ReminderStorage>,
        resolver: ReferenceResolver,
        dispatcher: DeliveryDispatcher,
        timezone: chrono_tz::Tz,
    ) -> Self {
        Self {
            reminders,
            resolver,
            dispatcher,
            timezone,
            ledger: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Switches to at-most-once delivery: every (reminder, window) pair is claimed in
    /// `ledger` before dispatch and skipped if it was claimed already.
    pub fn with_dispatch_ledger(mut self, ledger: Arc<dyn DispatchLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        self.timezone
    }

    /// Runs both channels for the window containing `now`. A failure in one channel
    /// never stops the other.
    pub async fn run_all_channels(&self, now: DateTime<Utc>) -> TickSummary {
        let (push, call) = tokio::join!(
            self.run_tick(now, ReminderChannel::Push),
            self.run_tick(now, ReminderChannel::Call)
        );

        TickSummary { push, call }
    }

    /// Delivers every `channel` reminder due in the window containing `now`.
    ///
    /// Only a failing reminder query aborts the tick. Problems with individual
    /// reminders are logged and counted in the returned report.
    pub async fn run_tick(
        &self,
        now: DateTime<Utc>,
        channel: ReminderChannel,
    ) -> Result<TickReport, DispatchError> {
        let window = DispatchWindow::resolve(now, &self.timezone);
        let reminders = self
            .reminders
            .query_by_window_and_channel(&window, channel)
            .await
            .map_err(DispatchError::StoreUnavailable)?;

        let mut report = TickReport::new(channel, window);
        report.matched = reminders.len();

        let outcomes: Vec<ReminderOutcome> = stream::iter(reminders)
            .map(|reminder| self.process_reminder(reminder, &window))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        for outcome in &outcomes {
            report.record(outcome);
        }

        self.prune_ledger(&window).await;

        if report.matched > 0 {
            log::info!("Tick finished {report}");
        } else {
            log::debug!("Tick finished {report}");
        }

        Ok(report)
    }

    async fn process_reminder(
        &self,
        reminder: Reminder,
        window: &DispatchWindow,
    ) -> ReminderOutcome {
        let reminder_id = reminder.id;

        if let Some(ledger) = &self.ledger {
            match ledger.claim(reminder_id, window).await {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!("Reminder {reminder_id} already dispatched for {window}");
                    return ReminderOutcome::AlreadyDispatched;
                }
                Err(error) => {
                    log::warn!("Could not claim reminder {reminder_id}: {error:#}");
                    return ReminderOutcome::Failed(DispatchError::StoreUnavailable(error));
                }
            }
        }

        let resolved = match self.resolver.resolve(reminder).await {
            Ok(resolved) => resolved,
            Err(error) => return Self::log_outcome(reminder_id, error.into()),
        };

        match self.dispatcher.dispatch(&resolved).await {
            Ok(delivery) => {
                log::debug!("Reminder {reminder_id} delivered: {delivery:?}");
                ReminderOutcome::Delivered(delivery)
            }
            Err(error) => Self::log_outcome(reminder_id, error.into()),
        }
    }

    fn log_outcome(reminder_id: ReminderId, outcome: ReminderOutcome) -> ReminderOutcome {
        match &outcome {
            ReminderOutcome::Skipped(error @ DispatchError::TargetNotFound(_)) => {
                log::warn!("Skipping reminder {reminder_id}: {error}")
            }
            ReminderOutcome::Skipped(error) => {
                log::debug!("Skipping reminder {reminder_id}: {error}")
            }
            ReminderOutcome::Failed(error) => {
                log::warn!("Reminder {reminder_id} failed: {error}")
            }
            _ => {}
        }

        outcome
    }

    async fn prune_ledger(&self, window: &DispatchWindow) {
        let Some(ledger) = &self.ledger else {
            return;
        };

        let cutoff = window.start() - TimeDelta::hours(LEDGER_RETENTION_HOURS);
        if let Err(error) = ledger.prune_before(cutoff).await {
            log::warn!("Could not prune dispatch ledger: {error:#}");
        }
    }
}

#[cfg(test)]
mod tests;
