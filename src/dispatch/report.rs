use std::fmt;

use crate::{models::ReminderChannel, window::DispatchWindow};

use super::{dispatcher::Delivery, error::DispatchError};

/// What happened to a single reminder during a tick.
#[derive(Debug)]
pub enum ReminderOutcome {
    Delivered(Delivery),
    AlreadyDispatched,
    Skipped(DispatchError),
    Failed(DispatchError),
}

impl From<DispatchError> for ReminderOutcome {
    fn from(error: DispatchError) -> Self {
        if error.is_skip() {
            ReminderOutcome::Skipped(error)
        } else {
            ReminderOutcome::Failed(error)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub channel: ReminderChannel,
    pub window: DispatchWindow,
    pub matched: usize,
    pub delivered: usize,
    pub already_dispatched: usize,
    pub target_missing: usize,
    pub contact_missing: usize,
    pub skipped_no_target: usize,
    pub failed: usize,
}

impl TickReport {
    pub fn new(channel: ReminderChannel, window: DispatchWindow) -> Self {
        Self {
            channel,
            window,
            matched: 0,
            delivered: 0,
            already_dispatched: 0,
            target_missing: 0,
            contact_missing: 0,
            skipped_no_target: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, outcome: &ReminderOutcome) {
        match outcome {
            ReminderOutcome::Delivered(_) => self.delivered += 1,
            ReminderOutcome::AlreadyDispatched => self.already_dispatched += 1,
            ReminderOutcome::Skipped(DispatchError::TargetNotFound(_)) => self.target_missing += 1,
            ReminderOutcome::Skipped(DispatchError::ContactNotFound(_)) => {
                self.contact_missing += 1
            }
            ReminderOutcome::Skipped(_) => self.skipped_no_target += 1,
            ReminderOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: matched = {}, delivered = {}, already_dispatched = {}, \
             target_missing = {}, contact_missing = {}, no_target = {}, failed = {}",
            self.channel,
            self.window,
            self.matched,
            self.delivered,
            self.already_dispatched,
            self.target_missing,
            self.contact_missing,
            self.skipped_no_target,
            self.failed
        )
    }
}

/// Results of the push and call pipelines for one tick. Each is independent.
#[derive(Debug)]
pub struct TickSummary {
    pub push: Result<TickReport, DispatchError>,
    pub call: Result<TickReport, DispatchError>,
}

impl TickSummary {
    pub fn get(&self, channel: ReminderChannel) -> &Result<TickReport, DispatchError> {
        match channel {
            ReminderChannel::Push => &self.push,
            ReminderChannel::Call => &self.call,
        }
    }
}
