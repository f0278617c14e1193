use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::delivery::{
    CallHandle, MulticastReport, PushNotification, PushTransport, TokenDelivery, VoiceTransport,
};

type SentPushes = Arc<Mutex<Vec<(Vec<String>, PushNotification)>>>;
type PlacedCalls = Arc<Mutex<Vec<(String, String)>>>;
type ReportFn = fn(&[String]) -> MulticastReport;

fn all_delivered(tokens: &[String]) -> MulticastReport {
    MulticastReport {
        results: tokens
            .iter()
            .map(|token| (token.clone(), TokenDelivery::Delivered))
            .collect(),
    }
}

#[derive(Clone)]
pub struct RecordingPushTransport {
    sent: SentPushes,
    report: ReportFn,
}

impl RecordingPushTransport {
    pub fn new() -> Self {
        Self::with_report(all_delivered)
    }

    pub fn with_report(report: ReportFn) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            report,
        }
    }

    pub fn sent(&self) -> Vec<(Vec<String>, PushNotification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for RecordingPushTransport {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
    ) -> anyhow::Result<MulticastReport> {
        self.sent
            .lock()
            .unwrap()
            .push((tokens.to_vec(), notification.clone()));
        Ok((self.report)(tokens))
    }
}

#[derive(Clone)]
pub struct RecordingVoiceTransport {
    calls: PlacedCalls,
    fail: bool,
}

impl RecordingVoiceTransport {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceTransport for RecordingVoiceTransport {
    async fn place_call(&self, to_number: &str, spoken_text: &str) -> anyhow::Result<CallHandle> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((to_number.to_owned(), spoken_text.to_owned()));
        if self.fail {
            return Err(anyhow!("provider rejected the call"));
        }

        Ok(CallHandle(format!("CA{}", calls.len())))
    }
}
