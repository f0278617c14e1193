use anyhow::anyhow;
use async_trait::async_trait;
use chrono::TimeZone;
use chrono_tz::Asia::Tokyo;

use super::*;
use crate::{
    delivery::PushNotification,
    models::{ContactProfile, Event, ReminderId, TargetRef, Task, UserId},
    storage::{
        ContactStorage, InMemoryContactStorage, InMemoryDispatchLedger, InMemoryReminderStorage,
        InMemoryTargetStorage, NewReminder, TargetStorage, UpdateReminder,
    },
    test_utils::{RecordingPushTransport, RecordingVoiceTransport},
};

/// Reminder store whose window query fails for one channel.
struct UnavailableForChannel {
    inner: InMemoryReminderStorage,
    channel: ReminderChannel,
}

#[async_trait]
impl ReminderStorage for UnavailableForChannel {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<Reminder> {
        self.inner.insert(reminder).await
    }

    async fn update(&self, reminder: UpdateReminder) -> anyhow::Result<Reminder> {
        self.inner.update(reminder).await
    }

    async fn delete(&self, id: ReminderId) -> anyhow::Result<()> {
        self.inner.delete(id).await
    }

    async fn get(&self, id: ReminderId) -> anyhow::Result<Option<Reminder>> {
        self.inner.get(id).await
    }

    async fn get_all_user_reminders(&self, user_id: &UserId) -> anyhow::Result<Vec<Reminder>> {
        self.inner.get_all_user_reminders(user_id).await
    }

    async fn query_by_window_and_channel(
        &self,
        window: &DispatchWindow,
        channel: ReminderChannel,
    ) -> anyhow::Result<Vec<Reminder>> {
        if channel == self.channel {
            return Err(anyhow!("connection refused"));
        }
        self.inner.query_by_window_and_channel(window, channel).await
    }
}

struct TestContext {
    reminders: Arc<dyn ReminderStorage>,
    targets: Arc<InMemoryTargetStorage>,
    contacts: Arc<InMemoryContactStorage>,
    push: RecordingPushTransport,
    voice: RecordingVoiceTransport,
}

impl TestContext {
    fn new() -> Self {
        Self::with_reminders(Arc::new(InMemoryReminderStorage::new()))
    }

    fn with_reminders(reminders: Arc<dyn ReminderStorage>) -> Self {
        Self {
            reminders,
            targets: Arc::new(InMemoryTargetStorage::new()),
            contacts: Arc::new(InMemoryContactStorage::new()),
            push: RecordingPushTransport::new(),
            voice: RecordingVoiceTransport::new(),
        }
    }

    fn pipeline(&self) -> NotificationPipeline {
        let resolver = ReferenceResolver::new(self.targets.clone(), self.contacts.clone());
        let dispatcher = DeliveryDispatcher::new(
            Arc::new(self.push.clone()),
            Arc::new(self.voice.clone()),
            Tokyo,
        );

        NotificationPipeline::new(self.reminders.clone(), resolver, dispatcher, Tokyo)
    }

    async fn event(&self, id: &str, title: &str, description: &str) -> TargetRef {
        self.targets
            .insert_event(Event {
                id: id.to_owned(),
                user_id: "u-1".to_owned(),
                title: title.to_owned(),
                description: description.to_owned(),
                start: None,
                end: None,
            })
            .await
            .unwrap()
    }

    async fn contact(&self, tokens: &[&str], phone: Option<&str>) {
        let mut profile = ContactProfile::new("u-1");
        profile.push_tokens = tokens.iter().map(|token| token.to_string()).collect();
        profile.phone_number = phone.map(str::to_owned);
        self.contacts.upsert(profile).await.unwrap();
    }

    async fn reminder(
        &self,
        target: TargetRef,
        fire_at: DateTime<Utc>,
        channel: ReminderChannel,
    ) -> Reminder {
        self.reminders
            .insert(NewReminder {
                user_id: "u-1".to_owned(),
                target,
                fire_at: fire_at.into(),
                channel,
            })
            .await
            .unwrap()
    }
}

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 31, h, m, s).unwrap()
}

#[tokio::test]
async fn due_push_reminder_is_multicast_to_all_tokens() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&["device-a", "device-b"], None).await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Push).await;

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 3), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.delivered, 1);
    let sent = ctx.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, vec!["device-a".to_owned(), "device-b".to_owned()]);
    assert_eq!(
        sent[0].1,
        PushNotification {
            title: "Standup".to_owned(),
            body: "Daily sync".to_owned(),
        }
    );
}

#[tokio::test]
async fn reminder_from_previous_minute_is_not_matched() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&["device-a"], None).await;
    ctx.reminder(target, at(9, 59, 59), ReminderChannel::Push).await;

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 5), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(report.matched, 0);
    assert!(ctx.push.sent().is_empty());
}

#[tokio::test]
async fn push_tick_ignores_call_reminders() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&["device-a"], Some("+81000000000")).await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Call).await;

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 0), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(report.matched, 0);
    assert!(ctx.push.sent().is_empty());
    assert!(ctx.voice.calls().is_empty());
}

#[tokio::test]
async fn missing_target_does_not_block_siblings() {
    let ctx = TestContext::new();
    ctx.contact(&["device-a"], None).await;
    let first = ctx.event("e-1", "First", "").await;
    let second = ctx.event("e-2", "Second", "").await;
    let third = ctx.event("e-3", "Third", "").await;
    ctx.reminder(first, at(10, 0, 0), ReminderChannel::Push).await;
    ctx.reminder(second.clone(), at(10, 0, 10), ReminderChannel::Push)
        .await;
    ctx.reminder(third, at(10, 0, 20), ReminderChannel::Push).await;
    ctx.targets.delete(&second).await.unwrap();

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 30), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(report.matched, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.target_missing, 1);
    let mut titles: Vec<_> = ctx
        .push
        .sent()
        .into_iter()
        .map(|(_, notification)| notification.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["First".to_owned(), "Third".to_owned()]);
}

#[tokio::test]
async fn rerunning_a_window_delivers_again() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&["device-a"], None).await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Push).await;
    let pipeline = ctx.pipeline();

    let first = pipeline.run_tick(at(10, 0, 2), ReminderChannel::Push).await;
    let second = pipeline.run_tick(at(10, 0, 40), ReminderChannel::Push).await;

    assert_eq!(first.unwrap().delivered, 1);
    assert_eq!(second.unwrap().delivered, 1);
    assert_eq!(ctx.push.sent().len(), 2);
}

#[tokio::test]
async fn dispatch_ledger_suppresses_redelivery() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&["device-a"], None).await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Push).await;
    let pipeline = ctx
        .pipeline()
        .with_dispatch_ledger(Arc::new(InMemoryDispatchLedger::new()));

    let first = pipeline
        .run_tick(at(10, 0, 2), ReminderChannel::Push)
        .await
        .unwrap();
    let second = pipeline
        .run_tick(at(10, 0, 40), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(first.delivered, 1);
    assert_eq!(second.delivered, 0);
    assert_eq!(second.already_dispatched, 1);
    assert_eq!(ctx.push.sent().len(), 1);
}

#[tokio::test]
async fn user_without_tokens_is_skipped_quietly() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&[], None).await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Push).await;

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 0), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(report.skipped_no_target, 1);
    assert_eq!(report.failed, 0);
    assert!(ctx.push.sent().is_empty());
}

#[tokio::test]
async fn user_without_profile_counts_as_contact_missing() {
    let ctx = TestContext::new();
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Push).await;

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 2), ReminderChannel::Push)
        .await
        .unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.contact_missing, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.delivered, 0);
    assert!(ctx.push.sent().is_empty());
}

#[tokio::test]
async fn failed_calls_are_attempted_once_each() {
    let mut ctx = TestContext::new();
    ctx.voice = RecordingVoiceTransport::failing();
    ctx.contact(&[], Some("+81000000000")).await;
    let first = ctx.event("e-1", "First", "").await;
    let second = ctx.event("e-2", "Second", "").await;
    ctx.reminder(first, at(10, 0, 0), ReminderChannel::Call).await;
    ctx.reminder(second, at(10, 0, 5), ReminderChannel::Call).await;

    let report = ctx
        .pipeline()
        .run_tick(at(10, 0, 10), ReminderChannel::Call)
        .await
        .unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(ctx.voice.calls().len(), 2);
}

#[tokio::test]
async fn call_reminder_is_spoken_to_the_user_phone() {
    let ctx = TestContext::new();
    let target = ctx
        .targets
        .insert_task(Task {
            id: "t-1".to_owned(),
            user_id: "u-1".to_owned(),
            title: "Take medicine".to_owned(),
            description: String::new(),
            due: Some(at(0, 30, 0)),
        })
        .await
        .unwrap();
    ctx.contact(&["device-a"], Some("+81000000000")).await;
    ctx.reminder(target, at(0, 20, 0), ReminderChannel::Call).await;

    let report = ctx
        .pipeline()
        .run_tick(at(0, 20, 1), ReminderChannel::Call)
        .await
        .unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(
        ctx.voice.calls(),
        vec![(
            "+81000000000".to_owned(),
            "Reminder from TaskYell. Take medicine. Starts at 09:30.".to_owned()
        )]
    );
    assert!(ctx.push.sent().is_empty());
}

#[tokio::test]
async fn unavailable_store_aborts_only_that_channel() {
    let ctx = TestContext::with_reminders(Arc::new(UnavailableForChannel {
        inner: InMemoryReminderStorage::new(),
        channel: ReminderChannel::Push,
    }));
    let target = ctx.event("e-1", "Standup", "Daily sync").await;
    ctx.contact(&["device-a"], Some("+81000000000")).await;
    ctx.reminder(target.clone(), at(10, 0, 0), ReminderChannel::Push)
        .await;
    ctx.reminder(target, at(10, 0, 0), ReminderChannel::Call).await;

    let summary = ctx.pipeline().run_all_channels(at(10, 0, 1)).await;

    assert!(matches!(summary.push, Err(DispatchError::StoreUnavailable(_))));
    assert_eq!(summary.get(ReminderChannel::Call).as_ref().unwrap().delivered, 1);
    assert!(ctx.push.sent().is_empty());
    assert_eq!(ctx.voice.calls().len(), 1);
}
