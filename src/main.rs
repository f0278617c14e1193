use std::{sync::Arc, time::Duration};

use taskyell_notifier::{
    appsettings::{AppSettings, DeliveryPolicy},
    delivery::{FcmPushTransport, ServiceAccountTokenProvider, TwilioVoiceTransport},
    dispatch::{DeliveryDispatcher, NotificationPipeline, ReferenceResolver},
    scheduling::{SchedulerDriver, SystemClock},
    storage::{
        InMemoryContactStorage, InMemoryDispatchLedger, InMemoryReminderStorage,
        InMemoryTargetStorage, snapshot::StoreSnapshot,
    },
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load()?;
    let timezone = settings.scheduler.timezone;

    let reminders = Arc::new(InMemoryReminderStorage::new());
    let targets = Arc::new(InMemoryTargetStorage::new());
    let contacts = Arc::new(InMemoryContactStorage::new());

    if let Some(path) = &settings.store.snapshot_path {
        StoreSnapshot::load(path)?
            .seed(&*reminders, &*targets, &*contacts)
            .await?;
    } else {
        log::warn!("No store snapshot configured, starting with empty stores");
    }

    let push_tokens = ServiceAccountTokenProvider::from_file(&settings.push.credentials_path)?;
    let dispatcher = DeliveryDispatcher::new(
        Arc::new(FcmPushTransport::new(&settings.push, Arc::new(push_tokens))),
        Arc::new(TwilioVoiceTransport::new(&settings.voice)),
        timezone,
    );
    let mut pipeline = NotificationPipeline::new(
        reminders,
        ReferenceResolver::new(targets, contacts),
        dispatcher,
        timezone,
    )
    .with_max_concurrency(settings.scheduler.max_concurrent_deliveries);

    if settings.scheduler.delivery_policy == DeliveryPolicy::AtMostOnce {
        log::info!("Dispatch ledger enabled, reminders are delivered at most once per window");
        pipeline = pipeline.with_dispatch_ledger(Arc::new(InMemoryDispatchLedger::new()));
    }

    let cancellation = CancellationToken::new();
    let driver = SchedulerDriver::new(
        Arc::new(pipeline),
        Arc::new(SystemClock),
        Duration::from_secs(settings.scheduler.tick_offset_secs),
    )
    .spawn(cancellation.clone());

    tokio::signal::ctrl_c().await?;
    log::info!("Received Ctrl-C, stopping");
    cancellation.cancel();
    driver.await?;

    Ok(())
}
