//! Run command: starts the bot in the foreground.
//!
//! Wires the components together and blocks until SIGTERM/SIGINT:
//! - Events API client behind a TTL cache
//! - Image renderer
//! - Telegram transport
//! - Message controller driven by the scheduler

use std::sync::Arc;
use std::time::Duration;

use raidwatch_core::{Clock, SystemClock};
use raidwatch_providers::{EventsApiClient, TelegramClient};
use raidwatch_render::ImageRenderer;
use raidwatch_server::{EventFetcher, MessageController, Scheduler, SignalHandler};
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::error::BotResult;

/// How long in-flight ticks get to finish after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

/// Runs the bot until a shutdown signal is received.
pub async fn run(config: &BotConfig) -> BotResult<()> {
    config.validate(true)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = EventsApiClient::new(config.events_api_config()?)?;
    let fetcher = EventFetcher::new(Arc::new(source), clock.clone(), config.cache_ttl());
    let renderer = ImageRenderer::new(config.caption_formatter());
    let transport = TelegramClient::new(config.telegram_config()?)?;
    let chat_id = transport.chat_id();

    let controller = Arc::new(MessageController::new(
        fetcher,
        Arc::new(renderer),
        Arc::new(transport),
        clock,
        config.controller_config(),
    ));

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener()?;

    controller.start().await?;

    let scheduler = Scheduler::new(config.scheduler_config())?;
    let scheduler_handle = scheduler.handle();
    let tick_controller = controller.clone();
    let scheduler_task = tokio::spawn(scheduler.run(move || {
        let controller = tick_controller.clone();
        async move {
            let outcome = controller.tick().await;
            debug!(?outcome, "tick finished");
        }
    }));

    info!(
        chat_id,
        interval_secs = config.updates.interval_secs,
        cache_ttl_minutes = config.events.cache_ttl_minutes,
        "raidwatch running"
    );

    signal_handler.shutdown().wait().await;

    info!("shutting down");
    if let Err(e) = scheduler_handle.stop().await {
        warn!(error = %e, "failed to send stop command to scheduler");
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, scheduler_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "scheduler task failed"),
        Err(_) => warn!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "in-flight updates did not finish in time"
        ),
    }

    let scheduler_state = scheduler_handle.state().await;
    info!(
        message_id = controller.message_id().map(|id| id.0),
        updates = controller.update_count(),
        ticks = scheduler_state.ticks,
        last_tick = ?scheduler_state.last_tick,
        "raidwatch stopped"
    );
    Ok(())
}
