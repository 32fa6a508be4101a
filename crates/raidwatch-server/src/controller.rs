//! Dashboard message lifecycle.
//!
//! [`MessageController`] owns the single dashboard message in the target
//! chat. Each [`tick`](MessageController::tick) either publishes a new
//! message (when none is known) or edits the existing one in place:
//!
//! ```text
//!              send ok                    edit ok / not modified
//!  NoMessage ───────────▶ Live ◀──────────────────────────┐
//!     ▲   │                 │                              │
//!     │   └ Publishing      └──────────▶ Updating ─────────┘
//!     │                                     │
//!     └──────────── message not found ──────┘
//! ```
//!
//! Only one tick runs at a time; a tick that arrives while another is in
//! flight returns [`TickOutcome::Skipped`] without doing anything.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use raidwatch_core::{Clock, Dashboard, DashboardRenderer, RenderResult, classify};
use raidwatch_providers::{ChatTransport, MessageId, ProviderErrorCode};
use tracing::{debug, error, info, warn};

use crate::cache::{EventFetcher, FetcherStatus};
use crate::error::ServerResult;

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Log a status line every this many successful updates (0 disables it).
    pub status_log_every: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            status_log_every: 12,
        }
    }
}

/// Where the controller is in the message lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// No message has been published (or the last one was deleted).
    NoMessage,
    /// A tick is sending the first message.
    Publishing,
    /// A message is live and no tick is running.
    Live,
    /// A tick is editing the live message.
    Updating,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new message was sent.
    Published(MessageId),
    /// Rendering or sending the new message failed.
    PublishFailed,
    /// The live message was edited.
    Updated,
    /// The edit changed nothing.
    NotModified,
    /// The live message no longer exists; the next tick publishes again.
    MessageLost,
    /// The transport asked us to slow down.
    RateLimited { retry_after: Option<Duration> },
    /// Rendering or editing failed; the message is kept.
    UpdateFailed,
    /// Another tick was in flight.
    Skipped,
}

#[derive(Debug, Default)]
struct ControllerState {
    message_id: Option<MessageId>,
    in_flight: bool,
    update_count: u64,
}

/// Clears the in-flight flag when dropped, whichever way the tick ends.
struct InFlight<'a> {
    state: &'a Mutex<ControllerState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}

/// Publishes and keeps the dashboard message up to date.
pub struct MessageController {
    fetcher: tokio::sync::Mutex<EventFetcher>,
    renderer: Arc<dyn DashboardRenderer>,
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    config: ControllerConfig,
    state: Mutex<ControllerState>,
}

impl MessageController {
    /// Creates a controller with no published message.
    pub fn new(
        fetcher: EventFetcher,
        renderer: Arc<dyn DashboardRenderer>,
        transport: Arc<dyn ChatTransport>,
        clock: Arc<dyn Clock>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            fetcher: tokio::sync::Mutex::new(fetcher),
            renderer,
            transport,
            clock,
            config,
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Prepares the controller for the tick loop.
    ///
    /// Verifies the transport and warms the event cache. A rejected token is
    /// fatal; any other verification failure and an empty warm-up are only
    /// logged.
    pub async fn start(&self) -> ServerResult<()> {
        match self.transport.verify().await {
            Ok(account) => info!(transport = self.transport.name(), %account, "chat transport ready"),
            Err(e) if e.code() == ProviderErrorCode::AuthenticationFailed => {
                error!(error = %e, "chat transport rejected credentials");
                return Err(e.into());
            }
            Err(e) => {
                warn!(error = %e, code = %e.code(), "could not verify chat transport, continuing")
            }
        }

        let events = self.fetcher.lock().await.fetch(true).await;
        if events.is_empty() {
            warn!("warm-up fetch returned no events");
        } else {
            info!(event_count = events.len(), "warm-up fetch complete");
        }
        Ok(())
    }

    /// Runs one publish-or-update cycle.
    pub async fn tick(&self) -> TickOutcome {
        let Some((_guard, message_id)) = self.begin() else {
            debug!("previous tick still in flight, skipping");
            return TickOutcome::Skipped;
        };

        match message_id {
            None => self.publish().await,
            Some(message_id) => self.update(message_id).await,
        }
    }

    /// Returns the current lifecycle phase.
    pub fn phase(&self) -> ControllerPhase {
        let state = self.lock();
        match (state.in_flight, state.message_id) {
            (false, None) => ControllerPhase::NoMessage,
            (true, None) => ControllerPhase::Publishing,
            (false, Some(_)) => ControllerPhase::Live,
            (true, Some(_)) => ControllerPhase::Updating,
        }
    }

    /// Returns the id of the live message, if any.
    pub fn message_id(&self) -> Option<MessageId> {
        self.lock().message_id
    }

    /// Returns the number of successful updates since startup.
    pub fn update_count(&self) -> u64 {
        self.lock().update_count
    }

    /// Returns the fetcher status.
    pub async fn fetcher_status(&self) -> FetcherStatus {
        self.fetcher.lock().await.status()
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Option<(InFlight<'_>, Option<MessageId>)> {
        let mut state = self.lock();
        if state.in_flight {
            return None;
        }
        state.in_flight = true;
        Some((InFlight { state: &self.state }, state.message_id))
    }

    async fn prepare(&self) -> RenderResult<Dashboard> {
        let events = self.fetcher.lock().await.fetch(false).await;
        let now = self.clock.now();
        let classification = classify(&events, now);
        self.renderer.render(&classification, now)
    }

    async fn publish(&self) -> TickOutcome {
        let dashboard = match self.prepare().await {
            Ok(dashboard) => dashboard,
            Err(e) => {
                error!(error = %e, "failed to render dashboard");
                return TickOutcome::PublishFailed;
            }
        };

        let message_id = match self.transport.send_photo(&dashboard).await {
            Ok(message_id) => message_id,
            Err(e) => {
                error!(error = %e, code = %e.code(), "failed to publish dashboard");
                return TickOutcome::PublishFailed;
            }
        };

        self.lock().message_id = Some(message_id);
        info!(%message_id, "dashboard published");

        if let Err(e) = self.transport.pin_message(message_id).await {
            warn!(%message_id, error = %e, code = %e.code(), "failed to pin dashboard");
        }
        TickOutcome::Published(message_id)
    }

    async fn update(&self, message_id: MessageId) -> TickOutcome {
        let dashboard = match self.prepare().await {
            Ok(dashboard) => dashboard,
            Err(e) => {
                error!(%message_id, error = %e, "failed to render dashboard");
                return TickOutcome::UpdateFailed;
            }
        };

        let outcome = match self.transport.edit_photo(message_id, &dashboard).await {
            Ok(()) => TickOutcome::Updated,
            Err(e) => match e.code() {
                ProviderErrorCode::NotModified => {
                    debug!(%message_id, "dashboard unchanged");
                    TickOutcome::NotModified
                }
                ProviderErrorCode::NotFound => {
                    warn!(%message_id, "dashboard message is gone, publishing a new one next tick");
                    self.forget(message_id);
                    TickOutcome::MessageLost
                }
                ProviderErrorCode::RateLimited => {
                    let retry_after = e.retry_after();
                    warn!(
                        %message_id,
                        retry_after_secs = retry_after.map(|d| d.as_secs()),
                        "rate limited, skipping this update"
                    );
                    TickOutcome::RateLimited { retry_after }
                }
                code => {
                    error!(%message_id, error = %e, %code, "failed to update dashboard");
                    TickOutcome::UpdateFailed
                }
            },
        };

        if matches!(outcome, TickOutcome::Updated | TickOutcome::NotModified) {
            self.record_update(message_id).await;
        }
        outcome
    }

    fn forget(&self, message_id: MessageId) {
        let mut state = self.lock();
        if state.message_id == Some(message_id) {
            state.message_id = None;
        }
    }

    async fn record_update(&self, message_id: MessageId) {
        let updates = {
            let mut state = self.lock();
            state.update_count += 1;
            state.update_count
        };

        let every = self.config.status_log_every;
        if every > 0 && updates % every == 0 {
            let status = self.fetcher_status().await;
            info!(
                %message_id,
                updates,
                cached_events = status.cached_events,
                last_error = status.last_error.as_deref(),
                "dashboard status"
            );
        }
    }
}
