//! Fixed-interval tick scheduler.
//!
//! The scheduler fires a tick immediately and then every `interval`. Each
//! tick runs as its own task so a slow tick never delays the timer; the tick
//! function is expected to turn overlapping runs into no-ops itself.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::error::{ServerError, ServerResult};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between ticks.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler config with the given tick interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Stop the scheduler once in-flight ticks finish.
    Stop,
}

/// Scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Number of ticks started.
    pub ticks: u64,
    /// When the last tick started.
    pub last_tick: Option<DateTime<Utc>>,
}

impl SchedulerState {
    fn record_tick(&mut self) {
        self.ticks += 1;
        self.last_tick = Some(Utc::now());
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Drives periodic ticks.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    /// Creates a new scheduler. A zero interval is rejected.
    pub fn new(config: SchedulerConfig) -> ServerResult<Self> {
        if config.interval.is_zero() {
            return Err(ServerError::config("tick interval must be greater than zero"));
        }

        let (command_tx, command_rx) = mpsc::channel(16);
        Ok(Self {
            config,
            state: Arc::new(RwLock::new(SchedulerState::default())),
            command_tx,
            command_rx,
        })
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Runs the scheduler loop until [`SchedulerCommand::Stop`] is received
    /// or every handle is dropped.
    ///
    /// On stop, ticks already running are awaited, not cancelled.
    pub async fn run<F, Fut>(self, tick_fn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Self {
            config,
            state,
            command_tx,
            mut command_rx,
        } = self;
        // Only external handles keep the loop alive.
        drop(command_tx);

        info!(interval_ms = config.interval.as_millis() as u64, "scheduler started");

        let mut interval = tokio::time::interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = JoinSet::new();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    state.write().await.record_tick();
                    ticks.spawn(tick_fn());
                }
                cmd = command_rx.recv() => {
                    debug!(?cmd, "scheduler command");
                    info!(in_flight = ticks.len(), "scheduler stopping");
                    break;
                }
                Some(result) = ticks.join_next() => {
                    if let Err(e) = result {
                        error!(error = %e, "tick task failed");
                    }
                }
            }
        }

        while let Some(result) = ticks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "tick task failed");
            }
        }
        debug!("scheduler stopped");
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    /// Stops the scheduler.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns a snapshot of the scheduler state.
    ///
    /// Stays readable after the loop has exited.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }
}
