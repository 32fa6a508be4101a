//! Daemon: fetch cache, message lifecycle, scheduler, signals.
//!
//! This crate wires the pieces of the raidwatch daemon together:
//! - [`EventFetcher`] caches the event schedule for a TTL and survives
//!   upstream failures by serving the last good list
//! - [`MessageController`] publishes one dashboard message and keeps editing
//!   it, republishing if it disappears
//! - [`Scheduler`] drives controller ticks at a fixed interval
//! - [`SignalHandler`] turns SIGTERM/SIGINT into a graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use raidwatch_server::{MessageController, Scheduler, SchedulerConfig, SignalHandler};
//!
//! async fn serve(controller: Arc<MessageController>) -> Result<(), Box<dyn std::error::Error>> {
//!     controller.start().await?;
//!
//!     let scheduler = Scheduler::new(SchedulerConfig::default())?;
//!     let handle = scheduler.handle();
//!     let task = tokio::spawn(scheduler.run(move || {
//!         let controller = controller.clone();
//!         async move {
//!             controller.tick().await;
//!         }
//!     }));
//!
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener()?;
//!     signals.shutdown().wait().await;
//!
//!     handle.stop().await?;
//!     task.await?;
//!     Ok(())
//! }
//! ```

mod cache;
mod controller;
mod error;
mod scheduler;
mod signals;

pub use cache::{CacheEntry, EventFetcher, FetcherStatus};
pub use controller::{ControllerConfig, ControllerPhase, MessageController, TickOutcome};
pub use error::{ServerError, ServerResult};
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState,
};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
