//! EventSource trait definition.
//!
//! An [`EventSource`] is anything that can produce the current event
//! schedule. The daemon talks to [`EventsApiClient`](crate::events_api::EventsApiClient);
//! tests substitute in-memory sources.

use std::future::Future;
use std::pin::Pin;

use raidwatch_core::Event;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits in this crate object-safe, so they can be held as
/// `Arc<dyn EventSource>` / `Arc<dyn ChatTransport>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A source of scheduled events.
///
/// # Example Implementation
///
/// ```ignore
/// struct FixedSource(Vec<Event>);
///
/// impl EventSource for FixedSource {
///     fn name(&self) -> &str { "fixed" }
///
///     fn fetch_events(&self) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
///         let events = self.0.clone();
///         Box::pin(async move { Ok(events) })
///     }
/// }
/// ```
pub trait EventSource: Send + Sync {
    /// Returns the name of this source (used in logs).
    fn name(&self) -> &str;

    /// Fetches the full event schedule.
    ///
    /// Returned events satisfy `start_time < end_time`; implementations drop
    /// entries that do not.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, non-success statuses or
    /// malformed payloads.
    fn fetch_events(&self) -> BoxFuture<'_, ProviderResult<Vec<Event>>>;
}
