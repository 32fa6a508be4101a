//! Event types and classification.
//!
//! This module provides the core types for scheduled game events:
//! - [`Event`]: A scheduled event as published by the events API
//! - [`CurrentEvent`] / [`UpcomingEvent`]: Events annotated with a derived countdown
//! - [`Classification`]: The result of partitioning events around a point in time
//!
//! [`classify`] is a pure function: given the same events and the same `now`
//! it always produces the same output.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of upcoming events kept after classification.
pub const UPCOMING_LIMIT: usize = 12;

/// A scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Raw event identifier (e.g. "Night Raid"), key into the display catalog.
    pub name: String,
    /// Raw map identifier (e.g. "Dam"), key into the display catalog.
    pub map: String,
    /// When the event starts.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    /// When the event ends.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
}

impl Event {
    /// Creates a new event.
    pub fn new(
        name: impl Into<String>,
        map: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            map: map.into(),
            start_time,
            end_time,
        }
    }

    /// Returns true if the event window is well formed (`start < end`).
    pub fn is_valid(&self) -> bool {
        self.start_time < self.end_time
    }

    /// Returns true if the event is running at `now` (start inclusive, end exclusive).
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Returns true if the event has not started yet at `now`.
    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }

    /// Returns the total length of the event window.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// An event that is running, with the time left until it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEvent {
    /// The underlying event.
    #[serde(flatten)]
    pub event: Event,
    /// Time left until `end_time`.
    #[serde(serialize_with = "serialize_millis")]
    pub time_left: Duration,
}

impl CurrentEvent {
    /// Fraction of the event window that is still left, in `[0, 1]`.
    pub fn progress_remaining(&self) -> f64 {
        let total = self.event.duration().num_milliseconds();
        if total <= 0 {
            return 0.0;
        }
        (self.time_left.num_milliseconds() as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// An event that has not started yet, with the time until it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    /// The underlying event.
    #[serde(flatten)]
    pub event: Event,
    /// Time until `start_time`.
    #[serde(serialize_with = "serialize_millis")]
    pub time_until: Duration,
}

/// Events partitioned into running and upcoming sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Running events, soonest-ending first.
    pub current: Vec<CurrentEvent>,
    /// Upcoming events, soonest-starting first, at most [`UPCOMING_LIMIT`].
    pub upcoming: Vec<UpcomingEvent>,
}

impl Classification {
    /// Returns true if there is nothing running and nothing upcoming.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.upcoming.is_empty()
    }
}

/// Partitions `events` into running and upcoming sets relative to `now`.
///
/// - `start <= now < end` is running
/// - `start > now` is upcoming
/// - anything else has already ended and is dropped
///
/// Running events are sorted by end time, upcoming events by start time and
/// truncated to [`UPCOMING_LIMIT`]. Sorting is stable, so events sharing a
/// key keep their input order.
pub fn classify(events: &[Event], now: DateTime<Utc>) -> Classification {
    let mut current = Vec::new();
    let mut upcoming = Vec::new();

    for event in events {
        if event.is_active_at(now) {
            current.push(CurrentEvent {
                time_left: event.end_time - now,
                event: event.clone(),
            });
        } else if event.is_upcoming_at(now) {
            upcoming.push(UpcomingEvent {
                time_until: event.start_time - now,
                event: event.clone(),
            });
        }
    }

    current.sort_by_key(|c| c.event.end_time);
    upcoming.sort_by_key(|u| u.event.start_time);
    upcoming.truncate(UPCOMING_LIMIT);

    Classification { current, upcoming }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(duration.num_milliseconds())
}
