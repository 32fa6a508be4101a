//! Caption formatting for the dashboard message.
//!
//! The caption is Telegram-flavoured HTML: a header, the running events with
//! their countdowns, the next few upcoming events grouped by start time, and
//! a wall-clock footer.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use raidwatch_core::format::{CaptionFormatter, CaptionOptions};
//! use raidwatch_core::{DisplayCatalog, classify};
//!
//! let formatter = CaptionFormatter::new(DisplayCatalog::default(), CaptionOptions::default());
//! let now = Utc::now();
//! let caption = formatter.format(&classify(&[], now), now);
//! assert!(caption.contains("ARC RAIDERS"));
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::catalog::DisplayCatalog;
use crate::event::{Classification, CurrentEvent, UpcomingEvent};


/// Telegram's caption limit, in UTF-16 code units.
pub const CAPTION_LIMIT: usize = 1024;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━";

/// Configuration options for caption formatting.
#[derive(Debug, Clone)]
pub struct CaptionOptions {
    /// Offset used for the footer timestamp.
    pub utc_offset: FixedOffset,
    /// Label printed after the footer timestamp (e.g. "МСК").
    pub clock_label: String,
    /// Maximum caption length in UTF-16 code units.
    pub max_length: usize,
    /// Number of upcoming events listed.
    pub upcoming_limit: usize,
    /// Running events ending sooner than this are marked urgent.
    pub urgent_threshold: Duration,
    /// Upcoming events starting sooner than this are marked as soon.
    pub soon_threshold: Duration,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            utc_offset: moscow_offset(),
            clock_label: "МСК".to_string(),
            max_length: CAPTION_LIMIT,
            upcoming_limit: 6,
            urgent_threshold: Duration::minutes(5),
            soon_threshold: Duration::minutes(10),
        }
    }
}

impl CaptionOptions {
    /// Builder: set the footer clock offset (whole hours east of UTC).
    ///
    /// Offsets outside ±23h are ignored.
    #[must_use]
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        if let Some(offset) = FixedOffset::east_opt(hours * 3600) {
            self.utc_offset = offset;
        }
        self
    }

    /// Builder: set the footer clock label.
    #[must_use]
    pub fn with_clock_label(mut self, label: impl Into<String>) -> Self {
        self.clock_label = label.into();
        self
    }
}

fn moscow_offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("valid offset")
}

/// Formats classified events into an HTML caption.
#[derive(Debug, Clone)]
pub struct CaptionFormatter {
    catalog: DisplayCatalog,
    options: CaptionOptions,
}

impl CaptionFormatter {
    /// Creates a new formatter.
    pub fn new(catalog: DisplayCatalog, options: CaptionOptions) -> Self {
        Self { catalog, options }
    }

    /// Returns the display catalog.
    pub fn catalog(&self) -> &DisplayCatalog {
        &self.catalog
    }

    /// Returns the formatting options.
    pub fn options(&self) -> &CaptionOptions {
        &self.options
    }

    /// Formats the caption for `classification` as seen at `now`.
    ///
    /// If the full caption would exceed the length limit, trailing running
    /// events are folded into a "+N" line until it fits.
    pub fn format(&self, classification: &Classification, now: DateTime<Utc>) -> String {
        let total = classification.current.len();
        let mut caption = String::new();

        for shown in (0..=total).rev() {
            caption = self.format_with(classification, now, shown);
            if utf16_len(&caption) <= self.options.max_length {
                return caption;
            }
        }

        tracing::warn!(
            length = utf16_len(&caption),
            max = self.options.max_length,
            "caption exceeds limit even without running events"
        );
        caption
    }

    fn format_with(
        &self,
        classification: &Classification,
        now: DateTime<Utc>,
        shown_current: usize,
    ) -> String {
        let mut text = String::new();

        text.push_str("⚔️ <b>ARC RAIDERS</b>  ·  Трекер рейдов\n");
        text.push_str(SEPARATOR);
        text.push_str("\n\n");

        let current = &classification.current;
        if current.is_empty() {
            text.push_str("💤 <i>Нет активных рейдов</i>\n\n");
        } else {
            let _ = write!(text, "🟢 <b>СЕЙЧАС АКТИВНЫ</b>  ({})\n\n", current.len());
            for event in current.iter().take(shown_current) {
                self.write_current(&mut text, event);
            }
            let hidden = current.len() - shown_current.min(current.len());
            if hidden > 0 {
                let _ = write!(text, "➕ <i>ещё {}</i>\n\n", hidden);
            }
        }

        let upcoming = &classification.upcoming;
        if !upcoming.is_empty() {
            text.push_str(SEPARATOR);
            text.push('\n');
            text.push_str("🟡 <b>ПРЕДСТОЯЩИЕ</b>\n\n");

            let listed = &upcoming[..upcoming.len().min(self.options.upcoming_limit)];
            for group in listed.chunk_by(|a, b| a.event.start_time == b.event.start_time) {
                self.write_upcoming_group(&mut text, group);
            }
        }

        let local = now.with_timezone(&self.options.utc_offset);
        let _ = write!(
            text,
            "🔄 <code>{} {}</code>",
            local.format("%H:%M:%S"),
            html_escape(&self.options.clock_label)
        );

        text
    }

    fn write_current(&self, text: &mut String, event: &CurrentEvent) {
        let raw = &event.event;
        let urgent = if event.time_left < self.options.urgent_threshold {
            " 🔴"
        } else {
            ""
        };

        let _ = write!(
            text,
            "{} <b>{}</b>{}\n     📍 {}  ·  ⏱ <code>{}</code>\n\n",
            self.catalog.event_icon(&raw.name),
            html_escape(self.catalog.event_name(&raw.name)),
            urgent,
            html_escape(self.catalog.map_name(&raw.map)),
            format_countdown(event.time_left),
        );
    }

    fn write_upcoming_group(&self, text: &mut String, group: &[UpcomingEvent]) {
        let Some(first) = group.first() else {
            return;
        };
        let soon = if first.time_until < self.options.soon_threshold {
            " 🟢"
        } else {
            ""
        };

        let _ = writeln!(
            text,
            "🕐 Через <code>{}</code>{}",
            format_countdown(first.time_until),
            soon
        );
        for event in group {
            let raw = &event.event;
            let _ = writeln!(
                text,
                "   {} {}  ·  📍 {}",
                self.catalog.event_icon(&raw.name),
                html_escape(self.catalog.event_name(&raw.name)),
                html_escape(self.catalog.map_name(&raw.map)),
            );
        }
        text.push('\n');
    }
}

/// Formats a countdown as `Hч MMм` or `Mм SSс`.
///
/// Non-positive durations render as `00:00`.
pub fn format_countdown(duration: Duration) -> String {
    let ms = duration.num_milliseconds();
    if ms <= 0 {
        return "00:00".to_string();
    }
    let (h, m, s) = split_hms(ms);
    if h > 0 {
        format!("{}ч {:02}м", h, m)
    } else {
        format!("{}м {:02}с", m, s)
    }
}

/// Like [`format_countdown`], but drops the minutes under one minute (`Sс`).
pub fn format_countdown_compact(duration: Duration) -> String {
    let ms = duration.num_milliseconds();
    if ms <= 0 {
        return "00:00".to_string();
    }
    match split_hms(ms) {
        (0, 0, s) => format!("{}с", s),
        _ => format_countdown(duration),
    }
}

fn split_hms(ms: i64) -> (i64, i64, i64) {
    let total_secs = ms / 1000;
    (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60)
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    let char_count = s.chars().count();

    if char_count <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Escapes text for HTML display.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
