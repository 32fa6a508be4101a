//! Core types: events, classification, clock, display catalog, caption formatting

pub mod catalog;
pub mod dashboard;
pub mod event;
pub mod format;
pub mod time;
pub mod tracing;

pub use catalog::{DisplayCatalog, Rgb};
pub use dashboard::{Dashboard, DashboardRenderer, RenderError, RenderResult};
pub use event::{Classification, CurrentEvent, Event, UPCOMING_LIMIT, UpcomingEvent, classify};
pub use format::{
    CAPTION_LIMIT, CaptionFormatter, CaptionOptions, ellipsis, format_countdown,
    format_countdown_compact, html_escape,
};
pub use time::{Clock, ManualClock, SystemClock};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
