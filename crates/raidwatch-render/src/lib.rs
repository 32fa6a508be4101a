//! Dashboard image rendering.
//!
//! [`ImageRenderer`] implements [`raidwatch_core::DashboardRenderer`]: it draws
//! the running and upcoming events as cards on a dark background, encodes the
//! frame as PNG and pairs it with the HTML caption.
//!
//! Drawing uses `embedded-graphics` primitives and ISO 8859-5 monospaced fonts
//! (Latin and Cyrillic) on an in-memory [`image::RgbImage`]. The frame is laid
//! out at half size and upscaled with nearest-neighbour filtering, which keeps
//! the bitmap glyphs crisp.

mod canvas;
mod layout;
mod palette;
mod renderer;

pub use layout::{SCALE, WIDTH};
pub use renderer::{DEFAULT_CREDIT, ImageRenderer};
