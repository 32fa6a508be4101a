//! Dashboard geometry.
//!
//! Everything here is in design pixels; the frame is drawn at this size and
//! upscaled by [`SCALE`] before encoding, so the published image is
//! `WIDTH * SCALE` pixels wide.

/// Upscale factor applied to the finished frame.
pub const SCALE: u32 = 2;

pub const WIDTH: u32 = 540;
pub const PAD: i32 = 20;
pub const GAP: i32 = 7;
pub const RADIUS: u32 = 10;

pub const HEADER_H: i32 = 45;
pub const SECTION_GAP: i32 = 18;
pub const LABEL_H: i32 = 22;
pub const FOOTER_H: i32 = 25;

pub const ACTIVE_COLS: usize = 2;
pub const ACTIVE_MAX: usize = 6;
pub const ACTIVE_CARD_H: i32 = 85;

pub const UPCOMING_COLS: usize = 3;
pub const UPCOMING_MAX: usize = 9;
pub const UPCOMING_CARD_H: i32 = 55;

/// Spacing of the faint background grid.
pub const GRID_STEP: usize = 30;

/// Card grid for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub count: usize,
    pub cols: usize,
    pub card_w: u32,
    pub card_h: i32,
}

impl Grid {
    fn new(count: usize, cols: usize, card_h: i32) -> Self {
        let inner = WIDTH as i32 - PAD * 2 - GAP * (cols as i32 - 1);
        Self {
            count,
            cols,
            card_w: (inner / cols as i32) as u32,
            card_h,
        }
    }

    pub fn rows(&self) -> usize {
        self.count.div_ceil(self.cols)
    }

    /// Height of the cards, excluding the section label.
    pub fn cards_height(&self) -> i32 {
        let rows = self.rows() as i32;
        if rows == 0 {
            0
        } else {
            rows * self.card_h + (rows - 1) * GAP
        }
    }

    /// Height of the whole section including its label, or 0 when empty.
    pub fn section_height(&self) -> i32 {
        if self.count == 0 {
            0
        } else {
            LABEL_H + self.cards_height()
        }
    }

    /// Top-left corner of card `index`, relative to the first card.
    pub fn cell(&self, index: usize) -> (i32, i32) {
        let col = (index % self.cols) as i32;
        let row = (index / self.cols) as i32;
        (
            PAD + col * (self.card_w as i32 + GAP),
            row * (self.card_h + GAP),
        )
    }
}

/// Vertical layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub active: Grid,
    pub upcoming: Grid,
    pub height: u32,
}

impl Layout {
    /// Lays out a frame for the given number of running and upcoming events.
    ///
    /// Counts above the section maximums are clamped.
    pub fn new(current: usize, upcoming: usize) -> Self {
        let active = Grid::new(current.min(ACTIVE_MAX), ACTIVE_COLS, ACTIVE_CARD_H);
        let upcoming = Grid::new(upcoming.min(UPCOMING_MAX), UPCOMING_COLS, UPCOMING_CARD_H);

        let between = if active.count > 0 && upcoming.count > 0 {
            SECTION_GAP
        } else {
            0
        };
        let height = PAD
            + HEADER_H
            + active.section_height()
            + between
            + upcoming.section_height()
            + FOOTER_H
            + PAD;

        Self {
            active,
            upcoming,
            height: height as u32,
        }
    }
}
