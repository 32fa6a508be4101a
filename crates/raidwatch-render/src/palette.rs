//! Colours of the dark dashboard theme.

use embedded_graphics::pixelcolor::Rgb888;
use raidwatch_core::Rgb;

pub const BG_TOP: Rgb = Rgb(0x0e, 0x0e, 0x14);
pub const BG_MID: Rgb = Rgb(0x0b, 0x0b, 0x0f);
pub const BG_BOTTOM: Rgb = Rgb(0x08, 0x08, 0x0c);

pub const WHITE: Rgb = Rgb(0xf0, 0xf0, 0xf0);
pub const SUBTEXT: Rgb = Rgb(0x8b, 0x8b, 0x9e);
pub const DIM: Rgb = Rgb(0x50, 0x50, 0x68);
pub const GREEN: Rgb = Rgb(0x34, 0xd3, 0x99);
pub const RED: Rgb = Rgb(0xf8, 0x71, 0x71);
pub const LIVE_RED: Rgb = Rgb(0xef, 0x44, 0x44);
pub const ORANGE: Rgb = Rgb(0xfb, 0xbf, 0x24);
pub const GLOW: Rgb = Rgb(0x60, 0xa5, 0xfa);

/// Opacity of card fills, borders and the background grid (white over background).
pub const CARD_ALPHA: f32 = 0.04;
pub const CARD_BORDER_ALPHA: f32 = 0.06;
pub const GRID_ALPHA: f32 = 0.015;

/// Converts a catalog colour into a drawing colour.
pub fn rgb888(c: Rgb) -> Rgb888 {
    Rgb888::new(c.0, c.1, c.2)
}

/// `fg` at `alpha` over the card background.
pub fn tint(fg: Rgb, alpha: f32) -> Rgb888 {
    rgb888(fg.over(card(), alpha))
}

/// The card fill colour.
pub fn card() -> Rgb {
    WHITE.over(BG_MID, CARD_ALPHA)
}

/// The card border colour.
pub fn card_border() -> Rgb {
    WHITE.over(BG_MID, CARD_BORDER_ALPHA)
}

/// Background colour at relative height `t` in `[0, 1]`.
pub fn background_at(t: f32) -> Rgb {
    if t < 0.5 {
        BG_MID.over(BG_TOP, t * 2.0)
    } else {
        BG_BOTTOM.over(BG_MID, (t - 0.5) * 2.0)
    }
}
