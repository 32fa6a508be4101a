//! The dashboard image renderer.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_5::{
    FONT_5X8, FONT_6X10, FONT_6X13_BOLD, FONT_7X13_BOLD, FONT_8X13_BOLD, FONT_9X15_BOLD,
    FONT_10X20,
};
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use raidwatch_core::format::CaptionFormatter;
use raidwatch_core::{
    Classification, CurrentEvent, Dashboard, DashboardRenderer, RenderError, RenderResult,
    UpcomingEvent, ellipsis, format_countdown_compact,
};
use tracing::debug;

use crate::canvas::{Canvas, Drawn, rect, text_width};
use crate::layout::*;
use crate::palette::{self, card, card_border, rgb888, tint};

/// Attribution printed in the footer.
pub const DEFAULT_CREDIT: &str = "metaforge.app";

const TRACKER_FONT: MonoFont<'static> = MonoFont {
    character_spacing: 2,
    ..FONT_6X10
};

const ACTIVE_NAME_FONTS: [&MonoFont<'static>; 3] = [&FONT_9X15_BOLD, &FONT_8X13_BOLD, &FONT_7X13_BOLD];
const UPCOMING_NAME_FONTS: [&MonoFont<'static>; 3] = [&FONT_7X13_BOLD, &FONT_6X13_BOLD, &FONT_6X10];

/// Renders classified events into a PNG dashboard plus HTML caption.
///
/// The caption comes from the wrapped [`CaptionFormatter`]; the image uses
/// the same display catalog and clock settings so both halves agree.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    formatter: CaptionFormatter,
    credit: String,
}

impl ImageRenderer {
    /// Creates a renderer around a caption formatter.
    pub fn new(formatter: CaptionFormatter) -> Self {
        Self {
            formatter,
            credit: DEFAULT_CREDIT.to_string(),
        }
    }

    /// Builder: set the footer attribution.
    #[must_use]
    pub fn with_credit(mut self, credit: impl Into<String>) -> Self {
        self.credit = credit.into();
        self
    }

    /// Returns the caption formatter.
    pub fn formatter(&self) -> &CaptionFormatter {
        &self.formatter
    }

    /// Draws and encodes the dashboard image only.
    pub fn render_image(
        &self,
        classification: &Classification,
        now: DateTime<Utc>,
    ) -> RenderResult<Vec<u8>> {
        let layout = Layout::new(classification.current.len(), classification.upcoming.len());
        let mut canvas = Canvas::new(WIDTH, layout.height);
        self.draw(&mut canvas, &layout, classification, now)
            .unwrap_or_else(|never| match never {});

        let frame = canvas.into_image();
        let scaled = imageops::resize(
            &frame,
            frame.width() * SCALE,
            frame.height() * SCALE,
            FilterType::Nearest,
        );
        let png = encode_png(&scaled)?;
        debug!(
            width = scaled.width(),
            height = scaled.height(),
            bytes = png.len(),
            "dashboard image rendered"
        );
        Ok(png)
    }

    fn draw(
        &self,
        canvas: &mut Canvas,
        layout: &Layout,
        classification: &Classification,
        now: DateTime<Utc>,
    ) -> Drawn {
        draw_background(canvas);

        let mut y = PAD;
        draw_header(canvas, y)?;
        y += HEADER_H;

        if layout.active.count > 0 {
            let events = &classification.current[..layout.active.count];
            self.draw_active(canvas, &layout.active, events, y)?;
            y += layout.active.section_height() + SECTION_GAP;
        }

        if layout.upcoming.count > 0 {
            let events = &classification.upcoming[..layout.upcoming.count];
            self.draw_upcoming(canvas, &layout.upcoming, events, y)?;
        }

        self.draw_footer(canvas, layout.height as i32, now)
    }

    fn draw_active(
        &self,
        canvas: &mut Canvas,
        grid: &Grid,
        events: &[CurrentEvent],
        top: i32,
    ) -> Drawn {
        let label = "АКТИВНЫЕ РЕЙДЫ";
        let green = rgb888(palette::GREEN);
        canvas.dot(Point::new(PAD + 3, top + 8), 6, green, true)?;
        canvas.text(label, PAD + 10, top + 12, &FONT_7X13_BOLD, green, Alignment::Left)?;

        let count = events.len().to_string();
        let badge_x = PAD + 10 + text_width(label, &FONT_7X13_BOLD) as i32 + 6;
        let badge_w = text_width(&count, &FONT_6X10) + 8;
        canvas.rounded_rect(
            rect(badge_x, top + 4, badge_w, 11),
            5,
            rgb888(palette::GREEN.over(palette::BG_MID, 0.12)),
            None,
        )?;
        canvas.text(&count, badge_x + 4, top + 12, &FONT_6X10, green, Alignment::Left)?;

        let urgent = self.formatter.options().urgent_threshold;
        let catalog = self.formatter.catalog();
        let top = top + LABEL_H;
        let (w, h) = (grid.card_w, grid.card_h);
        let ip = 11;

        for (i, current) in events.iter().enumerate() {
            let (x, dy) = grid.cell(i);
            let y = top + dy;
            let accent = catalog.map_color(&current.event.map);
            let is_low = current.time_left < urgent;

            canvas.rounded_rect(rect(x, y, w, h as u32), RADIUS, rgb888(card()), Some(rgb888(card_border())))?;
            canvas.hgradient(
                rect(x + RADIUS as i32, y, w - RADIUS * 2, 2),
                tint(accent, 0.6),
                rgb888(card()),
            );

            let map = catalog.map_name(&current.event.map).to_uppercase();
            canvas.text(&map, x + ip, y + 15, &FONT_6X13_BOLD, rgb888(accent), Alignment::Left)?;

            let live = if is_low { palette::RED } else { palette::LIVE_RED };
            let (badge_w, badge_h) = (32, 11);
            let badge_x = x + w as i32 - ip - badge_w as i32;
            let badge_y = y + 7;
            canvas.rounded_rect(rect(badge_x, badge_y, badge_w, badge_h), 5, tint(live, 0.15), None)?;
            canvas.dot(Point::new(badge_x + 6, badge_y + 5), 4, rgb888(live), true)?;
            canvas.text("LIVE", badge_x + 10, badge_y + 8, &FONT_5X8, rgb888(live), Alignment::Left)?;

            let name = catalog.event_name(&current.event.name);
            let (name, font) = fit(name, w - ip as u32 * 2, &ACTIVE_NAME_FONTS);
            canvas.text(&name, x + ip, y + 36, font, rgb888(palette::WHITE), Alignment::Left)?;

            let bar_w = w - ip as u32 * 2;
            let bar_y = y + 46;
            canvas.rounded_rect(rect(x + ip, bar_y, bar_w, 3), 1, tint(palette::WHITE, 0.06), None)?;
            let filled = ((bar_w as f64 * current.progress_remaining()).round() as u32).max(3);
            let bar = if is_low { palette::RED } else { palette::GREEN };
            canvas.hgradient(rect(x + ip, bar_y, filled, 3), rgb888(bar), tint(bar, 0.4));

            canvas.text("Осталось", x + ip, y + h - 12, &FONT_6X10, rgb888(palette::DIM), Alignment::Left)?;
            let countdown = format_countdown_compact(current.time_left);
            let color = if is_low { palette::RED } else { palette::WHITE };
            canvas.text(
                &countdown,
                x + w as i32 - ip,
                y + h - 9,
                &FONT_10X20,
                rgb888(color),
                Alignment::Right,
            )?;
        }

        Ok(())
    }

    fn draw_upcoming(
        &self,
        canvas: &mut Canvas,
        grid: &Grid,
        events: &[UpcomingEvent],
        top: i32,
    ) -> Drawn {
        let orange = rgb888(palette::ORANGE);
        canvas.dot(Point::new(PAD + 3, top + 8), 6, orange, false)?;
        canvas.text("ПРЕДСТОЯЩИЕ", PAD + 10, top + 12, &FONT_7X13_BOLD, orange, Alignment::Left)?;

        let soon = self.formatter.options().soon_threshold;
        let catalog = self.formatter.catalog();
        let top = top + LABEL_H;
        let (w, h) = (grid.card_w, grid.card_h);
        let ip = 8;

        for (i, upcoming) in events.iter().enumerate() {
            let (x, dy) = grid.cell(i);
            let y = top + dy;
            let accent = catalog.map_color(&upcoming.event.map);
            let is_soon = upcoming.time_until < soon;

            canvas.rounded_rect(rect(x, y, w, h as u32), RADIUS, rgb888(card()), Some(rgb888(card_border())))?;
            canvas.fill_rect(rect(x, y + (h - 20) / 2, 2, 20), tint(accent, 0.5))?;

            let map = catalog.map_name(&upcoming.event.map).to_uppercase();
            let (map, _) = fit(&map, w - ip as u32 * 2, &[&FONT_6X10]);
            canvas.text(&map, x + ip, y + 13, &FONT_6X10, tint(accent, 0.8), Alignment::Left)?;

            let name = catalog.event_name(&upcoming.event.name);
            let (name, font) = fit(name, w - ip as u32 * 2, &UPCOMING_NAME_FONTS);
            canvas.text(&name, x + ip, y + 27, font, rgb888(palette::WHITE), Alignment::Left)?;

            let countdown = format_countdown_compact(upcoming.time_until);
            let color = if is_soon { palette::GREEN } else { palette::SUBTEXT };
            canvas.text(&countdown, x + ip, y + h - 9, &FONT_9X15_BOLD, rgb888(color), Alignment::Left)?;

            if is_soon {
                let label = "СКОРО";
                let badge_w = text_width(label, &FONT_5X8) + 6;
                let badge_x = x + w as i32 - ip - badge_w as i32;
                canvas.rounded_rect(rect(badge_x, y + h - 17, badge_w, 10), 4, tint(palette::GREEN, 0.12), None)?;
                canvas.text(label, badge_x + 3, y + h - 10, &FONT_5X8, rgb888(palette::GREEN), Alignment::Left)?;
            }
        }

        Ok(())
    }

    fn draw_footer(&self, canvas: &mut Canvas, height: i32, now: DateTime<Utc>) -> Drawn {
        let options = self.formatter.options();
        let clock = now.with_timezone(&options.utc_offset).format("%H:%M:%S");
        let footer = format!("Обновлено {} {}  -  {}", clock, options.clock_label, self.credit);
        canvas.text(
            &footer,
            WIDTH as i32 / 2,
            height - PAD + 5,
            &FONT_6X10,
            rgb888(palette::DIM),
            Alignment::Center,
        )
    }
}

impl DashboardRenderer for ImageRenderer {
    fn render(
        &self,
        classification: &Classification,
        now: DateTime<Utc>,
    ) -> RenderResult<Dashboard> {
        let image = self.render_image(classification, now)?;
        let caption = self.formatter.format(classification, now);
        Ok(Dashboard::new(image, caption))
    }
}

fn draw_background(canvas: &mut Canvas) {
    let (w, h) = (canvas.width(), canvas.height());
    let glow_h = h * 2 / 5;
    let glow_radius = w as f32 * 0.6;
    let center = w as f32 / 2.0;

    for y in 0..h {
        let base = palette::background_at(y as f32 / h.saturating_sub(1).max(1) as f32);
        for x in 0..w {
            let mut color = base;
            if y < glow_h {
                let dist = (x as f32 - center).hypot(y as f32) / glow_radius;
                if dist < 1.0 {
                    color = palette::GLOW.over(color, 0.06 * (1.0 - dist));
                }
            }
            if x as usize % GRID_STEP == 0 || y as usize % GRID_STEP == 0 {
                color = palette::WHITE.over(color, palette::GRID_ALPHA);
            }
            canvas.put(x as i32, y as i32, rgb888(color));
        }
    }
}

fn draw_header(canvas: &mut Canvas, top: i32) -> Drawn {
    let center = WIDTH as i32 / 2;
    canvas.text("ARC RAIDERS", center, top + 19, &FONT_10X20, rgb888(palette::WHITE), Alignment::Center)?;

    let edge = rgb888(palette::background_at(0.0));
    let mid = rgb888(palette::WHITE.over(palette::BG_TOP, 0.2));
    canvas.hgradient(rect(center - 45, top + 25, 45, 1), edge, mid);
    canvas.hgradient(rect(center, top + 25, 45, 1), mid, edge);

    canvas.text("RAID  TRACKER", center, top + 37, &TRACKER_FONT, rgb888(palette::DIM), Alignment::Center)
}

/// Picks the first font in which `text` fits `max_width`, or truncates it in
/// the last one.
fn fit<'a>(
    text: &'a str,
    max_width: u32,
    fonts: &[&'static MonoFont<'static>],
) -> (Cow<'a, str>, &'static MonoFont<'static>) {
    let mut last = &FONT_6X10;
    for &font in fonts {
        if text_width(text, font) <= max_width {
            return (Cow::Borrowed(text), font);
        }
        last = font;
    }
    let advance = last.character_size.width + last.character_spacing;
    (ellipsis(text, (max_width / advance) as usize), last)
}

fn encode_png(image: &RgbImage) -> RenderResult<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use raidwatch_core::format::CaptionOptions;
    use raidwatch_core::{DisplayCatalog, Event, classify};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 18, 0, 0).unwrap()
    }

    fn renderer() -> ImageRenderer {
        ImageRenderer::new(CaptionFormatter::new(
            DisplayCatalog::default(),
            CaptionOptions::default(),
        ))
    }

    fn sample_events() -> Vec<Event> {
        let now = now();
        vec![
            Event::new("Matriarch", "Dam", now - Duration::minutes(10), now + Duration::minutes(3)),
            Event::new("Night Raid", "Buried City", now - Duration::minutes(5), now + Duration::minutes(55)),
            Event::new("Harvester", "Spaceport", now + Duration::minutes(4), now + Duration::minutes(64)),
            Event::new("Electromagnetic Storm", "Blue Gate", now + Duration::hours(2), now + Duration::hours(3)),
            Event::new("Some Very Long Unknown Event Name", "Moon Base", now + Duration::hours(3), now + Duration::hours(4)),
        ]
    }

    #[test]
    fn renders_png_1080_wide() {
        let classification = classify(&sample_events(), now());
        let png = renderer().render_image(&classification, now()).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 1080);
        assert_eq!(decoded.height(), Layout::new(2, 3).height * SCALE);
    }

    #[test]
    fn renders_empty_classification() {
        let png = renderer()
            .render_image(&Classification::default(), now())
            .unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), WIDTH * SCALE);
        assert_eq!(decoded.height(), Layout::new(0, 0).height * SCALE);
    }

    #[test]
    fn dashboard_carries_caption() {
        let classification = classify(&sample_events(), now());
        let dashboard = renderer().render(&classification, now()).unwrap();
        assert!(dashboard.caption.contains("Матриарх"));
        assert!(dashboard.caption.ends_with("🔄 <code>21:00:00 МСК</code>"));
        assert!(!dashboard.image.is_empty());
    }

    #[test]
    fn fit_shrinks_then_truncates() {
        let (text, font) = fit("Матриарх", 200, &ACTIVE_NAME_FONTS);
        assert_eq!(text, "Матриарх");
        assert_eq!(font.character_size.width, 9);

        // 20 chars: too wide for 9px and 8px glyphs in 150px, fits at 7px.
        let (text, font) = fit("Лут Пусковой Башни 2", 150, &ACTIVE_NAME_FONTS);
        assert_eq!(text, "Лут Пусковой Башни 2");
        assert_eq!(font.character_size.width, 7);

        let (text, _) = fit("Some Very Long Unknown Event Name", 70, &ACTIVE_NAME_FONTS);
        insta::assert_snapshot!(text, @"Some Ve...");
    }
}
