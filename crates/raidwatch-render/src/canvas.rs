//! An `embedded-graphics` draw target backed by an in-memory RGB image.

use std::convert::Infallible;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle,
};
use embedded_graphics::text::{Alignment, Text};
use image::{Rgb, RgbImage};

/// Drawing surface for one dashboard frame.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Sets a single pixel, ignoring coordinates outside the canvas.
    pub fn put(&mut self, x: i32, y: i32, color: Rgb888) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < self.image.width() && y < self.image.height() {
            self.image
                .put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
        }
    }

    /// Reads a pixel back as a drawing colour.
    #[cfg(test)]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb888> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Rgb888::new(p[0], p[1], p[2]))
    }

    pub fn fill_rect(&mut self, area: Rectangle, color: Rgb888) -> Drawn {
        area.into_styled(PrimitiveStyle::with_fill(color)).draw(self)
    }

    pub fn rounded_rect(
        &mut self,
        area: Rectangle,
        radius: u32,
        fill: Rgb888,
        border: Option<Rgb888>,
    ) -> Drawn {
        let mut style = PrimitiveStyleBuilder::new().fill_color(fill);
        if let Some(border) = border {
            style = style.stroke_color(border).stroke_width(1);
        }
        RoundedRectangle::with_equal_corners(area, Size::new(radius, radius))
            .into_styled(style.build())
            .draw(self)
    }

    /// Fills `area` with a left-to-right gradient.
    pub fn hgradient(&mut self, area: Rectangle, from: Rgb888, to: Rgb888) {
        let Size { width, height } = area.size;
        let span = width.saturating_sub(1).max(1) as f32;
        for dx in 0..width {
            let color = lerp(from, to, dx as f32 / span);
            for dy in 0..height {
                self.put(area.top_left.x + dx as i32, area.top_left.y + dy as i32, color);
            }
        }
    }

    pub fn dot(&mut self, center: Point, diameter: u32, color: Rgb888, filled: bool) -> Drawn {
        let style = if filled {
            PrimitiveStyle::with_fill(color)
        } else {
            PrimitiveStyle::with_stroke(color, 1)
        };
        Circle::with_center(center, diameter)
            .into_styled(style)
            .draw(self)
    }

    /// Draws text with its baseline at `y`; `x` is the anchor for `alignment`.
    pub fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font: &MonoFont<'_>,
        color: Rgb888,
        alignment: Alignment,
    ) -> Drawn {
        let style = MonoTextStyle::new(font, color);
        Text::with_alignment(text, Point::new(x, y), style, alignment)
            .draw(self)
            .map(|_| ())
    }
}

/// Shorthand for a rectangle from its top-left corner and size.
pub fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}

/// Result of a drawing operation on a [`Canvas`]; drawing into memory cannot fail.
pub type Drawn = Result<(), Infallible>;

/// Width in pixels of `text` set in a monospaced `font`.
pub fn text_width(text: &str, font: &MonoFont<'_>) -> u32 {
    let chars = text.chars().count() as u32;
    chars * font.character_size.width + chars.saturating_sub(1) * font.character_spacing
}

fn lerp(from: Rgb888, to: Rgb888, t: f32) -> Rgb888 {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgb888::new(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put(point.x, point.y, color);
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::iso_8859_5::FONT_6X10;

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.put(-1, 0, Rgb888::WHITE);
        canvas.put(4, 4, Rgb888::WHITE);
        canvas.put(1, 2, Rgb888::WHITE);
        assert_eq!(canvas.get(1, 2), Some(Rgb888::WHITE));
        assert_eq!(canvas.get(0, 0), Some(Rgb888::BLACK));
        assert_eq!(canvas.get(4, 0), None);
    }

    #[test]
    fn fill_rect_covers_area() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(rect(2, 2, 3, 3), Rgb888::RED).unwrap();
        assert_eq!(canvas.get(2, 2), Some(Rgb888::RED));
        assert_eq!(canvas.get(4, 4), Some(Rgb888::RED));
        assert_eq!(canvas.get(5, 5), Some(Rgb888::BLACK));
    }

    #[test]
    fn gradient_endpoints() {
        let mut canvas = Canvas::new(11, 1);
        canvas.hgradient(rect(0, 0, 11, 1), Rgb888::BLACK, Rgb888::WHITE);
        assert_eq!(canvas.get(0, 0), Some(Rgb888::BLACK));
        assert_eq!(canvas.get(10, 0), Some(Rgb888::WHITE));
    }

    #[test]
    fn cyrillic_text_draws_pixels() {
        let mut canvas = Canvas::new(80, 20);
        canvas
            .text("Дамба", 0, 12, &FONT_6X10, Rgb888::WHITE, Alignment::Left)
            .unwrap();
        let lit = (0..80)
            .flat_map(|x| (0..20).map(move |y| (x, y)))
            .filter(|&(x, y)| canvas.get(x, y) == Some(Rgb888::WHITE))
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn monospace_width() {
        assert_eq!(text_width("", &FONT_6X10), 0);
        assert_eq!(text_width("Дамба", &FONT_6X10), 30);
    }
}
