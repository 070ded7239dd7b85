//! Scaled 8x8 bitmap face with proportional spacing.
//!
//! Glyphs come from `font8x8`. Advance is the glyph's lit column span plus
//! one column of tracking, so "i" is narrower than "W". Sizes are the pixel
//! height of the 8-row cell.

use font8x8::{UnicodeFonts, BASIC_FONTS, BOX_FONTS, LATIN_FONTS};
use image::Rgba;

use super::canvas::{Canvas, Rect};

pub const GLYPH_ROWS: u32 = 8;
const TRACKING: f32 = 1.0;
const SPACE_ADVANCE: f32 = 4.0;
/// Horizontal shift per row for italic, in glyph columns.
const ITALIC_SHEAR: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Font {
    pub size: u32,
    pub style: FontStyle,
}

impl Font {
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(1),
            style: FontStyle::Regular,
        }
    }

    pub fn bold(size: u32) -> Self {
        Self {
            style: FontStyle::Bold,
            ..Self::new(size)
        }
    }

    pub fn italic(size: u32) -> Self {
        Self {
            style: FontStyle::Italic,
            ..Self::new(size)
        }
    }

    fn scale(&self) -> f32 {
        self.size as f32 / GLYPH_ROWS as f32
    }

    pub fn line_height(&self) -> u32 {
        (self.size * 5).div_ceil(4)
    }

    fn slant_px(&self) -> f32 {
        match self.style {
            FontStyle::Italic => ((GLYPH_ROWS - 1) as f32 * ITALIC_SHEAR * self.scale()).ceil(),
            _ => 0.0,
        }
    }

    /// Width in pixels of `text` on one line; never less than what `draw` paints.
    pub fn measure(&self, text: &str) -> u32 {
        let mut units = 0.0;
        let mut any = false;
        for c in text.chars() {
            units += self.glyph(c).advance;
            any = true;
        }
        if !any {
            return 0;
        }
        let units = (units - TRACKING).max(0.0);
        (units * self.scale() + self.slant_px()).ceil() as u32
    }

    /// Paint `text` with its cell's top-left at (x, y).
    pub fn draw(&self, canvas: &mut Canvas, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        let s = self.scale();
        let mut cursor = 0.0f32;
        for c in text.chars() {
            let glyph = self.glyph(c);
            for (row, bits) in glyph.rows.iter().enumerate() {
                let shear = match self.style {
                    FontStyle::Italic => (GLYPH_ROWS as usize - 1 - row) as f32 * ITALIC_SHEAR,
                    _ => 0.0,
                };
                for col in 0..8u32 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let gx = cursor + (col - glyph.left) as f32 + shear;
                    let x0 = x + (gx * s).round() as i32;
                    let x1 = x + ((gx + 1.0) * s).round() as i32;
                    let y0 = y + (row as f32 * s).round() as i32;
                    let y1 = y + ((row as f32 + 1.0) * s).round() as i32;
                    let rect = Rect::new(x0, y0, (x1 - x0).max(1) as u32, (y1 - y0).max(1) as u32);
                    canvas.fill_rect(rect, color);
                }
            }
            cursor += glyph.advance;
        }
    }

    fn glyph(&self, c: char) -> Glyph {
        let mut rows = lookup(c);
        if self.style == FontStyle::Bold {
            for row in rows.iter_mut() {
                *row |= *row << 1;
            }
        }
        Glyph::from_rows(rows)
    }
}

struct Glyph {
    rows: [u8; 8],
    left: u32,
    advance: f32,
}

impl Glyph {
    fn from_rows(rows: [u8; 8]) -> Self {
        let mask = rows.iter().fold(0u8, |acc, r| acc | r);
        if mask == 0 {
            return Self {
                rows,
                left: 0,
                advance: SPACE_ADVANCE,
            };
        }
        let left = mask.trailing_zeros();
        let right = 7 - mask.leading_zeros();
        Self {
            rows,
            left,
            advance: (right - left + 1) as f32 + TRACKING,
        }
    }
}

fn lookup(c: char) -> [u8; 8] {
    let c = match c {
        '\u{2014}' | '\u{2013}' => '\u{2500}',
        '\u{2019}' | '\u{2018}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        other => other,
    };
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BOX_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
