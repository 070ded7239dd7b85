//! Raster primitives over an RGBA buffer.
//!
//! Shapes are rounded rectangles (circles are rounded squares with radius
//! half the side). Corner pixels are 4x4 supersampled; straight edges sit on
//! integer pixel boundaries and need no coverage math.

use image::{Rgba, RgbaImage};

const SUBSAMPLES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn inset(&self, amount: u32) -> Rect {
        let amount = amount.min(self.w / 2).min(self.h / 2);
        Rect::new(
            self.x + amount as i32,
            self.y + amount as i32,
            self.w - 2 * amount,
            self.h - 2 * amount,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x && other.y >= self.y && other.right() <= self.right() && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Square of side `2 * radius` centred on (cx, cy).
    pub fn around(cx: i32, cy: i32, radius: u32) -> Rect {
        Rect::new(cx - radius as i32, cy - radius as i32, radius * 2, radius * 2)
    }
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Source-over blend of `color` at `coverage` (0..=1).
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let src_a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for i in 0..3 {
            let s = color[i] as f32;
            let d = dst[i] as f32;
            let blended = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            dst[i] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }

    /// Fill a rounded rect with a per-pixel color.
    pub fn fill_shape(&mut self, rect: Rect, radius: u32, shader: impl Fn(i32, i32) -> Rgba<u8>) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let coverage = rounded_coverage(&rect, radius, x, y);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, shader(x, y), coverage);
                }
            }
        }
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: u32, color: Rgba<u8>) {
        self.fill_shape(rect, radius, |_, _| color);
    }

    /// Top-to-bottom linear gradient inside a rounded rect.
    pub fn gradient_rounded_rect(&mut self, rect: Rect, radius: u32, top: Rgba<u8>, bottom: Rgba<u8>) {
        let span = (rect.h.max(2) - 1) as f32;
        self.fill_shape(rect, radius, |_, y| {
            let t = (y - rect.y) as f32 / span;
            lerp_rgba(top, bottom, t)
        });
    }

    /// Ring of `width` pixels just inside the rounded rect's edge.
    pub fn stroke_rounded_rect(&mut self, rect: Rect, radius: u32, width: u32, color: Rgba<u8>) {
        let inner = rect.inset(width);
        let inner_radius = radius.saturating_sub(width);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let outer = rounded_coverage(&rect, radius, x, y);
                if outer <= 0.0 {
                    continue;
                }
                let hole = if inner.w == 0 || inner.h == 0 {
                    0.0
                } else {
                    rounded_coverage(&inner, inner_radius, x, y)
                };
                let coverage = outer - hole;
                if coverage > 0.0 {
                    self.blend_pixel(x, y, color, coverage);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Rgba<u8>) {
        self.fill_rounded_rect(Rect::around(cx, cy, radius), radius, color);
    }

    pub fn stroke_circle(&mut self, cx: i32, cy: i32, radius: u32, width: u32, color: Rgba<u8>) {
        self.stroke_rounded_rect(Rect::around(cx, cy, radius), radius, width, color);
    }

    /// Axis-aligned diamond with the given half-diagonal.
    pub fn fill_diamond(&mut self, cx: i32, cy: i32, half: u32, color: Rgba<u8>) {
        let half = half as i32;
        for dy in -half..=half {
            let span = half - dy.abs();
            for dx in -span..=span {
                self.blend_pixel(cx + dx, cy + dy, color, 1.0);
            }
        }
    }

    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, thickness: u32, color: Rgba<u8>) {
        self.fill_rect(Rect::new(x0, y, (x1 - x0).max(0) as u32, thickness), color);
    }

    /// Composite `source` with its top-left at (x, y), masked to a rounded rect.
    pub fn draw_image(&mut self, source: &RgbaImage, x: i32, y: i32, radius: u32) {
        let rect = Rect::new(x, y, source.width(), source.height());
        for (sx, sy, pixel) in source.enumerate_pixels() {
            let px = x + sx as i32;
            let py = y + sy as i32;
            let coverage = rounded_coverage(&rect, radius, px, py);
            if coverage > 0.0 {
                self.blend_pixel(px, py, *pixel, coverage);
            }
        }
    }
}

pub fn lerp_rgba(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
    }
    Rgba(out)
}

/// Fraction of pixel (px, py) inside the rounded rect.
fn rounded_coverage(rect: &Rect, radius: u32, px: i32, py: i32) -> f32 {
    if px < rect.x || py < rect.y || px >= rect.right() || py >= rect.bottom() {
        return 0.0;
    }
    let r = radius.min(rect.w / 2).min(rect.h / 2) as i32;
    let near_x = px < rect.x + r || px >= rect.right() - r;
    let near_y = py < rect.y + r || py >= rect.bottom() - r;
    if r == 0 || !(near_x && near_y) {
        return 1.0;
    }

    let (x0, y0) = (rect.x as f32, rect.y as f32);
    let (x1, y1) = (rect.right() as f32, rect.bottom() as f32);
    let rf = r as f32;
    let step = 1.0 / SUBSAMPLES as f32;

    let mut inside = 0u32;
    for sy in 0..SUBSAMPLES {
        for sx in 0..SUBSAMPLES {
            let fx = px as f32 + (sx as f32 + 0.5) * step;
            let fy = py as f32 + (sy as f32 + 0.5) * step;
            let cx = fx.clamp(x0 + rf, x1 - rf);
            let cy = fy.clamp(y0 + rf, y1 - rf);
            let (dx, dy) = (fx - cx, fy - cy);
            if dx * dx + dy * dy <= rf * rf {
                inside += 1;
            }
        }
    }
    inside as f32 / (SUBSAMPLES * SUBSAMPLES) as f32
}
