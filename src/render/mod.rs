//! Card Renderer
//!
//! Draws a validated card onto a 750x1050 RGBA canvas (2.5x3.5in at 300 DPI).
//! Stages run in a fixed order: frame, header, art, type bar, rules box,
//! footer. Rendering the same card twice yields identical pixels.

pub mod canvas;
pub mod font;
pub mod layout;
pub mod symbols;
pub mod wrap;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use log::{debug, warn};
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::card::{Artwork, Card};
use crate::config::RenderSettings;
use crate::palette::{darken, lighten, mix, palette_for, rgba, Palette};

use canvas::{Canvas, Rect};
use font::Font;
use layout::{fit_single_line, layout_rules_text, CardLayout, RulesLineKind, CARD_HEIGHT, CARD_WIDTH};

pub use layout::{RulesLayout, RulesLine};

const GEM_DIAMETER: u32 = 40;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Rendering dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

static BACKEND: Lazy<Result<(), String>> = Lazy::new(probe_backend);

/// Round-trip a single pixel through the PNG codec.
fn probe_backend() -> Result<(), String> {
    let pixel = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(pixel.as_raw(), 1, 1, ExtendedColorType::Rgba8)
        .map_err(|e| format!("PNG encoder: {}", e))?;
    image::load_from_memory(&buf)
        .map(|_| ())
        .map_err(|e| format!("image decoder: {}", e))
}

/// Fails once per process if the image codecs are missing.
pub fn ensure_backend() -> Result<(), RenderError> {
    match &*BACKEND {
        Ok(()) => Ok(()),
        Err(e) => Err(RenderError::DependencyUnavailable(e.clone())),
    }
}

pub struct CardRenderer {
    settings: RenderSettings,
    layout: CardLayout,
}

impl CardRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            layout: CardLayout::standard(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (CARD_WIDTH, CARD_HEIGHT)
    }

    pub fn render(&self, card: &Card) -> Result<RgbaImage, RenderError> {
        ensure_backend()?;

        let palette = palette_for(card.color_identity());
        let mut canvas = Canvas::new(CARD_WIDTH, CARD_HEIGHT);

        self.draw_frame(&mut canvas, palette);
        self.draw_header(&mut canvas, palette, card);
        self.draw_art(&mut canvas, palette, card);
        self.draw_type_bar(&mut canvas, palette, card);
        self.draw_rules(&mut canvas, palette, card);
        self.draw_footer(&mut canvas, palette, card);

        debug!("rendered {} with {} palette", card.name(), palette.faction);
        Ok(canvas.into_image())
    }

    /// Rules text layout exactly as `render` would place it.
    pub fn layout_rules(&self, card: &Card) -> RulesLayout {
        let area = self.layout.rules_text_area();
        layout_rules_text(
            card.abilities(),
            card.flavor_text(),
            area.w,
            self.layout.rules_text_height(card.stats().is_some()),
            &self.settings,
        )
    }

    fn draw_frame(&self, canvas: &mut Canvas, palette: &Palette) {
        let l = &self.layout;
        canvas.fill_rounded_rect(l.frame, CardLayout::FRAME_RADIUS, rgba(darken(palette.frame, 0.45), 255));
        canvas.fill_rounded_rect(l.inner.offset(3, 5), CardLayout::INNER_RADIUS, rgba([0, 0, 0], 70));
        canvas.gradient_rounded_rect(
            l.inner,
            CardLayout::INNER_RADIUS,
            rgba(palette.base, 255),
            rgba(palette.base_dark, 255),
        );
        canvas.stroke_rounded_rect(l.inner, CardLayout::INNER_RADIUS, 3, rgba(palette.accent, 200));
    }

    fn draw_header(&self, canvas: &mut Canvas, palette: &Palette, card: &Card) {
        let header = self.layout.header;
        draw_shadow(canvas, header, CardLayout::PANEL_RADIUS);
        canvas.gradient_rounded_rect(
            header,
            CardLayout::PANEL_RADIUS,
            rgba(lighten(palette.base, 0.08), 255),
            rgba(mix(palette.base, palette.base_dark, 0.6), 255),
        );
        canvas.stroke_rounded_rect(header, CardLayout::PANEL_RADIUS, 3, rgba(palette.accent, 255));

        let cy = header.y + header.h as i32 / 2;
        let gems_left = symbols::draw_mana_cost(canvas, header.right() - 20, cy, card.mana_cost(), GEM_DIAMETER);

        let name_x = header.x + 24;
        let max_width = (gems_left - 16 - name_x).max(1) as u32;
        let (font, name) = fit_single_line(
            card.name(),
            self.settings.title_font_size,
            self.settings.min_title_font_size,
            self.settings.shrink_step,
            max_width,
            true,
        );
        if name != card.name() {
            warn!("name '{}' truncated to fit the header", card.name());
        }
        let y = cy - font.size as i32 / 2;
        font.draw(canvas, name_x + 2, y + 2, &name, rgba([0, 0, 0], 90));
        font.draw(canvas, name_x, y, &name, rgba(palette.header_text, 255));
    }

    fn draw_art(&self, canvas: &mut Canvas, palette: &Palette, card: &Card) {
        let art_box = self.layout.art;
        let radius = CardLayout::PANEL_RADIUS;
        canvas.fill_rounded_rect(art_box.offset(0, 8), radius, rgba([0, 0, 0], 70));
        canvas.fill_rounded_rect(art_box, radius, rgba(darken(palette.frame, 0.2), 255));

        let window = art_box.inset(8);
        let inner_radius = radius - 8;
        match cover_art(card.artwork(), window.w, window.h) {
            Some(art) => canvas.draw_image(&art, window.x, window.y, inner_radius),
            None => canvas.gradient_rounded_rect(
                window,
                inner_radius,
                rgba(lighten(palette.accent, 0.2), 255),
                rgba(darken(palette.accent, 0.35), 255),
            ),
        }
        canvas.stroke_rounded_rect(window, inner_radius, 2, rgba(lighten(palette.accent, 0.3), 160));
    }

    fn draw_type_bar(&self, canvas: &mut Canvas, palette: &Palette, card: &Card) {
        let bar = self.layout.type_bar;
        draw_panel(canvas, bar, palette, rgba(palette.surface, 255));

        let x = bar.x + 24;
        let (font, text) = fit_single_line(
            card.type_line(),
            self.settings.type_font_size,
            self.settings.min_rules_font_size,
            self.settings.shrink_step,
            bar.w - 48,
            false,
        );
        let y = bar.y + (bar.h as i32 - font.size as i32) / 2;
        font.draw(canvas, x, y, &text, rgba(palette.body_text, 255));
    }

    fn draw_rules(&self, canvas: &mut Canvas, palette: &Palette, card: &Card) {
        draw_panel(canvas, self.layout.rules, palette, rgba(lighten(palette.surface, 0.35), 255));

        let layout = self.layout_rules(card);
        if layout.overflow {
            warn!(
                "rules text for '{}' overflows at {}px; {} lines kept",
                card.name(),
                layout.font_size,
                layout.lines.len()
            );
        }

        let area = self.layout.rules_text_area();
        let regular = Font::new(layout.font_size);
        let italic = Font::italic(layout.font_size);
        let body = rgba(palette.body_text, 255);
        let flavor = rgba(mix(palette.body_text, palette.surface, 0.3), 255);

        for line in &layout.lines {
            let top = area.y + line.y_offset as i32;
            let text_y = top + (line.height as i32 - layout.font_size as i32) / 2;
            let x = area.x + line.x_offset as i32;
            match line.kind {
                RulesLineKind::Ability => {
                    if line.bullet {
                        let cx = area.x + line.x_offset as i32 / 2;
                        let cy = text_y + layout.font_size as i32 / 2;
                        canvas.fill_circle(cx, cy, (layout.font_size / 6).max(2), rgba(darken(palette.frame, 0.2), 255));
                    }
                    regular.draw(canvas, x, text_y, &line.text, body);
                }
                RulesLineKind::Separator => {
                    let inset = area.w as i32 / 10;
                    let y = top + line.height as i32 / 2 - 1;
                    canvas.hline(area.x + inset, area.right() - inset, y, 2, rgba(darken(palette.surface, 0.35), 255));
                }
                RulesLineKind::Flavor => italic.draw(canvas, x, text_y, &line.text, flavor),
            }
        }
    }

    fn draw_footer(&self, canvas: &mut Canvas, palette: &Palette, card: &Card) {
        let l = &self.layout;
        let text = rgba(palette.header_text, 255);

        if let Some((power, toughness)) = card.stats() {
            let stats = l.stats_box;
            draw_panel(canvas, stats, palette, rgba(palette.surface, 255));
            let (font, label) = fit_single_line(
                &format!("{}/{}", power, toughness),
                self.settings.stats_font_size,
                self.settings.min_rules_font_size,
                self.settings.shrink_step,
                stats.w - 20,
                true,
            );
            let x = stats.x + (stats.w as i32 - font.measure(&label) as i32) / 2;
            let y = stats.y + (stats.h as i32 - font.size as i32) / 2;
            font.draw(canvas, x, y, &label, rgba(palette.body_text, 255));
        }

        let footer = Font::new(self.settings.footer_font_size);
        let max_width = (l.stats_box.x - 16 - l.footer_x).max(1) as u32;
        let (artist_font, artist) = fit_single_line(
            &format!("Illus. {}", card.artist()),
            footer.size,
            self.settings.legal_font_size,
            self.settings.shrink_step,
            max_width,
            false,
        );
        artist_font.draw(canvas, l.footer_x, l.footer_y, &artist, text);

        let set_line = format!("{}  {}", card.set_code(), card.collector_number());
        let set_y = l.footer_y + footer.line_height() as i32 + 4;
        footer.draw(canvas, l.footer_x, set_y, &set_line, text);

        let diamond_x = l.footer_x + footer.measure(&set_line) as i32 + 18;
        let diamond_half = footer.size / 2 - 1;
        canvas.fill_diamond(diamond_x, set_y + footer.size as i32 / 2, diamond_half, rgba(palette.accent, 255));
        footer.draw(canvas, diamond_x + diamond_half as i32 + 8, set_y, palette.faction, text);

        let legal_size = self.settings.legal_font_size;
        let (legal, legal_text) = fit_single_line(
            &self.settings.legal_text,
            legal_size,
            legal_size,
            1,
            l.inner.w - 40,
            false,
        );
        let x = (CARD_WIDTH as i32 - legal.measure(&legal_text) as i32) / 2;
        legal.draw(canvas, x, l.legal_y, &legal_text, rgba(palette.header_text, 190));
    }
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

fn draw_shadow(canvas: &mut Canvas, rect: Rect, radius: u32) {
    canvas.fill_rounded_rect(rect.offset(0, 4), radius, rgba([0, 0, 0], 60));
}

fn draw_panel(canvas: &mut Canvas, rect: Rect, palette: &Palette, fill: Rgba<u8>) {
    let radius = CardLayout::PANEL_RADIUS;
    draw_shadow(canvas, rect, radius);
    canvas.fill_rounded_rect(rect, radius, fill);
    canvas.stroke_rounded_rect(rect, radius, 3, rgba(darken(palette.frame, 0.15), 255));
}

/// Decode, centre-crop to the window's aspect ratio, and Lanczos-resize.
fn cover_art(artwork: Option<&Artwork>, width: u32, height: u32) -> Option<RgbaImage> {
    let artwork = artwork?;
    let decoded = match image::load_from_memory(&artwork.bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            warn!("could not decode artwork, using gradient: {}", e);
            return None;
        }
    };
    let (sw, sh) = decoded.dimensions();
    if sw == 0 || sh == 0 {
        return None;
    }

    let target = width as f64 / height as f64;
    let (cw, ch) = if sw as f64 / sh as f64 > target {
        ((sh as f64 * target).round() as u32, sh)
    } else {
        (sw, (sw as f64 / target).round() as u32)
    };
    let (cw, ch) = (cw.clamp(1, sw), ch.clamp(1, sh));
    let cropped = imageops::crop_imm(&decoded, (sw - cw) / 2, (sh - ch) / 2, cw, ch).to_image();
    Some(imageops::resize(&cropped, width, height, FilterType::Lanczos3))
}
