//! Mana symbol gems drawn in the header.

use crate::card::ManaCost;
use crate::palette::{darken, mana_symbol_colors, rgba};

use super::canvas::Canvas;
use super::font::Font;

const GEM_GAP: u32 = 6;
const GLYPH_COLOR: [u8; 3] = [34, 30, 38];

/// Width of a gem row for `count` symbols.
pub fn cost_width(count: usize, diameter: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    count as u32 * diameter + (count as u32 - 1) * GEM_GAP
}

/// One gem centred on (cx, cy): dark rim, colored fill, highlight ring, drop-shadowed glyph.
pub fn draw_gem(canvas: &mut Canvas, cx: i32, cy: i32, diameter: u32, symbol: &str) {
    let radius = diameter / 2;
    let (fill, highlight) = mana_symbol_colors(symbol);

    canvas.fill_circle(cx + 2, cy + 2, radius, rgba([0, 0, 0], 90));
    canvas.fill_circle(cx, cy, radius, rgba(darken(fill, 0.55), 255));
    canvas.fill_circle(cx, cy, radius.saturating_sub(2), rgba(fill, 255));
    canvas.stroke_circle(cx, cy, radius * 4 / 5, 2, rgba(highlight, 170));

    let font = Font::bold((diameter * 3 / 5).max(6));
    let width = font.measure(symbol) as i32;
    let x = cx - width / 2;
    let y = cy - font.size as i32 / 2;
    font.draw(canvas, x + 1, y + 1, symbol, rgba([255, 255, 255], 120));
    font.draw(canvas, x, y, symbol, rgba(GLYPH_COLOR, 255));
}

/// Right-aligned gem row ending at `right`; returns the row's left edge.
pub fn draw_mana_cost(canvas: &mut Canvas, right: i32, cy: i32, cost: &ManaCost, diameter: u32) -> i32 {
    let symbols = cost.symbol_list();
    let left = right - cost_width(symbols.len(), diameter) as i32;
    let radius = (diameter / 2) as i32;
    for (i, symbol) in symbols.iter().enumerate() {
        let cx = left + i as i32 * (diameter + GEM_GAP) as i32 + radius;
        draw_gem(canvas, cx, cy, diameter, symbol);
    }
    left
}
