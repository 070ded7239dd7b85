//! Card geometry and text fitting.

use crate::config::RenderSettings;

use super::canvas::Rect;
use super::font::Font;
use super::wrap::wrap_text;

pub const CARD_WIDTH: u32 = 750;
pub const CARD_HEIGHT: u32 = 1050;

const ELLIPSIS: &str = "...";

/// Fixed regions of a 750x1050 card. Panels never overlap except the stats
/// box, which sits over the rules box's bottom-right corner.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    pub frame: Rect,
    pub inner: Rect,
    pub header: Rect,
    pub art: Rect,
    pub type_bar: Rect,
    pub rules: Rect,
    pub stats_box: Rect,
    pub footer_x: i32,
    pub footer_y: i32,
    pub legal_y: i32,
}

impl CardLayout {
    pub const FRAME_RADIUS: u32 = 36;
    pub const INNER_RADIUS: u32 = 26;
    pub const PANEL_RADIUS: u32 = 16;
    pub const RULES_PADDING: u32 = 18;

    pub fn standard() -> Self {
        let frame = Rect::new(0, 0, CARD_WIDTH, CARD_HEIGHT);
        Self {
            frame,
            inner: frame.inset(14),
            header: Rect::new(40, 36, 670, 76),
            art: Rect::new(52, 124, 646, 444),
            type_bar: Rect::new(40, 580, 670, 56),
            rules: Rect::new(40, 648, 670, 288),
            stats_box: Rect::new(570, 904, 140, 60),
            footer_x: 56,
            footer_y: 952,
            legal_y: 1006,
        }
    }

    /// Text area inside the rules box.
    pub fn rules_text_area(&self) -> Rect {
        self.rules.inset(Self::RULES_PADDING)
    }

    /// Usable rules height; creature text stops above the stats box.
    pub fn rules_text_height(&self, has_stats: bool) -> u32 {
        let area = self.rules_text_area();
        if has_stats {
            (self.stats_box.y - 6 - area.y).max(0) as u32
        } else {
            area.h
        }
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Largest font from `max` down to `min` (by `step`) that fits `text` in
/// `width`; at `min` the text is truncated with an ellipsis.
pub fn fit_single_line(text: &str, max: u32, min: u32, step: u32, width: u32, bold: bool) -> (Font, String) {
    let make = |size| if bold { Font::bold(size) } else { Font::new(size) };
    let min = min.clamp(1, max.max(1));
    let mut size = max.max(min);
    loop {
        let font = make(size);
        if font.measure(text) <= width {
            return (font, text.to_string());
        }
        if size <= min {
            return (font, truncate_to_width(text, &font, width));
        }
        size = size.saturating_sub(step.max(1)).max(min);
    }
}

fn truncate_to_width(text: &str, font: &Font, width: u32) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{}", chars.iter().collect::<String>().trim_end(), ELLIPSIS);
        if font.measure(&candidate) <= width {
            return candidate;
        }
    }
    String::new()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesLineKind {
    Ability,
    Separator,
    Flavor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesLine {
    pub kind: RulesLineKind,
    pub text: String,
    /// First line of a bulleted ability.
    pub bullet: bool,
    pub x_offset: u32,
    pub y_offset: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesLayout {
    pub font_size: u32,
    pub lines: Vec<RulesLine>,
    pub height: u32,
    /// Text still did not fit at the smallest size; trailing lines were dropped.
    pub overflow: bool,
}

/// Lay out abilities and flavor text in a `width` x `height` box.
///
/// Starts at the configured rules size and shrinks by `shrink_step` until the
/// text fits, the minimum size is reached, or `max_shrink_attempts` runs out.
/// Every returned line fits inside the box.
pub fn layout_rules_text(
    abilities: &[String],
    flavor: &str,
    width: u32,
    height: u32,
    settings: &RenderSettings,
) -> RulesLayout {
    let min = settings.min_rules_font_size.clamp(1, settings.rules_font_size.max(1));
    let step = settings.shrink_step.max(1);
    let mut size = settings.rules_font_size.max(min);
    let mut attempts = 0;

    loop {
        let (mut lines, total) = build_rules_lines(abilities, flavor, width, size);
        if total <= height {
            return RulesLayout {
                font_size: size,
                lines,
                height: total,
                overflow: false,
            };
        }
        if attempts >= settings.max_shrink_attempts || size <= min {
            lines.retain(|line| line.y_offset + line.height <= height);
            // A separator with nothing under it is noise.
            if lines.last().map(|l| l.kind) == Some(RulesLineKind::Separator) {
                lines.pop();
            }
            let used = lines.last().map_or(0, |l| l.y_offset + l.height);
            return RulesLayout {
                font_size: size,
                lines,
                height: used,
                overflow: true,
            };
        }
        size = size.saturating_sub(step).max(min);
        attempts += 1;
    }
}

fn build_rules_lines(abilities: &[String], flavor: &str, width: u32, size: u32) -> (Vec<RulesLine>, u32) {
    let font = Font::new(size);
    let italic = Font::italic(size);
    let line_height = font.line_height();
    let bullets = abilities.len() > 1;
    let indent = if bullets { size.min(width / 4) } else { 0 };

    let mut lines = Vec::new();
    let mut y = 0;
    for (i, ability) in abilities.iter().enumerate() {
        if i > 0 {
            y += line_height / 3;
        }
        for (j, text) in wrap_text(ability, &font, width - indent).into_iter().enumerate() {
            lines.push(RulesLine {
                kind: RulesLineKind::Ability,
                text,
                bullet: bullets && j == 0,
                x_offset: indent,
                y_offset: y,
                height: line_height,
            });
            y += line_height;
        }
    }

    let flavor = flavor.trim();
    if !flavor.is_empty() {
        if !lines.is_empty() {
            let separator = line_height * 2 / 3;
            lines.push(RulesLine {
                kind: RulesLineKind::Separator,
                text: String::new(),
                bullet: false,
                x_offset: 0,
                y_offset: y,
                height: separator,
            });
            y += separator;
        }
        for text in wrap_text(flavor, &italic, width) {
            lines.push(RulesLine {
                kind: RulesLineKind::Flavor,
                text,
                bullet: false,
                x_offset: 0,
                y_offset: y,
                height: line_height,
            });
            y += line_height;
        }
    }
    (lines, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abilities(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_text_keeps_full_size() {
        let settings = RenderSettings::default();
        let layout = layout_rules_text(&abilities(&["Flying"]), "", 600, 200, &settings);
        assert_eq!(layout.font_size, settings.rules_font_size);
        assert!(!layout.overflow);
        assert_eq!(layout.lines.len(), 1);
        assert!(!layout.lines[0].bullet);
    }

    #[test]
    fn test_multiple_abilities_are_bulleted() {
        let layout = layout_rules_text(
            &abilities(&["Flying", "Vigilance"]),
            "The sky remembers.",
            600,
            240,
            &RenderSettings::default(),
        );
        let kinds: Vec<_> = layout.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RulesLineKind::Ability,
                RulesLineKind::Ability,
                RulesLineKind::Separator,
                RulesLineKind::Flavor
            ]
        );
        assert!(layout.lines[0].bullet && layout.lines[1].bullet);
        assert!(layout.lines[0].x_offset > 0);
    }

    #[test]
    fn test_long_text_shrinks() {
        let settings = RenderSettings::default();
        let long = "When this creature enters the battlefield, each opponent discards a card and loses 2 life.";
        let layout = layout_rules_text(&abilities(&[long, long, long]), long, 600, 220, &settings);
        assert!(layout.font_size < settings.rules_font_size);
        assert!(layout.font_size >= settings.min_rules_font_size);
    }

    #[test]
    fn test_overflow_drops_lines_that_do_not_fit() {
        let settings = RenderSettings::default();
        let long = "Destroy target creature. Its controller loses life equal to its toughness.".repeat(6);
        let layout = layout_rules_text(&abilities(&[&long]), &long, 300, 80, &settings);
        assert!(layout.overflow);
        assert!(layout.lines.iter().all(|l| l.y_offset + l.height <= 80));
        assert!(layout.height <= 80);
    }

    #[test]
    fn test_shrink_attempts_are_bounded() {
        let settings = RenderSettings {
            rules_font_size: 40,
            min_rules_font_size: 8,
            shrink_step: 2,
            max_shrink_attempts: 3,
            ..RenderSettings::default()
        };
        let long = "Counter target spell unless its controller pays 3.".repeat(10);
        let layout = layout_rules_text(&abilities(&[&long]), "", 300, 60, &settings);
        assert_eq!(layout.font_size, 34);
        assert!(layout.overflow);
    }

    #[test]
    fn test_fit_single_line_shrinks_then_truncates() {
        let (font, text) = fit_single_line("Grim Warden", 40, 20, 2, 2000, true);
        assert_eq!(font.size, 40);
        assert_eq!(text, "Grim Warden");

        let name = "Ancient Whispering Mountain Colossus of the Eternal Dawn";
        let (font, text) = fit_single_line(name, 40, 20, 2, 300, true);
        assert_eq!(font.size, 20);
        assert!(text.ends_with("..."));
        assert!(font.measure(&text) <= 300);
    }

    #[test]
    fn test_rules_height_respects_stats_box() {
        let layout = CardLayout::standard();
        let area = layout.rules_text_area();
        assert!(layout.rules_text_height(true) < layout.rules_text_height(false));
        assert!(area.y + layout.rules_text_height(true) as i32 <= layout.stats_box.y);
        assert!(layout.rules.intersects(&layout.stats_box));
        assert!(layout.frame.contains_rect(&layout.stats_box));
    }
}
