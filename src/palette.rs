//! Static palette table, looked up by a card's primary color.

use image::Rgba;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::color::{Color, ColorIdentity};

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub faction: &'static str,
    /// Frame fill, gradient top.
    pub base: Rgb,
    /// Frame fill, gradient bottom.
    pub base_dark: Rgb,
    pub accent: Rgb,
    /// Text panels (type bar, rules box, footer).
    pub surface: Rgb,
    /// Outer border and panel outlines.
    pub frame: Rgb,
    /// Name and stats over the frame gradient.
    pub header_text: Rgb,
    pub body_text: Rgb,
}

pub const RADIANT: Palette = Palette {
    faction: "Radiant",
    base: [234, 206, 138],
    base_dark: [176, 130, 60],
    accent: [242, 220, 170],
    surface: [248, 242, 228],
    frame: [170, 138, 88],
    header_text: [74, 50, 26],
    body_text: [60, 42, 24],
};

pub const FROST: Palette = Palette {
    faction: "Frost",
    base: [100, 160, 198],
    base_dark: [32, 72, 120],
    accent: [168, 210, 240],
    surface: [232, 238, 246],
    frame: [70, 92, 126],
    header_text: [240, 249, 255],
    body_text: [26, 40, 56],
};

pub const VOID: Palette = Palette {
    faction: "Void",
    base: [132, 92, 168],
    base_dark: [52, 32, 96],
    accent: [192, 156, 228],
    surface: [236, 230, 244],
    frame: [84, 62, 112],
    header_text: [246, 242, 255],
    body_text: [38, 24, 52],
};

pub const EMBER: Palette = Palette {
    faction: "Ember",
    base: [214, 105, 64],
    base_dark: [129, 45, 26],
    accent: [255, 184, 120],
    surface: [244, 232, 220],
    frame: [126, 82, 54],
    header_text: [255, 245, 232],
    body_text: [44, 28, 20],
};

pub const VERDANT: Palette = Palette {
    faction: "Verdant",
    base: [130, 176, 92],
    base_dark: [46, 94, 52],
    accent: [176, 220, 152],
    surface: [234, 242, 230],
    frame: [72, 108, 66],
    header_text: [246, 254, 240],
    body_text: [26, 46, 28],
};

pub const MACHINE: Palette = Palette {
    faction: "Machine",
    base: [164, 172, 182],
    base_dark: [86, 92, 104],
    accent: [210, 216, 222],
    surface: [236, 238, 240],
    frame: [112, 116, 124],
    header_text: [240, 243, 246],
    body_text: [36, 38, 44],
};

pub const NEUTRAL: Palette = Palette {
    faction: "Neutral",
    base: [182, 182, 182],
    base_dark: [110, 110, 110],
    accent: [212, 212, 212],
    surface: [238, 238, 236],
    frame: [120, 120, 120],
    header_text: [245, 245, 245],
    body_text: [40, 40, 40],
};

static PALETTES: Lazy<HashMap<Color, Palette>> = Lazy::new(|| {
    HashMap::from([
        (Color::White, RADIANT),
        (Color::Blue, FROST),
        (Color::Black, VOID),
        (Color::Red, EMBER),
        (Color::Green, VERDANT),
        (Color::Colorless, MACHINE),
    ])
});

pub fn palette_for_color(color: Option<Color>) -> &'static Palette {
    color.and_then(|c| PALETTES.get(&c)).unwrap_or(&NEUTRAL)
}

pub fn palette_for(identity: &ColorIdentity) -> &'static Palette {
    palette_for_color(identity.primary())
}

/// (fill, highlight ring) for a mana symbol; numerals use the generic gray.
pub fn mana_symbol_colors(symbol: &str) -> (Rgb, Rgb) {
    let color = symbol.chars().next().filter(|c| !c.is_ascii_digit()).and_then(Color::from_symbol);
    match color {
        Some(Color::White) => ([248, 242, 220], [255, 255, 255]),
        Some(Color::Blue) => ([50, 150, 220], [120, 200, 255]),
        Some(Color::Black) => ([60, 50, 70], [120, 100, 130]),
        Some(Color::Red) => ([220, 70, 50], [255, 140, 100]),
        Some(Color::Green) => ([80, 160, 90], [140, 210, 140]),
        Some(Color::Colorless) => ([180, 185, 195], [220, 225, 230]),
        None => ([180, 180, 190], [220, 220, 230]),
    }
}

pub fn rgba(color: Rgb, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

pub fn mix(color: Rgb, other: Rgb, ratio: f32) -> Rgb {
    let ratio = ratio.clamp(0.0, 1.0);
    let mut out = [0u8; 3];
    for i in 0..3 {
        let a = color[i] as f32;
        let b = other[i] as f32;
        out[i] = (a + (b - a) * ratio).round() as u8;
    }
    out
}

pub fn lighten(color: Rgb, amount: f32) -> Rgb {
    mix(color, [255, 255, 255], amount)
}

pub fn darken(color: Rgb, amount: f32) -> Rgb {
    mix(color, [0, 0, 0], amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_color_selects_palette() {
        let identity = ColorIdentity::new([Color::Green, Color::Red]);
        assert_eq!(palette_for(&identity).faction, "Ember");
        assert_eq!(palette_for(&ColorIdentity::colorless()).faction, "Machine");
        assert_eq!(palette_for_color(None).faction, "Neutral");
    }

    #[test]
    fn test_generic_symbols_are_gray() {
        assert_eq!(mana_symbol_colors("3"), mana_symbol_colors("12"));
        assert_ne!(mana_symbol_colors("R"), mana_symbol_colors("3"));
    }

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(mix([0, 100, 200], [255, 255, 255], 0.0), [0, 100, 200]);
        assert_eq!(lighten([0, 0, 0], 1.0), [255, 255, 255]);
        assert_eq!(darken([200, 200, 200], 0.5), [100, 100, 100]);
    }
}
