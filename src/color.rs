//! Color Identity - canonical WUBRG(C) ordering and normalization

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single color symbol.
///
/// Declaration order is the canonical order (W, U, B, R, G, C); the derived
/// `Ord` is what every sorted view of an identity relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "C")]
    Colorless,
}

impl Color {
    /// The five colored symbols in canonical order.
    pub const COLORED: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Colorless => 'C',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            'C' => Some(Color::Colorless),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Blue => "Blue",
            Color::Black => "Black",
            Color::Red => "Red",
            Color::Green => "Green",
            Color::Colorless => "Colorless",
        }
    }

    pub fn is_colored(self) -> bool {
        self != Color::Colorless
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color symbol '{0}'")]
pub struct UnknownColor(pub char);

/// Normalized set of colors a card belongs to.
///
/// Colorless is present only when no colored symbol is, and an identity is
/// never empty: normalizing an empty input yields `{C}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Color>", from = "Vec<Color>")]
pub struct ColorIdentity {
    colors: BTreeSet<Color>,
}

impl ColorIdentity {
    pub fn new(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut colors: BTreeSet<Color> = colors.into_iter().collect();
        if colors.iter().any(|c| c.is_colored()) {
            colors.remove(&Color::Colorless);
        }
        if colors.is_empty() {
            colors.insert(Color::Colorless);
        }
        Self { colors }
    }

    pub fn colorless() -> Self {
        Self::new([Color::Colorless])
    }

    /// Colors in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.colors.iter().copied()
    }

    /// Colored symbols only, canonical order. Empty for a colorless identity.
    pub fn colored(&self) -> Vec<Color> {
        self.iter().filter(|c| c.is_colored()).collect()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn is_colorless(&self) -> bool {
        !self.colors.iter().any(|c| c.is_colored())
    }

    pub fn is_multicolor(&self) -> bool {
        self.colored().len() > 1
    }

    /// First color in canonical order; drives palette and name-pool lookup.
    pub fn primary(&self) -> Option<Color> {
        self.colors.iter().next().copied()
    }

    /// True when the set obeys the colorless-only-alone rule and is non-empty.
    pub fn is_normalized(&self) -> bool {
        !self.colors.is_empty()
            && (!self.colors.contains(&Color::Colorless) || self.colors.len() == 1)
    }

    pub fn display_names(&self) -> Vec<&'static str> {
        self.iter().map(Color::display_name).collect()
    }
}

impl Default for ColorIdentity {
    fn default() -> Self {
        Self::colorless()
    }
}

impl FromIterator<Color> for ColorIdentity {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Color>> for ColorIdentity {
    fn from(colors: Vec<Color>) -> Self {
        Self::new(colors)
    }
}

impl From<ColorIdentity> for Vec<Color> {
    fn from(identity: ColorIdentity) -> Self {
        identity.colors.into_iter().collect()
    }
}

impl FromStr for ColorIdentity {
    type Err = UnknownColor;

    /// Parses a symbol string such as `"WU"` or `"c"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colors = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Color::from_symbol(c).ok_or(UnknownColor(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(colors))
    }
}

impl fmt::Display for ColorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in self.iter() {
            write!(f, "{}", color.symbol())?;
        }
        Ok(())
    }
}
