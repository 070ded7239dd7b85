//! Card Model - drafts are mutable, validated cards are not

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::color::{Color, ColorIdentity};
use crate::validation::{ValidationError, Validator};

/// Generic mana plus colored pips keyed by color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    #[serde(default)]
    pub colored: BTreeMap<Color, u32>,
}

impl ManaCost {
    pub fn new(generic: u32, colored: impl IntoIterator<Item = (Color, u32)>) -> Self {
        let colored = colored.into_iter().filter(|(_, n)| *n > 0).collect();
        Self { generic, colored }
    }

    pub fn generic_only(generic: u32) -> Self {
        Self {
            generic,
            colored: BTreeMap::new(),
        }
    }

    /// Converted mana value.
    pub fn mana_value(&self) -> u32 {
        self.generic.saturating_add(self.colored_pips())
    }

    pub fn colored_pips(&self) -> u32 {
        self.colored.values().fold(0, |sum, n| sum.saturating_add(*n))
    }

    pub fn pips_of(&self, color: Color) -> u32 {
        self.colored.get(&color).copied().unwrap_or(0)
    }

    /// Colors with at least one pip, canonical order.
    pub fn pip_colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.colored
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(c, _)| *c)
    }

    /// Individual symbols: generic numeral first (omitted when zero unless the
    /// whole cost is zero), then one entry per colored pip.
    pub fn symbol_list(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        if self.generic > 0 || self.colored_pips() == 0 {
            symbols.push(self.generic.to_string());
        }
        for (color, count) in &self.colored {
            for _ in 0..*count {
                symbols.push(color.symbol().to_string());
            }
        }
        symbols
    }

    /// `{2}{R}{R}` form; `{0}` for a zero cost.
    pub fn symbols(&self) -> String {
        self.symbol_list()
            .iter()
            .map(|s| format!("{{{}}}", s))
            .collect()
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbols())
    }
}

/// Where a card's art came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtSource {
    Placeholder,
    Provider(String),
}

/// Encoded artwork bytes (any format the image backend decodes).
#[derive(Clone, PartialEq, Eq)]
pub struct Artwork {
    pub bytes: Vec<u8>,
    pub source: ArtSource,
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("source", &self.source)
            .finish()
    }
}

/// Unvalidated card attributes. Build one, then call [`CardDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDraft {
    pub name: String,
    pub color_identity: ColorIdentity,
    pub mana_cost: ManaCost,
    pub type_line: String,
    pub abilities: Vec<String>,
    pub power: Option<u32>,
    pub toughness: Option<u32>,
    pub flavor_text: String,
    pub artist: String,
    pub set_code: String,
    pub collector_number: String,
    pub artwork: Option<Artwork>,
}

impl CardDraft {
    pub fn is_creature(&self) -> bool {
        is_creature_type(&self.type_line)
    }

    /// Run every validation rule; errors reject the draft, warnings are logged.
    pub fn validate(self) -> Result<Card, ValidationError> {
        Validator::new().check(&self)?;
        Ok(Card { inner: self })
    }
}

pub(crate) fn is_creature_type(type_line: &str) -> bool {
    type_line.contains("Creature")
}

/// A card that passed validation. Read-only; use [`Card::to_draft`] to
/// derive a changed copy, which must be validated again.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    inner: CardDraft,
}

impl Card {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn color_identity(&self) -> &ColorIdentity {
        &self.inner.color_identity
    }

    pub fn mana_cost(&self) -> &ManaCost {
        &self.inner.mana_cost
    }

    pub fn type_line(&self) -> &str {
        &self.inner.type_line
    }

    pub fn abilities(&self) -> &[String] {
        &self.inner.abilities
    }

    pub fn power(&self) -> Option<u32> {
        self.inner.power
    }

    pub fn toughness(&self) -> Option<u32> {
        self.inner.toughness
    }

    /// Both stats, present only for creatures.
    pub fn stats(&self) -> Option<(u32, u32)> {
        self.inner.power.zip(self.inner.toughness)
    }

    pub fn flavor_text(&self) -> &str {
        &self.inner.flavor_text
    }

    pub fn artist(&self) -> &str {
        &self.inner.artist
    }

    pub fn set_code(&self) -> &str {
        &self.inner.set_code
    }

    pub fn collector_number(&self) -> &str {
        &self.inner.collector_number
    }

    pub fn artwork(&self) -> Option<&Artwork> {
        self.inner.artwork.as_ref()
    }

    pub fn is_creature(&self) -> bool {
        self.inner.is_creature()
    }

    pub fn to_draft(&self) -> CardDraft {
        self.inner.clone()
    }

    /// `Name [Colors] Type P/T :: ability; ability`
    pub fn describe(&self) -> String {
        let pt = match self.stats() {
            Some((p, t)) => format!("{}/{}", p, t),
            None => String::new(),
        };
        format!(
            "{} [{}] {} {} :: {}",
            self.name(),
            self.color_identity().display_names().join(","),
            self.type_line(),
            pt,
            self.abilities().join("; ")
        )
    }

    /// Textual and mechanical attributes; art bytes are deliberately absent.
    pub fn record(&self) -> CardRecord<'_> {
        CardRecord {
            name: self.name(),
            color_identity: self.color_identity(),
            mana_cost: self.mana_cost(),
            type_line: self.type_line(),
            abilities: self.abilities(),
            power: self.power(),
            toughness: self.toughness(),
            flavor_text: self.flavor_text(),
            artist: self.artist(),
            set_code: self.set_code(),
            collector_number: self.collector_number(),
        }
    }
}

/// Serializable view of a [`Card`] used for fingerprints and reports.
#[derive(Debug, Clone, Serialize)]
pub struct CardRecord<'a> {
    pub name: &'a str,
    pub color_identity: &'a ColorIdentity,
    pub mana_cost: &'a ManaCost,
    pub type_line: &'a str,
    pub abilities: &'a [String],
    pub power: Option<u32>,
    pub toughness: Option<u32>,
    pub flavor_text: &'a str,
    pub artist: &'a str,
    pub set_code: &'a str,
    pub collector_number: &'a str,
}
