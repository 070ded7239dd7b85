//! Mana/Balance Calculator
//!
//! Pure functions mapping stats and abilities to a mana cost. The valuation
//! table below is the single source of truth for what an ability is worth;
//! valuations add, they never multiply.

use serde::{Deserialize, Serialize};

use crate::card::ManaCost;
use crate::color::ColorIdentity;

/// Ability classes with a fixed valuation, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityClass {
    CounterSpell,
    Destroy,
    CardDraw,
    DirectDamage,
    TokenGeneration,
    EvasiveKeyword,
    Keyword,
    Custom,
}

/// Phrase patterns per effect class; matched case-insensitively as substrings.
const EFFECT_PATTERNS: &[(AbilityClass, &[&str])] = &[
    (AbilityClass::CounterSpell, &["counter target"]),
    (AbilityClass::Destroy, &["destroy target", "destroy all", "destroy each"]),
    (AbilityClass::CardDraw, &["draw a card", "draw two cards", "draw three cards"]),
    (AbilityClass::DirectDamage, &["damage to"]),
    (AbilityClass::TokenGeneration, &["token"]),
];

/// Keyword abilities; the whole ability must equal one of these.
const EVASIVE_KEYWORDS: &[&str] = &["flying", "trample", "deathtouch", "hexproof", "menace", "indestructible"];
const KEYWORDS: &[&str] = &[
    "vigilance",
    "lifelink",
    "haste",
    "reach",
    "first strike",
    "defender",
    "flash",
    "ward 1",
];

impl AbilityClass {
    pub fn classify(ability: &str) -> Self {
        let text = ability.trim().to_lowercase();

        for (class, patterns) in EFFECT_PATTERNS {
            if patterns.iter().any(|p| text.contains(p)) {
                return *class;
            }
        }
        if EVASIVE_KEYWORDS.contains(&text.as_str()) {
            return AbilityClass::EvasiveKeyword;
        }
        if KEYWORDS.contains(&text.as_str()) {
            return AbilityClass::Keyword;
        }
        AbilityClass::Custom
    }

    /// Flat mana increment; `Custom` uses the configured default.
    pub fn valuation(self, custom_default: u32) -> u32 {
        match self {
            AbilityClass::CounterSpell | AbilityClass::Destroy => 3,
            AbilityClass::CardDraw
            | AbilityClass::DirectDamage
            | AbilityClass::TokenGeneration
            | AbilityClass::EvasiveKeyword => 2,
            AbilityClass::Keyword => 1,
            AbilityClass::Custom => custom_default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceConfig {
    /// Upper bound on colored pips in a generated cost.
    #[serde(default = "default_max_colored_pips")]
    pub max_colored_pips: u32,
    /// Valuation for abilities the table does not recognise.
    #[serde(default = "default_custom_valuation")]
    pub custom_valuation: u32,
}

fn default_max_colored_pips() -> u32 { 2 }
fn default_custom_valuation() -> u32 { 1 }

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_colored_pips: default_max_colored_pips(),
            custom_valuation: default_custom_valuation(),
        }
    }
}

pub fn ability_valuation(ability: &str, config: &BalanceConfig) -> u32 {
    AbilityClass::classify(ability).valuation(config.custom_valuation)
}

/// `ceil((power + toughness) / 2)` when both stats exist, else 0.
/// Computed in `u64`, so any pair of `u32` stats is exact.
pub fn stat_value(power: Option<u32>, toughness: Option<u32>) -> u32 {
    match (power, toughness) {
        (Some(p), Some(t)) => (u64::from(p) + u64::from(t)).div_ceil(2) as u32,
        _ => 0,
    }
}

/// Total mana value before the pip split.
pub fn mana_value(
    power: Option<u32>,
    toughness: Option<u32>,
    abilities: &[String],
    config: &BalanceConfig,
) -> u32 {
    let total = abilities
        .iter()
        .map(|a| ability_valuation(a, config))
        .fold(stat_value(power, toughness), u32::saturating_add);

    let has_stats = power.unwrap_or(0) > 0 || toughness.unwrap_or(0) > 0;
    if !abilities.is_empty() || has_stats {
        total.max(1)
    } else {
        total
    }
}

/// Split `total` into colored pips and generic mana.
///
/// The pip budget is one per colored symbol in the identity, capped by
/// `max_colored_pips` and by the total itself. Pips are dealt round-robin in
/// canonical order so earlier colors win ties. Colorless identities pay
/// everything as generic.
pub fn split_cost(total: u32, identity: &ColorIdentity, config: &BalanceConfig) -> ManaCost {
    let colors = identity.colored();
    if colors.is_empty() {
        return ManaCost::generic_only(total);
    }

    let budget = total
        .min(colors.len() as u32)
        .min(config.max_colored_pips);

    let mut counts = vec![0u32; colors.len()];
    for i in 0..budget as usize {
        counts[i % colors.len()] += 1;
    }

    ManaCost::new(total - budget, colors.into_iter().zip(counts))
}

/// Compute the full mana cost of a card. Deterministic and side-effect free.
pub fn compute_mana_cost(
    power: Option<u32>,
    toughness: Option<u32>,
    abilities: &[String],
    identity: &ColorIdentity,
    config: &BalanceConfig,
) -> ManaCost {
    split_cost(mana_value(power, toughness, abilities, config), identity, config)
}
