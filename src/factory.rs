//! Card Factory - seed + overrides in, validated card out
//!
//! All randomness comes from one `CardRng` seeded by the caller. Draws happen
//! in a fixed order: colors, type line, abilities, stats, name. Overridden
//! fields skip their draw. Changing this order changes every card a given
//! seed produces.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balance::{compute_mana_cost, BalanceConfig};
use crate::card::{is_creature_type, Artwork, Card, CardDraft};
use crate::color::{Color, ColorIdentity};
use crate::config::GenerationConfig;
use crate::pools;
use crate::provider::{artist_credit, ArtTextProvider, FlavorRequest, PlaceholderProvider};
use crate::rng::CardRng;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generated card for seed {seed} failed validation: {source}")]
    InvalidCard {
        seed: u64,
        #[source]
        source: ValidationError,
    },
}

/// Fields a caller may pin; everything left `None` is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOverrides {
    pub name: Option<String>,
    pub color_identity: Option<ColorIdentity>,
    pub type_line: Option<String>,
    pub abilities: Option<Vec<String>>,
    pub power: Option<u32>,
    pub toughness: Option<u32>,
    /// Theme for the art prompt; never part of the card itself.
    pub concept: Option<String>,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
}

pub struct CardFactory {
    config: GenerationConfig,
    balance: BalanceConfig,
    provider: Box<dyn ArtTextProvider>,
}

impl CardFactory {
    pub fn new(config: GenerationConfig, balance: BalanceConfig, provider: Box<dyn ArtTextProvider>) -> Self {
        Self {
            config,
            balance,
            provider,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn create_card(&self, seed: u64, overrides: &CardOverrides) -> Result<Card, GenerationError> {
        let mut rng = CardRng::new(seed);

        let color_identity = match &overrides.color_identity {
            Some(identity) => ColorIdentity::new(identity.iter()),
            None => self.draw_color_identity(&mut rng),
        };

        let type_line = match &overrides.type_line {
            Some(type_line) => type_line.trim().to_string(),
            None => self.draw_type_line(&color_identity, &mut rng),
        };
        let creature = is_creature_type(&type_line);

        let abilities = match &overrides.abilities {
            Some(abilities) => abilities.clone(),
            None => self.draw_abilities(&color_identity, creature, &mut rng),
        };

        // Non-creature overrides pass through so validation can reject them.
        let (power, toughness) = if creature {
            let power = match overrides.power {
                Some(p) => p,
                None => rng.gen_inclusive(self.config.stat_min, self.config.stat_max),
            };
            let toughness = match overrides.toughness {
                Some(t) => t,
                None => rng.gen_inclusive(self.config.stat_min, self.config.stat_max),
            };
            (Some(power), Some(toughness))
        } else {
            (overrides.power, overrides.toughness)
        };

        let mana_cost = compute_mana_cost(power, toughness, &abilities, &color_identity, &self.balance);

        let name = match &overrides.name {
            Some(name) => name.trim().to_string(),
            None => self.draw_name(&color_identity, &type_line, &mut rng),
        };
        debug!(
            "seed {}: {} [{}] {} {} abilities={}",
            seed,
            name,
            color_identity,
            type_line,
            mana_cost,
            abilities.len()
        );

        let prompt = art_prompt(overrides.concept.as_deref(), &name, &type_line, &color_identity);
        let artwork = self.request_art(&prompt, seed);

        let flavor_text = self.request_flavor_text(&FlavorRequest {
            name: &name,
            type_line: &type_line,
            colors: &color_identity,
            abilities: &abilities,
        });

        let artist = artwork
            .as_ref()
            .map(|art| artist_credit(&art.source))
            .unwrap_or_else(|| crate::provider::PLACEHOLDER_ARTIST.to_string());

        let draft = CardDraft {
            name,
            color_identity,
            mana_cost,
            type_line,
            abilities,
            power,
            toughness,
            flavor_text,
            artist,
            set_code: overrides
                .set_code
                .clone()
                .unwrap_or_else(|| self.config.set_code.clone()),
            collector_number: overrides
                .collector_number
                .clone()
                .unwrap_or_else(|| format!("{:03}", seed % 1000)),
            artwork,
        };

        draft
            .validate()
            .map_err(|source| GenerationError::InvalidCard { seed, source })
    }

    fn draw_color_identity(&self, rng: &mut CardRng) -> ColorIdentity {
        let count = rng
            .choose_weighted(&self.config.color_count_weights)
            .map_or(1, |index| index + 1)
            .min(Color::COLORED.len());
        ColorIdentity::new(rng.sample(&Color::COLORED, count))
    }

    fn draw_type_line(&self, identity: &ColorIdentity, rng: &mut CardRng) -> String {
        if !rng.gen_bool(self.config.creature_chance) {
            return rng
                .choose(pools::NON_CREATURE_TYPES)
                .copied()
                .unwrap_or("Sorcery")
                .to_string();
        }

        if identity.is_colorless() {
            let subtype = rng.choose(pools::ARTIFACT_CREATURE_TYPES).copied().unwrap_or("Construct");
            return format!("Artifact Creature \u{2014} {}", subtype);
        }

        let (race, class) = rng.choose(pools::CREATURE_TYPES).copied().unwrap_or(("Human", ""));
        if class.is_empty() {
            format!("Creature \u{2014} {}", race)
        } else {
            format!("Creature \u{2014} {} {}", race, class)
        }
    }

    fn draw_abilities(&self, identity: &ColorIdentity, creature: bool, rng: &mut CardRng) -> Vec<String> {
        let pool = pools::merged_abilities(identity.iter(), creature);
        let min = if creature {
            self.config.ability_count_min
        } else {
            self.config.ability_count_min.max(1)
        };
        let max = self.config.ability_count_max.max(min);
        let count = rng.gen_inclusive(min, max) as usize;
        rng.sample(&pool, count).into_iter().map(str::to_string).collect()
    }

    fn draw_name(&self, identity: &ColorIdentity, type_line: &str, rng: &mut CardRng) -> String {
        let color = identity.primary().unwrap_or(Color::Colorless);
        let prefix = rng.choose(pools::name_prefixes(color)).copied().unwrap_or("Nameless");

        let suffixes = if is_creature_type(type_line) {
            pools::CREATURE_SUFFIXES
        } else if type_line.contains("Instant") || type_line.contains("Sorcery") {
            pools::SPELL_SUFFIXES
        } else {
            pools::PERMANENT_SUFFIXES
        };
        let suffix = rng.choose(suffixes).copied().unwrap_or("Relic");

        format!("{} {}", prefix, suffix)
    }

    /// Provider art, then placeholder art, then none (renderer draws a gradient).
    fn request_art(&self, prompt: &str, seed: u64) -> Option<Artwork> {
        match self.provider.request_art(prompt, seed) {
            Ok(art) => Some(art),
            Err(e) => {
                warn!("{} art failed for seed {}, using placeholder: {}", self.provider.name(), seed, e);
                PlaceholderProvider
                    .request_art(prompt, seed)
                    .map_err(|e| warn!("placeholder art failed for seed {}: {}", seed, e))
                    .ok()
            }
        }
    }

    fn request_flavor_text(&self, request: &FlavorRequest<'_>) -> String {
        self.provider.request_flavor_text(request).unwrap_or_else(|e| {
            warn!("{} flavor text failed for {}, using template: {}", self.provider.name(), request.name, e);
            PlaceholderProvider::template_flavor_text(request)
        })
    }
}

impl Default for CardFactory {
    fn default() -> Self {
        Self::new(
            GenerationConfig::default(),
            BalanceConfig::default(),
            Box::new(PlaceholderProvider),
        )
    }
}

/// Art prompt from concept (or name), type line and colors.
pub fn art_prompt(concept: Option<&str>, name: &str, type_line: &str, identity: &ColorIdentity) -> String {
    let subject = concept.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(name);
    format!(
        "{}, {} fantasy trading card illustration, {} color theme, painterly, no text",
        subject,
        type_line,
        identity.display_names().join(" and ")
    )
}
