//! Contract Invariant Tests
//!
//! These tests verify the generation and validation guarantees.

use cardforge_core::balance::{mana_value, stat_value};
use cardforge_core::provider::{FallbackProvider, FlavorRequest, PLACEHOLDER_ARTIST};
use cardforge_core::{
    canonical_json, card_fingerprint, compute_mana_cost, ArtSource, ArtTextProvider, Artwork, BalanceConfig,
    CardDraft, CardFactory, CardOverrides, Color, ColorIdentity, GenerationConfig, GenerationError, ManaCost,
    ProviderError,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

fn abilities(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn valid_draft() -> CardDraft {
    CardDraft {
        name: "Ember Raider".into(),
        color_identity: ColorIdentity::new([Color::Red]),
        mana_cost: ManaCost::new(1, [(Color::Red, 1)]),
        type_line: "Creature \u{2014} Goblin Warrior".into(),
        abilities: abilities(&["Haste"]),
        power: Some(2),
        toughness: Some(1),
        flavor_text: "Faster than the smoke.".into(),
        artist: "Test Artist".into(),
        set_code: "CFG".into(),
        collector_number: "001".into(),
        artwork: None,
    }
}

#[test]
fn invariant_same_seed_same_card() {
    let factory = CardFactory::default();
    for seed in [0, 1, 10, 42, 9_999, u64::MAX] {
        let a = factory.create_card(seed, &CardOverrides::default()).unwrap();
        let b = factory.create_card(seed, &CardOverrides::default()).unwrap();
        assert_eq!(a, b, "seed {}", seed);
        assert_eq!(card_fingerprint(&a).unwrap(), card_fingerprint(&b).unwrap());
    }
}

#[test]
fn invariant_independent_factories_agree() {
    let overrides = CardOverrides {
        concept: Some("storm over the sea".into()),
        ..Default::default()
    };
    let a = CardFactory::default().create_card(77, &overrides).unwrap();
    let b = CardFactory::default().create_card(77, &overrides).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invariant_seeds_produce_variety() {
    let factory = CardFactory::default();
    let fingerprints: std::collections::HashSet<_> = (0..20)
        .map(|seed| card_fingerprint(&factory.create_card(seed, &CardOverrides::default()).unwrap()).unwrap())
        .collect();
    assert!(fingerprints.len() > 15);
}

#[test]
fn invariant_generated_cards_hold_contracts() {
    let factory = CardFactory::default();
    for seed in 0..200 {
        let card = factory.create_card(seed, &CardOverrides::default()).unwrap();

        assert_eq!(card.is_creature(), card.stats().is_some(), "seed {}", seed);
        assert_eq!(card.power().is_some(), card.toughness().is_some(), "seed {}", seed);

        let identity = card.color_identity();
        assert!(!identity.is_empty());
        assert!(identity.is_normalized());
        for pip in card.mana_cost().pip_colors() {
            assert!(identity.contains(pip), "seed {}: {} outside {}", seed, pip, identity);
        }

        if let Some((p, t)) = card.stats() {
            assert!((1..=7).contains(&p) && (1..=7).contains(&t), "seed {}", seed);
        } else {
            assert!(!card.abilities().is_empty(), "seed {}: non-creature without abilities", seed);
        }
    }
}

#[test]
fn invariant_cost_follows_formula() {
    let factory = CardFactory::default();
    let config = BalanceConfig::default();
    for seed in 0..100 {
        let card = factory.create_card(seed, &CardOverrides::default()).unwrap();
        let expected = mana_value(card.power(), card.toughness(), card.abilities(), &config);
        assert_eq!(card.mana_cost().mana_value(), expected, "seed {}", seed);
        assert!(card.mana_cost().colored_pips() <= config.max_colored_pips);
    }
}

#[test]
fn invariant_seed_ten_scenario() {
    let card = CardFactory::default().create_card(10, &CardOverrides::default()).unwrap();
    assert!(card.is_creature(), "{}", card.describe());
    assert_eq!(card.color_identity().len(), 1);
    assert!(!card.color_identity().is_colorless());
    let (p, t) = card.stats().unwrap();
    assert!((1..=7).contains(&p) && (1..=7).contains(&t));

    let config = BalanceConfig::default();
    let valuations: u32 = card
        .abilities()
        .iter()
        .map(|a| cardforge_core::balance::ability_valuation(a, &config))
        .sum();
    let expected = (stat_value(card.power(), card.toughness()) + valuations).max(1);
    assert_eq!(card.mana_cost().mana_value(), expected);
    assert_eq!(stat_value(Some(p), Some(t)), (p + t).div_ceil(2));
    assert_eq!(card.mana_cost().colored_pips(), 1);
}

#[test]
fn invariant_extreme_stat_overrides_cost_without_overflow() {
    let overrides = CardOverrides {
        type_line: Some("Creature \u{2014} Elf".into()),
        power: Some(u32::MAX),
        toughness: Some(u32::MAX),
        ..Default::default()
    };
    let card = CardFactory::default().create_card(1, &overrides).unwrap();
    assert_eq!(card.stats(), Some((u32::MAX, u32::MAX)));
    assert_eq!(card.mana_cost().mana_value(), u32::MAX);

    let lopsided = compute_mana_cost(
        Some(u32::MAX),
        Some(1),
        &[],
        &ColorIdentity::new([Color::Red]),
        &BalanceConfig::default(),
    );
    assert_eq!(lopsided.mana_value(), 1 << 31);
    assert_eq!(lopsided.symbols(), format!("{{{}}}{{R}}", (1u32 << 31) - 1));
}

#[test]
fn invariant_red_counter_instant_scenario() {
    let overrides = CardOverrides {
        color_identity: Some(ColorIdentity::new([Color::Red])),
        type_line: Some("Instant".into()),
        abilities: Some(abilities(&["Counter target spell"])),
        ..Default::default()
    };
    let card = CardFactory::default().create_card(5, &overrides).unwrap();

    assert_eq!(card.color_identity().iter().collect::<Vec<_>>(), vec![Color::Red]);
    assert!(!card.is_creature());
    assert_eq!(card.power(), None);
    assert_eq!(card.toughness(), None);
    assert_eq!(card.mana_cost().mana_value(), 3);
    assert_eq!(card.mana_cost().symbols(), "{2}{R}");
    assert_eq!(card.abilities(), ["Counter target spell".to_string()]);
}

#[test]
fn invariant_planeswalker_is_a_statless_non_creature() {
    let overrides = CardOverrides {
        color_identity: Some(ColorIdentity::new([Color::Green])),
        type_line: Some("Planeswalker".into()),
        ..Default::default()
    };
    let card = CardFactory::default().create_card(77, &overrides).unwrap();
    assert!(!card.is_creature());
    assert_eq!(card.stats(), None);
    assert!(!card.abilities().is_empty());
}

#[test]
fn invariant_overrides_are_respected() {
    let overrides = CardOverrides {
        name: Some("Grim Warden".into()),
        color_identity: Some(ColorIdentity::new([Color::Black, Color::White])),
        type_line: Some("Creature \u{2014} Zombie Knight".into()),
        abilities: Some(abilities(&["Deathtouch", "Lifelink"])),
        power: Some(3),
        toughness: Some(4),
        set_code: Some("TST".into()),
        collector_number: Some("007".into()),
        concept: None,
    };
    let card = CardFactory::default().create_card(123, &overrides).unwrap();
    assert_eq!(card.name(), "Grim Warden");
    assert_eq!(card.color_identity().to_string(), "WB");
    assert_eq!(card.stats(), Some((3, 4)));
    assert_eq!(card.set_code(), "TST");
    assert_eq!(card.collector_number(), "007");
    // ceil(7/2) + deathtouch 2 + lifelink 1
    assert_eq!(card.mana_cost().mana_value(), 7);
    assert_eq!(card.mana_cost().symbols(), "{5}{W}{B}");
}

#[test]
fn invariant_colorless_normalization() {
    let identity: ColorIdentity = serde_json::from_str(r#"["C", "R"]"#).unwrap();
    assert_eq!(identity.iter().collect::<Vec<_>>(), vec![Color::Red]);
    let empty: ColorIdentity = serde_json::from_str("[]").unwrap();
    assert!(empty.is_colorless());
}

#[test]
fn invariant_validation_rejects_broken_drafts() {
    let no_stats = CardDraft {
        power: None,
        toughness: None,
        ..valid_draft()
    };
    assert!(no_stats.validate().unwrap_err().has_rule("power_toughness"));

    let stats_on_spell = CardDraft {
        type_line: "Sorcery".into(),
        ..valid_draft()
    };
    assert!(stats_on_spell.validate().unwrap_err().has_rule("power_toughness"));

    let foreign_pip = CardDraft {
        mana_cost: ManaCost::new(1, [(Color::Blue, 1)]),
        ..valid_draft()
    };
    assert!(foreign_pip.validate().unwrap_err().has_rule("mana_colors"));

    let colorless_with_pip = CardDraft {
        color_identity: ColorIdentity::colorless(),
        ..valid_draft()
    };
    assert!(colorless_with_pip.validate().unwrap_err().has_rule("mana_colors"));

    let unnamed = CardDraft {
        name: "   ".into(),
        ..valid_draft()
    };
    assert!(unnamed.validate().unwrap_err().has_rule("name"));

    assert!(valid_draft().validate().is_ok());
}

#[test]
fn invariant_validation_does_not_auto_correct() {
    let draft = CardDraft {
        mana_cost: ManaCost::new(0, [(Color::Blue, 1), (Color::Green, 1)]),
        ..valid_draft()
    };
    let err = draft.validate().unwrap_err();
    assert_eq!(err.violations.iter().filter(|v| v.rule == "mana_colors").count(), 2);
}

#[test]
fn invariant_invalid_overrides_surface_as_errors() {
    let overrides = CardOverrides {
        type_line: Some("Enchantment".into()),
        toughness: Some(3),
        ..Default::default()
    };
    let err = CardFactory::default().create_card(8, &overrides).unwrap_err();
    let GenerationError::InvalidCard { seed, source } = err;
    assert_eq!(seed, 8);
    assert!(source.has_rule("power_toughness"));
}

#[test]
fn invariant_placeholder_path_without_ai() {
    let card = CardFactory::default().create_card(3, &CardOverrides::default()).unwrap();
    let artwork = card.artwork().expect("placeholder art");
    assert_eq!(artwork.source, ArtSource::Placeholder);
    assert_eq!(card.artist(), PLACEHOLDER_ARTIST);
    assert!(!card.flavor_text().trim().is_empty());
    assert!(image::load_from_memory(&artwork.bytes).is_ok());
}

struct CountingFailure {
    calls: Arc<AtomicU32>,
}

impl ArtTextProvider for CountingFailure {
    fn name(&self) -> &str {
        "counting-failure"
    }

    fn request_art(&self, _prompt: &str, _seed: u64) -> Result<Artwork, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Timeout)
    }

    fn request_flavor_text(&self, _request: &FlavorRequest<'_>) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::MissingCredentials("TEST_KEY".into()))
    }
}

#[test]
fn invariant_provider_failures_never_escape_the_factory() {
    let calls = Arc::new(AtomicU32::new(0));
    let factory = CardFactory::new(
        GenerationConfig::default(),
        BalanceConfig::default(),
        Box::new(CountingFailure { calls: calls.clone() }),
    );
    let card = factory.create_card(21, &CardOverrides::default()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(card.artwork().map(|a| &a.source), Some(&ArtSource::Placeholder));

    let placeholder = CardFactory::default().create_card(21, &CardOverrides::default()).unwrap();
    assert_eq!(card, placeholder);
}

#[test]
fn invariant_fallback_wrapper_absorbs_errors() {
    let calls = Arc::new(AtomicU32::new(0));
    let factory = CardFactory::new(
        GenerationConfig::default(),
        BalanceConfig::default(),
        Box::new(FallbackProvider::new(Box::new(CountingFailure { calls: calls.clone() }))),
    );
    let card = factory.create_card(4, &CardOverrides::default()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!card.flavor_text().is_empty());
}

#[test]
fn invariant_fingerprint_ignores_art_bytes() {
    let card = valid_draft().validate().unwrap();
    let mut with_art = card.to_draft();
    with_art.artwork = Some(Artwork {
        bytes: vec![9, 9, 9],
        source: ArtSource::Placeholder,
    });
    let with_art = with_art.validate().unwrap();
    assert_eq!(card_fingerprint(&card).unwrap(), card_fingerprint(&with_art).unwrap());
}

#[test]
fn invariant_canonical_json_deterministic() {
    let a = serde_json::json!({"b": 1, "a": {"d": [3, 1], "c": true}});
    let b = serde_json::json!({"a": {"c": true, "d": [3, 1]}, "b": 1});
    assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_factory_always_validates() {
    use cardforge_core::validation::get_validation_call_count;

    let before = get_validation_call_count();
    CardFactory::default().create_card(1, &CardOverrides::default()).unwrap();
    assert!(get_validation_call_count() > before);
}

const ABILITY_CHOICES: &[&str] = &[
    "Flying",
    "Vigilance",
    "Counter target spell",
    "Destroy target creature",
    "Draw a card",
    "Scry 2",
    "Create a 1/1 Soldier token",
];

proptest! {
    #[test]
    fn prop_mana_value_monotonic_in_stats(
        power in 0u32..15,
        toughness in 0u32..15,
        bump in 1u32..10,
        picks in prop::collection::vec(0usize..ABILITY_CHOICES.len(), 0..4),
    ) {
        let config = BalanceConfig::default();
        let list: Vec<String> = picks.iter().map(|i| ABILITY_CHOICES[*i].to_string()).collect();
        let base = mana_value(Some(power), Some(toughness), &list, &config);
        let bumped_power = mana_value(Some(power + bump), Some(toughness), &list, &config);
        let bumped_toughness = mana_value(Some(power), Some(toughness + bump), &list, &config);
        prop_assert!(bumped_power >= base);
        prop_assert!(bumped_toughness >= base);
    }

    #[test]
    fn prop_cost_pips_stay_in_identity(
        power in 0u32..10,
        toughness in 0u32..10,
        symbols in "[WUBRGC]{0,5}",
        picks in prop::collection::vec(0usize..ABILITY_CHOICES.len(), 0..4),
    ) {
        let config = BalanceConfig::default();
        let identity: ColorIdentity = symbols.parse().unwrap();
        let list: Vec<String> = picks.iter().map(|i| ABILITY_CHOICES[*i].to_string()).collect();
        let cost = compute_mana_cost(Some(power), Some(toughness), &list, &identity, &config);

        prop_assert_eq!(cost.mana_value(), mana_value(Some(power), Some(toughness), &list, &config));
        prop_assert!(cost.colored_pips() <= config.max_colored_pips);
        for pip in cost.pip_colors() {
            prop_assert!(identity.contains(pip));
            prop_assert!(pip != Color::Colorless);
        }
    }

    #[test]
    fn prop_any_seed_yields_a_valid_card(seed in any::<u64>()) {
        let factory = CardFactory::default();
        let card = factory.create_card(seed, &CardOverrides::default());
        prop_assert!(card.is_ok());
    }
}
