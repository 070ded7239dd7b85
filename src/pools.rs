//! Static word and ability pools sampled by the factory.

use crate::color::Color;

/// Candidate abilities for one color.
pub struct AbilityPool {
    /// Keyword abilities; only creatures draw these.
    pub keywords: &'static [&'static str],
    /// Effects usable by creatures and by non-creature spells.
    pub effects: &'static [&'static str],
    /// Effects reserved for instants, sorceries and other non-creatures.
    pub spell_effects: &'static [&'static str],
}

const WHITE: AbilityPool = AbilityPool {
    keywords: &["Vigilance", "Lifelink", "First strike"],
    effects: &["Create a 1/1 white Soldier token", "Tap target creature", "Gain 3 life"],
    spell_effects: &["Destroy target enchantment", "Exile target attacking creature"],
};

const BLUE: AbilityPool = AbilityPool {
    keywords: &["Flying", "Flash"],
    effects: &["Draw a card", "Return target creature to its owner's hand", "Scry 2"],
    spell_effects: &["Counter target spell", "Draw two cards"],
};

const BLACK: AbilityPool = AbilityPool {
    keywords: &["Deathtouch", "Menace"],
    effects: &[
        "Each opponent loses 2 life",
        "Return target creature card from your graveyard to your hand",
        "Target creature gets -2/-2 until end of turn",
    ],
    spell_effects: &["Destroy target creature", "Target player discards two cards"],
};

const RED: AbilityPool = AbilityPool {
    keywords: &["Haste", "First strike"],
    effects: &[
        "Deal 3 damage to any target",
        "Discard a card, then draw a card",
        "Create a Treasure token",
    ],
    spell_effects: &["Deal 2 damage to each creature", "Destroy target artifact"],
};

const GREEN: AbilityPool = AbilityPool {
    keywords: &["Trample", "Reach"],
    effects: &[
        "Put a +1/+1 counter on target creature",
        "Search your library for a basic land card",
        "Gain 3 life",
    ],
    spell_effects: &["Target creature fights another target creature", "Create a 3/3 green Beast token"],
};

const COLORLESS: AbilityPool = AbilityPool {
    keywords: &["Indestructible"],
    effects: &[
        "This spell costs 1 less to cast for each artifact you control",
        "Create a 1/1 colorless Thopter artifact creature token with flying",
        "Scry 1",
    ],
    spell_effects: &["Draw a card"],
};

pub fn ability_pool(color: Color) -> &'static AbilityPool {
    match color {
        Color::White => &WHITE,
        Color::Blue => &BLUE,
        Color::Black => &BLACK,
        Color::Red => &RED,
        Color::Green => &GREEN,
        Color::Colorless => &COLORLESS,
    }
}

/// Merge pools for every color, canonical order, duplicates dropped.
pub fn merged_abilities(colors: impl IntoIterator<Item = Color>, creature: bool) -> Vec<&'static str> {
    let mut merged: Vec<&'static str> = Vec::new();
    for color in colors {
        let pool = ability_pool(color);
        let lists: [&'static [&'static str]; 2] = if creature {
            [pool.keywords, pool.effects]
        } else {
            [pool.effects, pool.spell_effects]
        };
        for ability in lists.into_iter().flatten() {
            if !merged.contains(ability) {
                merged.push(*ability);
            }
        }
    }
    merged
}

/// (race, class); an empty class means the race stands alone.
pub const CREATURE_TYPES: &[(&str, &str)] = &[
    ("Human", "Wizard"),
    ("Elf", "Druid"),
    ("Goblin", "Warrior"),
    ("Zombie", "Knight"),
    ("Angel", "Cleric"),
    ("Merfolk", "Rogue"),
    ("Dragon", ""),
];

pub const ARTIFACT_CREATURE_TYPES: &[&str] = &["Construct", "Golem", "Thopter"];

pub const NON_CREATURE_TYPES: &[&str] = &["Instant", "Sorcery", "Artifact", "Enchantment", "Planeswalker"];

pub fn name_prefixes(color: Color) -> &'static [&'static str] {
    match color {
        Color::White => &["Radiant", "Dawnlit", "Sanctified"],
        Color::Blue => &["Mystic", "Aether", "Tidewoven"],
        Color::Black => &["Grim", "Duskborn", "Hollow"],
        Color::Red => &["Blazing", "Cinder", "Riotous"],
        Color::Green => &["Wild", "Thornback", "Verdant"],
        Color::Colorless => &["Clockwork", "Runic", "Gilded"],
    }
}

pub const CREATURE_SUFFIXES: &[&str] = &["Guardian", "Phoenix", "Sage", "Warden", "Stalker", "Colossus"];
pub const SPELL_SUFFIXES: &[&str] = &["Ritual", "Ascension", "Reckoning", "Insight", "Decree"];
pub const PERMANENT_SUFFIXES: &[&str] = &["Idol", "Engine", "Sanctum", "Covenant", "Relic"];

/// Flavor templates keyed by primary color. Slots: `{name}`, `{place}`, `{thing}`.
pub fn flavor_templates(color: Color) -> &'static [&'static str] {
    match color {
        Color::White => &[
            "\"Where {name} stands, {place} does not fall.\"",
            "Every oath sworn in {place} is kept by {thing}.",
            "{name} asks nothing of the faithful but {thing}.",
        ],
        Color::Blue => &[
            "\"Knowledge of {thing} is the only tide {name} obeys.\"",
            "Beneath {place}, the patient ones still calculate.",
            "{name} learned the secret of {thing} and never spoke again.",
        ],
        Color::Black => &[
            "\"{thing} is a small price. {name} always collects.\"",
            "Nothing buried in {place} stays buried for long.",
            "{name} remembers every debt owed in {place}.",
        ],
        Color::Red => &[
            "\"Burn {place} down and build it louder!\"",
            "{name} was born of {thing} and raised by worse.",
            "When {name} arrives, {place} learns what fire means.",
        ],
        Color::Green => &[
            "\"{place} was here before you. It will be here after.\"",
            "{name} speaks for {thing}, and {thing} does not forgive.",
            "Roots older than {place} stir when {name} passes.",
        ],
        Color::Colorless => &[
            "Its makers are forgotten. {name} is not.",
            "\"Gears turn in {place}, whether or not anyone winds them.\"",
            "{name} was built to hold {thing}, and it holds it still.",
        ],
    }
}

pub fn flavor_places(color: Color) -> &'static [&'static str] {
    match color {
        Color::White => &["the High Bastion", "the Sunlit Gate", "the Cathedral Steps"],
        Color::Blue => &["the Drowned Archive", "the Glass Sea", "the Observatory"],
        Color::Black => &["the Ossuary", "the Blackmire", "the Vaults of Ash"],
        Color::Red => &["the Ember Peaks", "the Foundry", "the Scorched Pass"],
        Color::Green => &["the Elderwood", "the Thornvale", "the Mossdeep"],
        Color::Colorless => &["the Silent Works", "the Buried Forge", "the Spire"],
    }
}

pub fn flavor_things(color: Color) -> &'static [&'static str] {
    match color {
        Color::White => &["unbroken faith", "the morning bells", "quiet courage"],
        Color::Blue => &["the sea's memory", "a single question", "starlight"],
        Color::Black => &["a final breath", "old grudges", "the grave's hunger"],
        Color::Red => &["thunder", "reckless joy", "the forge's heart"],
        Color::Green => &["the old roots", "the hunt", "the first rain"],
        Color::Colorless => &["a humming core", "forgotten power", "perfect silence"],
    }
}
