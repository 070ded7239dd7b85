//! CardForge Core - Procedural Trading Card Compiler
//!
//! # Guarantees
//! 1. Same seed, same card
//! 2. Costs follow the balance formula
//! 3. Validation gates every card
//! 4. Rendering is pure: same card, same pixels
//! 5. Exports are atomic
//! 6. Providers suggest, the placeholder path always works

pub mod balance;
pub mod card;
pub mod color;
pub mod config;
pub mod export;
pub mod factory;
pub mod hashing;
pub mod palette;
pub mod pipeline;
pub mod pools;
pub mod print;
pub mod provider;
pub mod render;
pub mod rng;
pub mod validation;

pub use balance::{compute_mana_cost, AbilityClass, BalanceConfig};
pub use card::{ArtSource, Artwork, Card, CardDraft, ManaCost};
pub use color::{Color, ColorIdentity};
pub use config::{ConfigError, ForgeConfig, GenerationConfig, RenderSettings};
pub use export::{ExportError, ExportFormat};
pub use factory::{CardFactory, CardOverrides, GenerationError};
pub use hashing::{canonical_json, card_fingerprint};
pub use palette::Palette;
pub use pipeline::{BatchReport, BatchRequest, CardPipeline, ExportedCard, PipelineError};
pub use print::PrintSpec;
pub use provider::{ArtTextProvider, PlaceholderProvider, ProviderError};
pub use render::{CardRenderer, RenderError};
pub use rng::CardRng;
pub use validation::{ValidationError, ValidationRule, ValidationViolation, Validator, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
