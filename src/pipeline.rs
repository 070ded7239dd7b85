//! Card Pipeline - Single Entry Point
//!
//! generate -> render -> export, one card or a batch.
//!
//! CRITICAL: only validated cards reach the renderer. `Card` has no public
//! constructor; the factory's `CardDraft::validate` call is the only way in.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::card::Card;
use crate::config::ForgeConfig;
use crate::export::{ensure_output_dir, export_image, ExportError, ExportFormat};
use crate::factory::{CardFactory, CardOverrides, GenerationError};
use crate::hashing::card_fingerprint;
use crate::print::PrintSpec;
use crate::provider::{ai_provider, ArtTextProvider, PlaceholderProvider};
use crate::render::{CardRenderer, RenderError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub base_seed: u64,
    pub count: u32,
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub overrides: CardOverrides,
    /// Generate cards on the rayon pool; results keep index order.
    pub parallel: bool,
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            base_seed: 0,
            count: 1,
            output_dir: PathBuf::from("output"),
            format: ExportFormat::Png,
            overrides: CardOverrides::default(),
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedCard {
    pub index: u32,
    pub seed: u64,
    pub name: String,
    pub description: String,
    pub fingerprint: String,
    pub path: PathBuf,
    pub format: ExportFormat,
}

#[derive(Debug)]
pub struct CardOutcome {
    pub index: u32,
    pub seed: u64,
    pub result: Result<ExportedCard, PipelineError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<CardOutcome>,
}

impl BatchReport {
    pub fn exported(&self) -> impl Iterator<Item = &ExportedCard> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CardOutcome, &PipelineError)> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Seed of the card at `index` in a batch starting at `base_seed`.
pub fn batch_seed(base_seed: u64, index: u32) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// `Grim Warden` -> `Grim_Warden.png`; batches append `_{index + 1}`.
pub fn card_file_name(name: &str, index: u32, count: u32, format: ExportFormat) -> String {
    let mut stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if stem.is_empty() {
        stem = "card".to_string();
    }
    if count > 1 {
        stem = format!("{}_{}", stem, index + 1);
    }
    format!("{}.{}", stem, format.extension())
}

pub struct CardPipeline {
    factory: CardFactory,
    renderer: CardRenderer,
    print: PrintSpec,
}

impl CardPipeline {
    pub fn new(factory: CardFactory, renderer: CardRenderer, print: PrintSpec) -> Self {
        Self {
            factory,
            renderer,
            print,
        }
    }

    /// Build from config; `use_ai` selects the HTTP provider with placeholder fallback.
    pub fn from_config(config: &ForgeConfig, use_ai: bool) -> Self {
        let provider: Box<dyn ArtTextProvider> = if use_ai {
            ai_provider(config.provider.clone())
        } else {
            Box::new(PlaceholderProvider)
        };
        info!("art/text provider: {}", provider.name());
        Self::new(
            CardFactory::new(config.generation.clone(), config.balance.clone(), provider),
            CardRenderer::new(config.render.clone()),
            config.print,
        )
    }

    pub fn factory(&self) -> &CardFactory {
        &self.factory
    }

    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }

    pub fn generate(&self, seed: u64, overrides: &CardOverrides) -> Result<Card, PipelineError> {
        Ok(self.factory.create_card(seed, overrides)?)
    }

    pub fn render(&self, card: &Card) -> Result<RgbaImage, PipelineError> {
        Ok(self.renderer.render(card)?)
    }

    /// Render and write one card; returns the card's fingerprint.
    pub fn export(&self, card: &Card, path: &Path, format: ExportFormat) -> Result<String, PipelineError> {
        let image = self.render(card)?;
        let fingerprint = card_fingerprint(card)?;
        export_image(&image, path, format, &self.print, &fingerprint)?;
        Ok(fingerprint)
    }

    /// Generate, render and export `count` cards with seeds `base_seed + i`.
    ///
    /// An unusable output directory fails the whole batch up front. After
    /// that, each card succeeds or fails on its own.
    pub fn run_batch(&self, request: &BatchRequest) -> Result<BatchReport, PipelineError> {
        ensure_output_dir(&request.output_dir)?;

        let outcomes = if request.parallel {
            (0..request.count)
                .into_par_iter()
                .map(|index| self.produce(request, index))
                .collect()
        } else {
            (0..request.count).map(|index| self.produce(request, index)).collect()
        };

        let report = BatchReport { outcomes };
        info!(
            "batch complete: {} exported, {} failed",
            report.exported().count(),
            report.failures().count()
        );
        Ok(report)
    }

    fn produce(&self, request: &BatchRequest, index: u32) -> CardOutcome {
        let seed = batch_seed(request.base_seed, index);
        let result = self.produce_card(request, index, seed);
        if let Err(e) = &result {
            error!("card #{} (seed {}) failed: {}", index + 1, seed, e);
        }
        CardOutcome { index, seed, result }
    }

    fn produce_card(&self, request: &BatchRequest, index: u32, seed: u64) -> Result<ExportedCard, PipelineError> {
        let mut overrides = request.overrides.clone();
        if request.count > 1 && overrides.collector_number.is_none() {
            overrides.collector_number = Some(format!("{:03}/{:03}", index + 1, request.count));
        }

        let card = self.generate(seed, &overrides)?;
        let path = request
            .output_dir
            .join(card_file_name(card.name(), index, request.count, request.format));
        let fingerprint = self.export(&card, &path, request.format)?;

        info!("card #{} (seed {}): {} -> {}", index + 1, seed, card.describe(), path.display());
        Ok(ExportedCard {
            index,
            seed,
            name: card.name().to_string(),
            description: card.describe(),
            fingerprint,
            path,
            format: request.format,
        })
    }
}

impl Default for CardPipeline {
    fn default() -> Self {
        Self::new(CardFactory::default(), CardRenderer::default(), PrintSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(card_file_name("Grim Warden", 0, 1, ExportFormat::Png), "Grim_Warden.png");
        assert_eq!(card_file_name("Grim Warden", 2, 5, ExportFormat::Pdf), "Grim_Warden_3.pdf");
        assert_eq!(card_file_name("Kor'tal, the Wise", 0, 1, ExportFormat::Png), "Kortal_the_Wise.png");
        assert_eq!(card_file_name("  ", 0, 1, ExportFormat::Png), "card.png");
    }

    #[test]
    fn test_batch_seed_wraps() {
        assert_eq!(batch_seed(10, 3), 13);
        assert_eq!(batch_seed(u64::MAX, 1), 0);
    }

    #[test]
    fn test_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let request = BatchRequest {
            count: 0,
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let report = CardPipeline::default().run_batch(&request).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(report.is_success());
    }
}
