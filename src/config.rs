//! Configuration - serde-defaulted knobs for every stage

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::balance::BalanceConfig;
use crate::print::PrintSpec;
use crate::provider::ProviderConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForgeConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub balance: BalanceConfig,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub print: PrintSpec,
}

impl ForgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ForgeConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    /// Reject values that would make generation or layout meaningless.
    pub fn check(&self) -> Result<(), ConfigError> {
        let g = &self.generation;
        if g.color_count_weights.iter().all(|w| *w <= 0.0) {
            return Err(ConfigError::Invalid("colorCountWeights needs a positive weight".into()));
        }
        if g.color_count_weights.len() > 5 {
            return Err(ConfigError::Invalid("colorCountWeights covers at most 5 colors".into()));
        }
        if g.ability_count_min > g.ability_count_max {
            return Err(ConfigError::Invalid("abilityCountMin exceeds abilityCountMax".into()));
        }
        if g.stat_min > g.stat_max {
            return Err(ConfigError::Invalid("statMin exceeds statMax".into()));
        }
        let r = &self.render;
        if r.min_rules_font_size == 0 || r.min_rules_font_size > r.rules_font_size {
            return Err(ConfigError::Invalid("minRulesFontSize must be in 1..=rulesFontSize".into()));
        }
        PrintSpec::from_user(self.print.dpi)
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Relative weight of drawing 1, 2, 3... colors.
    #[serde(default = "default_color_count_weights")]
    pub color_count_weights: Vec<f64>,
    #[serde(default = "default_creature_chance")]
    pub creature_chance: f64,
    #[serde(default)]
    pub ability_count_min: u32,
    #[serde(default = "default_ability_count_max")]
    pub ability_count_max: u32,
    #[serde(default = "default_stat_min")]
    pub stat_min: u32,
    #[serde(default = "default_stat_max")]
    pub stat_max: u32,
    #[serde(default = "default_set_code")]
    pub set_code: String,
}

fn default_color_count_weights() -> Vec<f64> { vec![0.6, 0.3, 0.1] }
fn default_creature_chance() -> f64 { 0.7 }
fn default_ability_count_max() -> u32 { 3 }
fn default_stat_min() -> u32 { 1 }
fn default_stat_max() -> u32 { 7 }
fn default_set_code() -> String { "CFG".to_string() }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            color_count_weights: default_color_count_weights(),
            creature_chance: default_creature_chance(),
            ability_count_min: 0,
            ability_count_max: default_ability_count_max(),
            stat_min: default_stat_min(),
            stat_max: default_stat_max(),
            set_code: default_set_code(),
        }
    }
}

/// Font sizes are pixel heights of the 8px bitmap face after scaling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    #[serde(default = "default_title_font_size")]
    pub title_font_size: u32,
    #[serde(default = "default_min_title_font_size")]
    pub min_title_font_size: u32,
    #[serde(default = "default_type_font_size")]
    pub type_font_size: u32,
    #[serde(default = "default_rules_font_size")]
    pub rules_font_size: u32,
    #[serde(default = "default_min_rules_font_size")]
    pub min_rules_font_size: u32,
    #[serde(default = "default_shrink_step")]
    pub shrink_step: u32,
    #[serde(default = "default_max_shrink_attempts")]
    pub max_shrink_attempts: u32,
    #[serde(default = "default_stats_font_size")]
    pub stats_font_size: u32,
    #[serde(default = "default_footer_font_size")]
    pub footer_font_size: u32,
    #[serde(default = "default_legal_font_size")]
    pub legal_font_size: u32,
    #[serde(default = "default_legal_text")]
    pub legal_text: String,
}

fn default_title_font_size() -> u32 { 40 }
fn default_min_title_font_size() -> u32 { 20 }
fn default_type_font_size() -> u32 { 26 }
fn default_rules_font_size() -> u32 { 24 }
fn default_min_rules_font_size() -> u32 { 12 }
fn default_shrink_step() -> u32 { 2 }
fn default_max_shrink_attempts() -> u32 { 5 }
fn default_stats_font_size() -> u32 { 32 }
fn default_footer_font_size() -> u32 { 16 }
fn default_legal_font_size() -> u32 { 10 }
fn default_legal_text() -> String { "Not a real card. Generated by CardForge.".to_string() }

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            title_font_size: default_title_font_size(),
            min_title_font_size: default_min_title_font_size(),
            type_font_size: default_type_font_size(),
            rules_font_size: default_rules_font_size(),
            min_rules_font_size: default_min_rules_font_size(),
            shrink_step: default_shrink_step(),
            max_shrink_attempts: default_max_shrink_attempts(),
            stats_font_size: default_stats_font_size(),
            footer_font_size: default_footer_font_size(),
            legal_font_size: default_legal_font_size(),
            legal_text: default_legal_text(),
        }
    }
}
