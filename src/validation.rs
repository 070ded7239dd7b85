//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Errors reject a draft; warnings are logged and let it through.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::card::CardDraft;
use crate::color::Color;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

/// Names longer than this still render (the header shrinks them) but are flagged.
pub const NAME_LENGTH_WARNING: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationViolation {
    fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    fn warning(rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ViolationSeverity::Warning,
            ..Self::error(rule, message)
        }
    }

    fn expected(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected {}, got {})", expected, actual)?;
        }
        Ok(())
    }
}

/// A draft failed at least one error-severity rule.
#[derive(Debug, Clone, Error)]
#[error("card validation failed: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<ValidationViolation>,
}

impl ValidationError {
    pub fn has_rule(&self, rule: &str) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

fn join_violations(violations: &[ValidationViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, card: &CardDraft) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct NameRule;

impl ValidationRule for NameRule {
    fn name(&self) -> &'static str { "name" }

    fn validate(&self, card: &CardDraft) -> Vec<ValidationViolation> {
        let trimmed = card.name.trim();
        if trimmed.is_empty() {
            return vec![ValidationViolation::error(self.name(), "Card name cannot be empty")];
        }
        let length = trimmed.chars().count();
        if length > NAME_LENGTH_WARNING {
            return vec![ValidationViolation::warning(self.name(), "Name will be shrunk to fit the header")
                .expected(format!("<= {} characters", NAME_LENGTH_WARNING), length.to_string())];
        }
        vec![]
    }
}

pub struct TypeLineRule;

impl ValidationRule for TypeLineRule {
    fn name(&self) -> &'static str { "type_line" }

    fn validate(&self, card: &CardDraft) -> Vec<ValidationViolation> {
        if card.type_line.trim().is_empty() {
            vec![ValidationViolation::error(self.name(), "Type line cannot be empty")]
        } else {
            vec![]
        }
    }
}

/// Creature type lines carry both stats; everything else carries neither.
pub struct StatsRule;

impl ValidationRule for StatsRule {
    fn name(&self) -> &'static str { "power_toughness" }

    fn validate(&self, card: &CardDraft) -> Vec<ValidationViolation> {
        let actual = format!(
            "power={}, toughness={}",
            describe_stat(card.power),
            describe_stat(card.toughness)
        );
        match (card.is_creature(), card.power, card.toughness) {
            (true, Some(_), Some(_)) | (false, None, None) => vec![],
            (true, _, _) => vec![ValidationViolation::error(
                self.name(),
                "Creature requires both power and toughness",
            )
            .expected("both set", actual)],
            (false, _, _) => vec![ValidationViolation::error(
                self.name(),
                "Non-creature cannot have power or toughness",
            )
            .expected("neither set", actual)],
        }
    }
}

fn describe_stat(stat: Option<u32>) -> String {
    stat.map_or_else(|| "none".to_string(), |v| v.to_string())
}

/// Colored pips must come from the identity; colorless cards have none.
pub struct ManaColorRule;

impl ValidationRule for ManaColorRule {
    fn name(&self) -> &'static str { "mana_colors" }

    fn validate(&self, card: &CardDraft) -> Vec<ValidationViolation> {
        let identity = &card.color_identity;
        let cost = &card.mana_cost;

        if identity.is_colorless() && cost.colored_pips() > 0 {
            return vec![ValidationViolation::error(self.name(), "Colorless card cannot have colored pips")
                .expected("0 colored pips", cost.colored_pips().to_string())];
        }

        cost.pip_colors()
            .filter(|color| *color == Color::Colorless || !identity.contains(*color))
            .map(|color| {
                ValidationViolation::error(self.name(), format!("Pip {{{}}} outside color identity", color))
                    .expected(format!("subset of {}", identity), cost.symbols())
            })
            .collect()
    }
}

pub struct AbilitiesRule;

impl ValidationRule for AbilitiesRule {
    fn name(&self) -> &'static str { "abilities" }

    fn validate(&self, card: &CardDraft) -> Vec<ValidationViolation> {
        card.abilities
            .iter()
            .enumerate()
            .filter(|(_, ability)| ability.trim().is_empty())
            .map(|(index, _)| {
                ValidationViolation::error(self.name(), format!("Ability {} is empty", index + 1))
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(NameRule),
                Box::new(TypeLineRule),
                Box::new(StatsRule),
                Box::new(ManaColorRule),
                Box::new(AbilitiesRule),
            ],
        }
    }

    /// Every violation from every rule, errors and warnings alike.
    pub fn violations(&self, card: &CardDraft) -> Vec<ValidationViolation> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(card))
            .collect()
    }

    pub fn check(&self, card: &CardDraft) -> Result<(), ValidationError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let (errors, warnings): (Vec<_>, Vec<_>) = self
            .violations(card)
            .into_iter()
            .partition(|v| v.severity == ViolationSeverity::Error);

        for warning in &warnings {
            warn!("{}: {}", card.name, warning);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: errors })
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
