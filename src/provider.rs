//! Art/Text Provider - capability the factory consumes for artwork and flavor
//!
//! Two implementations: a deterministic placeholder and an HTTP-backed AI
//! provider. `FallbackProvider` wraps any provider so every failure degrades
//! to the placeholder path with a warning.

use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::card::{ArtSource, Artwork};
use crate::color::{Color, ColorIdentity};
use crate::hashing::stable_index;
use crate::pools;
use crate::rng::CardRng;

pub const PLACEHOLDER_ART_SIZE: (u32, u32) = (600, 400);
pub const PLACEHOLDER_ARTIST: &str = "CardForge Placeholder Studio";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(String),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider returned HTTP status {0}")]
    Status(u16),

    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Art encoding error: {0}")]
    Encoding(String),
}

/// Inputs for flavor text. Colors are the card's final identity.
#[derive(Debug, Clone, Copy)]
pub struct FlavorRequest<'a> {
    pub name: &'a str,
    pub type_line: &'a str,
    pub colors: &'a ColorIdentity,
    pub abilities: &'a [String],
}

pub trait ArtTextProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Artwork for a prompt. Deterministic providers key their output by `seed`.
    fn request_art(&self, prompt: &str, seed: u64) -> Result<Artwork, ProviderError>;

    fn request_flavor_text(&self, request: &FlavorRequest<'_>) -> Result<String, ProviderError>;
}

/// Credit line printed in the card footer for a given art source.
pub fn artist_credit(source: &ArtSource) -> String {
    match source {
        ArtSource::Placeholder => PLACEHOLDER_ARTIST.to_string(),
        ArtSource::Provider(model) => format!("AI Illustration ({})", model),
    }
}

// --- Placeholder ---

/// Deterministic art and template flavor text. Never calls out of process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

impl PlaceholderProvider {
    /// Tinted card-art stand-in keyed by `seed`: a base tint with a vertical
    /// falloff, a lighter accent frame and a translucent inner panel.
    pub fn placeholder_image(seed: u64) -> RgbaImage {
        let mut rng = CardRng::new(seed);
        let base = [
            rng.gen_inclusive(60, 200) as u8,
            rng.gen_inclusive(60, 200) as u8,
            rng.gen_inclusive(60, 200) as u8,
        ];
        let accent = base.map(|c| c.saturating_add(40));
        let (width, height) = PLACEHOLDER_ART_SIZE;

        RgbaImage::from_fn(width, height, |x, y| {
            let in_frame = |inset: u32| x >= inset && y >= inset && x < width - inset && y < height - inset;
            if in_frame(40) && !in_frame(46) {
                return Rgba([accent[0], accent[1], accent[2], 255]);
            }
            let shade = 1.0 - 0.35 * (y as f32 / height as f32);
            let mut px = base.map(|c| (c as f32 * shade).round() as u8);
            if in_frame(60) {
                // 30/255 white wash
                px = px.map(|c| (c as u32 + ((255 - c as u32) * 30) / 255) as u8);
            }
            Rgba([px[0], px[1], px[2], 255])
        })
    }

    /// Fill a color-keyed Mad-Libs template. Pure function of the request.
    pub fn template_flavor_text(request: &FlavorRequest<'_>) -> String {
        let color = request.colors.primary().unwrap_or(Color::Colorless);
        let key = format!("{}|{}", request.name, request.type_line);

        let templates = pools::flavor_templates(color);
        let places = pools::flavor_places(color);
        let things = pools::flavor_things(color);

        let template = templates[stable_index(&format!("template:{}", key), templates.len())];
        let place = places[stable_index(&format!("place:{}", key), places.len())];
        let thing = things[stable_index(&format!("thing:{}", key), things.len())];

        let filled = template
            .replace("{name}", request.name)
            .replace("{place}", place)
            .replace("{thing}", thing);
        capitalize_sentence(&filled)
    }
}

/// Uppercase the first letter, skipping a leading quote mark.
fn capitalize_sentence(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut done = false;
    for ch in text.chars() {
        if !done && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            done = true;
        } else {
            if !done && ch != '"' {
                done = true;
            }
            out.push(ch);
        }
    }
    out
}

impl ArtTextProvider for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn request_art(&self, _prompt: &str, seed: u64) -> Result<Artwork, ProviderError> {
        let image = Self::placeholder_image(seed);
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| ProviderError::Encoding(e.to_string()))?;
        Ok(Artwork {
            bytes,
            source: ArtSource::Placeholder,
        })
    }

    fn request_flavor_text(&self, request: &FlavorRequest<'_>) -> Result<String, ProviderError> {
        Ok(Self::template_flavor_text(request))
    }
}

// --- HTTP / AI-backed ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_image_model() -> String { "gpt-image-1".to_string() }
fn default_text_model() -> String { "gpt-4o-mini".to_string() }
fn default_image_size() -> String { "1024x1024".to_string() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            image_model: default_image_model(),
            text_model: default_text_model(),
            image_size: default_image_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Calls an OpenAI-compatible images/chat API. Every call is bounded by the
/// configured timeout.
pub struct HttpProvider {
    config: ProviderConfig,
    api_key: String,
    agent: ureq::Agent,
}

impl HttpProvider {
    /// Reads the API key from the configured environment variable.
    pub fn from_env(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingCredentials(config.api_key_env.clone()))?;
        Ok(Self::new(config, api_key))
    }

    pub fn new(config: ProviderConfig, api_key: String) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();
        Self {
            config,
            api_key,
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }

    fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!("POST {}", url);
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(map_transport_error)?;
        response
            .body_mut()
            .read_json::<T>()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn map_transport_error(error: ureq::Error) -> ProviderError {
    match error {
        ureq::Error::StatusCode(code) => ProviderError::Status(code),
        ureq::Error::Timeout(_) => ProviderError::Timeout,
        other => ProviderError::Transport(other.to_string()),
    }
}

impl ArtTextProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.config.image_model
    }

    fn request_art(&self, prompt: &str, _seed: u64) -> Result<Artwork, ProviderError> {
        let response: ImageResponse = self.post(
            "images/generations",
            json!({
                "model": self.config.image_model,
                "prompt": prompt,
                "n": 1,
                "size": self.config.image_size,
            }),
        )?;
        let encoded = response
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or_else(|| ProviderError::InvalidResponse("no image data".into()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(Artwork {
            bytes,
            source: ArtSource::Provider(self.config.image_model.clone()),
        })
    }

    fn request_flavor_text(&self, request: &FlavorRequest<'_>) -> Result<String, ProviderError> {
        let prompt = format!(
            "Write one line of flavor text (under 20 words, no quotes around the whole line) for a {} card named \"{}\" with type line \"{}\" and abilities: {}.",
            request.colors.display_names().join("/"),
            request.name,
            request.type_line,
            if request.abilities.is_empty() {
                "none".to_string()
            } else {
                request.abilities.join("; ")
            }
        );
        let response: ChatResponse = self.post(
            "chat/completions",
            json!({
                "model": self.config.text_model,
                "messages": [
                    {"role": "system", "content": "You write terse fantasy trading card flavor text."},
                    {"role": "user", "content": prompt},
                ],
                "max_tokens": 60,
            }),
        )?;
        response
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("empty completion".into()))
    }
}

// --- Fallback wrapper ---

/// Delegates to `primary`; any error is logged and answered by the placeholder.
pub struct FallbackProvider {
    primary: Box<dyn ArtTextProvider>,
    fallback: PlaceholderProvider,
}

impl FallbackProvider {
    pub fn new(primary: Box<dyn ArtTextProvider>) -> Self {
        Self {
            primary,
            fallback: PlaceholderProvider,
        }
    }
}

impl ArtTextProvider for FallbackProvider {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn request_art(&self, prompt: &str, seed: u64) -> Result<Artwork, ProviderError> {
        self.primary.request_art(prompt, seed).or_else(|e| {
            warn!("{} art request failed, using placeholder: {}", self.primary.name(), e);
            self.fallback.request_art(prompt, seed)
        })
    }

    fn request_flavor_text(&self, request: &FlavorRequest<'_>) -> Result<String, ProviderError> {
        self.primary.request_flavor_text(request).or_else(|e| {
            warn!("{} flavor request failed, using template: {}", self.primary.name(), e);
            self.fallback.request_flavor_text(request)
        })
    }
}

/// Provider used when AI is requested: HTTP behind the fallback wrapper, or
/// the bare placeholder when credentials are missing.
pub fn ai_provider(config: ProviderConfig) -> Box<dyn ArtTextProvider> {
    match HttpProvider::from_env(config) {
        Ok(http) => Box::new(FallbackProvider::new(Box::new(http))),
        Err(e) => {
            warn!("AI provider unavailable, using placeholder: {}", e);
            Box::new(PlaceholderProvider)
        }
    }
}
