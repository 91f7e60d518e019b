//! Provider trait: the boundary to the generative model.
//!
//! A Provider takes one linearized prompt plus generation parameters and
//! returns generated text, or a distinguishable [`ProviderError`]. The engine
//! never knows whether the request goes straight to the model API or through
//! a reverse proxy.
//!
//! Implementations: direct Gemini REST, OpenAI-compatible reverse proxy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::preset::Preset;

/// How much the model may think before answering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThinkingLevel {
    /// Let the model decide
    Auto,
    Minimum,
    Low,
    Medium,
    High,
    #[default]
    Maximum,
}

impl ThinkingLevel {
    /// Thinking token budget; `-1` asks the model to size it dynamically.
    pub fn token_budget(self) -> i32 {
        match self {
            Self::Auto => -1,
            Self::Minimum => 128,
            Self::Low => 1024,
            Self::Medium => 8192,
            Self::High => 16384,
            Self::Maximum => 32768,
        }
    }
}

/// Expected shape of the model's reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    PlainText,
    Json,
}

impl ResponseFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Json => "application/json",
        }
    }
}

/// Sampling and budget parameters for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Temperature (0.0 = deterministic, 2.0 = wild)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    #[serde(default)]
    pub thinking: ThinkingLevel,
}

fn default_temperature() -> f32 {
    1.0
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_k: None,
            top_p: None,
            max_output_tokens: None,
            thinking: ThinkingLevel::default(),
        }
    }
}

impl GenerationConfig {
    /// Sampling values carried by the active preset take precedence.
    pub fn with_preset_overrides(mut self, preset: &Preset) -> Self {
        if let Some(temperature) = preset.temperature {
            self.temperature = temperature;
        }
        if let Some(top_p) = preset.top_p {
            self.top_p = Some(top_p);
        }
        if let Some(top_k) = preset.top_k {
            self.top_k = Some(top_k);
        }
        self
    }
}

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-3-pro-preview")
    pub model: String,

    /// The fully linearized prompt
    pub prompt: String,

    /// Optional system instruction sent alongside the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    #[serde(default)]
    pub config: GenerationConfig,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            config: GenerationConfig::default(),
            response_format: ResponseFormat::PlainText,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated text
    pub text: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The turn handler and the structured generators call `generate()` without
/// knowing which transport is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "proxy:Tawa").
    fn name(&self) -> &str;

    /// Send a request and get the generated text.
    async fn generate(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
