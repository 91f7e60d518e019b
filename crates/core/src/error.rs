//! Error types for the Mythos domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. None of them are fatal:
//! every failure leaves the session usable and the action retryable.

use thiserror::Error;

/// The top-level error type for all Mythos operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model client errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Preset file errors ---
    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    // --- Turn handling errors ---
    #[error("Turn error: {0}")]
    Turn(#[from] TurnError),

    // --- Structured generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Rejections raised while loading a preset file.
///
/// A rejected preset never replaces the active one.
#[derive(Debug, Clone, Error)]
pub enum PresetError {
    #[error("Preset is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Preset is missing a `prompts` list")]
    MissingPrompts,

    #[error("Preset is missing a `prompt_order` value")]
    MissingPromptOrder,

    #[error("Preset prompt #{index} is invalid: {reason}")]
    InvalidPrompt { index: usize, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error("Cannot send an empty message")]
    EmptyInput,

    #[error("A turn is already in flight")]
    TurnInFlight,

    #[error("Model request failed: {0}")]
    Provider(#[from] ProviderError),
}

impl TurnError {
    /// Short notice suitable for a transient toast in the UI.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Type something before sending.",
            Self::TurnInFlight => "Still waiting for the previous reply.",
            Self::Provider(_) => "The AI did not respond. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Model request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model returned malformed structured output: {0}")]
    MalformedOutput(String),
}

impl GenerationError {
    /// Short notice suitable for a transient toast in the UI.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Provider(_) => "The AI did not respond. Please try again.",
            Self::EmptyResponse | Self::MalformedOutput(_) => {
                "The AI reply could not be read. Please try again."
            }
        }
    }
}
