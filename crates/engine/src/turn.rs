//! Turn handling: one player line in, one narrator reply out.
//!
//! A turn moves idle → building → awaiting-response → idle:
//!
//! 1. [`TurnHandler::begin`] appends the player's message, raises the
//!    processing flag and builds the request.
//! 2. [`PendingTurn::dispatch`] awaits the model. It holds no session borrow,
//!    so the caller stays free to redraw while it waits.
//! 3. [`TurnHandler::finish`] appends the reply on success and always lowers
//!    the flag. On failure the player's message stays, so resending retries.
//!
//! Only one turn may be in flight per session.

use std::sync::Arc;

use mythos_config::AppConfig;
use mythos_core::error::{ProviderError, TurnError};
use mythos_core::provider::{GenerationConfig, Provider, ProviderRequest, ProviderResponse, Usage};
use mythos_core::{GameSession, Message};
use tracing::{info, warn};

use crate::linearizer::PromptBuilder;

/// What a completed turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The narrator's reply, as appended to the session
    pub reply: String,
    pub usage: Option<Usage>,
    /// Model that actually answered
    pub model: String,
}

/// A built request waiting to be sent.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    request: ProviderRequest,
}

impl PendingTurn {
    /// The linearized prompt this turn will send.
    pub fn prompt(&self) -> &str {
        &self.request.prompt
    }

    pub fn request(&self) -> &ProviderRequest {
        &self.request
    }

    pub async fn dispatch(
        self,
        provider: &dyn Provider,
    ) -> Result<ProviderResponse, ProviderError> {
        provider.generate(self.request).await
    }
}

pub struct TurnHandler {
    provider: Arc<dyn Provider>,
    model: String,
    config: GenerationConfig,
    builder: PromptBuilder,
}

impl TurnHandler {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            config: GenerationConfig::default(),
            builder: PromptBuilder::default(),
        }
    }

    /// Model, sampling settings and history window taken from configuration.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.model.clone())
            .with_generation_config(config.generation.to_generation_config())
            .with_builder(PromptBuilder::new(config.session.history_limit))
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_builder(mut self, builder: PromptBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn builder(&self) -> &PromptBuilder {
        &self.builder
    }

    /// Start a turn: append the player's line and build the request.
    pub fn begin(&self, session: &mut GameSession, input: &str) -> Result<PendingTurn, TurnError> {
        if input.trim().is_empty() {
            return Err(TurnError::EmptyInput);
        }
        if session.is_processing() {
            return Err(TurnError::TurnInFlight);
        }

        session.push(Message::user(input));
        session.set_processing(true);

        let prompt = self.builder.construct_prompt(session, input);
        let config = match &session.active_preset {
            Some(preset) => self.config.clone().with_preset_overrides(preset),
            None => self.config.clone(),
        };

        info!(
            model = %self.model,
            provider = self.provider.name(),
            history = session.messages().len(),
            prompt_chars = prompt.len(),
            "Turn started"
        );

        Ok(PendingTurn {
            request: ProviderRequest::new(self.model.clone(), prompt).with_config(config),
        })
    }

    /// Settle a turn with the model's result.
    pub fn finish(
        &self,
        session: &mut GameSession,
        result: Result<ProviderResponse, ProviderError>,
    ) -> Result<TurnOutcome, TurnError> {
        session.set_processing(false);

        match result {
            Ok(response) => {
                session.push(Message::model(response.text.clone()));
                info!(
                    model = %response.model,
                    reply_chars = response.text.len(),
                    "Turn finished"
                );
                Ok(TurnOutcome {
                    reply: response.text,
                    usage: response.usage,
                    model: response.model,
                })
            }
            Err(e) => {
                warn!(error = %e, "Turn failed; player message kept for retry");
                Err(TurnError::Provider(e))
            }
        }
    }

    /// Begin, dispatch and finish in one call.
    pub async fn run(
        &self,
        session: &mut GameSession,
        input: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let pending = self.begin(session, input)?;
        let result = pending.dispatch(self.provider()).await;
        self.finish(session, result)
    }
}
