//! Game session: the state one play-through carries between turns.
//!
//! The session is owned by the caller (the UI controller). The prompt engine
//! only reads it; the caller changes it through [`GameSession::push`],
//! [`GameSession::clear_history`], [`GameSession::apply`] and preset loading.
//! Nothing here touches durable storage: the caller serializes the session
//! wherever it likes.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PresetError;
use crate::message::Message;
use crate::persona::{Persona, WorldInfo};
use crate::preset::Preset;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Chronological chat log; append-only during a turn
    #[serde(default)]
    messages: Vec<Message>,

    /// `None` renders the built-in fallback template
    #[serde(default)]
    pub active_preset: Option<Preset>,

    #[serde(default)]
    pub persona: Persona,

    #[serde(default)]
    pub world_info: WorldInfo,

    /// Turn-in-flight flag; never persisted
    #[serde(skip)]
    is_processing: bool,
}

/// A partial replacement of session state. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub persona: Option<Persona>,
    pub world_info: Option<WorldInfo>,
    /// `Some(None)` unloads the preset
    pub active_preset: Option<Option<Preset>>,
    pub messages: Option<Vec<Message>>,
}

impl GameSession {
    pub fn new(persona: Persona, world_info: WorldInfo) -> Self {
        Self {
            persona,
            world_info,
            ..Self::default()
        }
    }

    /// The chat log, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the end of the log.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear_history(&mut self) {
        info!(dropped = self.messages.len(), "Clearing chat history");
        self.messages.clear();
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn set_processing(&mut self, processing: bool) {
        self.is_processing = processing;
    }

    /// Replace the fields the patch carries.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(persona) = patch.persona {
            self.persona = persona;
        }
        if let Some(world_info) = patch.world_info {
            self.world_info = world_info;
        }
        if let Some(preset) = patch.active_preset {
            self.active_preset = preset;
        }
        if let Some(messages) = patch.messages {
            self.messages = messages;
        }
    }

    /// Validate an uploaded preset file and make it the active preset.
    ///
    /// On rejection the previously active preset (or none) stays in place.
    pub fn load_preset_bytes(&mut self, bytes: &[u8]) -> Result<&Preset, PresetError> {
        match Preset::from_slice(bytes) {
            Ok(preset) => {
                info!(
                    name = preset.display_name(),
                    prompts = preset.prompts.len(),
                    "Loaded preset"
                );
                Ok(self.active_preset.insert(preset))
            }
            Err(e) => {
                warn!("Rejected preset file: {e}");
                Err(e)
            }
        }
    }
}
