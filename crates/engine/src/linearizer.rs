//! Prompt linearization: session + input → one text buffer.
//!
//! With an active preset the resolved slots are rendered in order:
//!
//! - `chatHistory` → `\n<chathistory>\n{history}\n</chathistory>\n`
//! - `worldInfoBefore` / `worldInfoAfter` → `\n<worldinfo>\n{world}\n{persona}\n</worldinfo>\n`
//! - a fragment with content → `\n{macro-resolved content}\n`
//!
//! and the player's turn is appended as `\nMaster: {input}\nTawa:` unless an
//! enabled fragment already places it with `{{lastUserMessage}}`.
//!
//! Without a preset, or when the preset's order resolves to nothing, a
//! minimal built-in template is used instead.

use mythos_core::{GameSession, Preset};
use tracing::debug;

use crate::format::{format_persona, format_world_info};
use crate::history::{DEFAULT_HISTORY_LIMIT, format_history};
use crate::macros;
use crate::order::{PromptSlot, resolve_order, resolve_slots};
use crate::{NARRATOR, PLAYER_LABEL};

/// Heading for the history section of the built-in template.
pub const FALLBACK_HISTORY_LABEL: &str = "Lịch sử trò chuyện:";

/// Builds prompts. Holds only the history window size, so one builder can
/// serve any number of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    history_limit: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl PromptBuilder {
    pub fn new(history_limit: usize) -> Self {
        Self { history_limit }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Build the prompt for one turn. Reads the session, never changes it.
    pub fn construct_prompt(&self, session: &GameSession, user_input: &str) -> String {
        match &session.active_preset {
            Some(preset) if !resolve_order(preset).is_empty() => {
                self.render_preset(preset, session, user_input)
            }
            Some(preset) => {
                debug!(
                    preset = preset.display_name(),
                    "Preset order is empty; using built-in template"
                );
                self.render_fallback(session, user_input)
            }
            None => self.render_fallback(session, user_input),
        }
    }

    fn render_fallback(&self, session: &GameSession, user_input: &str) -> String {
        format!(
            "{}\n{}\n\n{FALLBACK_HISTORY_LABEL}\n{}\n\nUser: {user_input}\nAI: ",
            format_world_info(&session.world_info),
            format_persona(&session.persona),
            format_history(session.messages(), self.history_limit),
        )
    }

    fn render_preset(&self, preset: &Preset, session: &GameSession, user_input: &str) -> String {
        let slots = resolve_slots(preset);
        let mut prompt = String::new();
        let mut input_placed = false;

        for slot in &slots {
            match slot {
                PromptSlot::ChatHistory => {
                    prompt.push_str("\n<chathistory>\n");
                    prompt.push_str(&format_history(session.messages(), self.history_limit));
                    prompt.push_str("\n</chathistory>\n");
                }
                PromptSlot::WorldInfo(_) => {
                    prompt.push_str("\n<worldinfo>\n");
                    prompt.push_str(&format_world_info(&session.world_info));
                    prompt.push('\n');
                    prompt.push_str(&format_persona(&session.persona));
                    prompt.push_str("\n</worldinfo>\n");
                }
                PromptSlot::Literal(fragment) => {
                    input_placed |= macros::uses_last_user_message(&fragment.content);
                    if !fragment.content.is_empty() {
                        prompt.push('\n');
                        prompt.push_str(&macros::resolve(
                            &fragment.content,
                            &session.persona,
                            user_input,
                        ));
                        prompt.push('\n');
                    }
                }
            }
        }

        if !input_placed {
            prompt.push_str(&format!("\n{PLAYER_LABEL}: {user_input}\n{NARRATOR}:"));
        }

        debug!(
            preset = preset.display_name(),
            slots = slots.len(),
            trailing_turn = !input_placed,
            chars = prompt.len(),
            "Linearized prompt"
        );
        prompt
    }
}

/// Build a prompt with the default history window.
pub fn construct_prompt(session: &GameSession, user_input: &str) -> String {
    PromptBuilder::default().construct_prompt(session, user_input)
}
