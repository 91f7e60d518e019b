//! Mythos prompt engine.
//!
//! Turns a session (persona, world, chat log, active preset) plus the
//! player's latest line into the single text buffer the model receives,
//! and drives the turn around it.
//!
//! ```text
//! Preset ──► order::resolve_slots ──► PromptSlot*
//!                                        │
//!          macros / format / history ◄───┤  (per slot)
//!                                        ▼
//!                           linearizer::PromptBuilder ──► prompt text
//!                                        │
//!                                  turn::TurnHandler ──► Provider
//! ```

pub mod format;
pub mod generation;
pub mod history;
pub mod linearizer;
pub mod macros;
pub mod order;
pub mod turn;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use generation::{ItemKind, PersonaAuthor, PersonaField};
pub use linearizer::PromptBuilder;
pub use order::{BlockPolicy, PromptSlot, WorldInfoPosition};
pub use turn::{PendingTurn, TurnHandler, TurnOutcome};

/// Name the model speaks as.
pub const NARRATOR: &str = "Tawa";

/// Label the player's lines carry in history and in the trailing turn line.
pub const PLAYER_LABEL: &str = "Master";
