//! # Mythos Core
//!
//! Domain types, traits, and error definitions for the Mythos role-play
//! front-end. This crate has **no framework dependencies**: it defines the
//! session model that the prompt engine reads and the model-client boundary
//! that provider crates implement against.
//!
//! ## Design Philosophy
//!
//! - Session state is plain data; the engine only ever reads it.
//! - Presets are parsed once at the file boundary into closed types.
//! - The model client is a trait, so the engine is testable without a network.

pub mod error;
pub mod message;
pub mod persona;
pub mod preset;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GenerationError, PresetError, ProviderError, Result, TurnError};
pub use message::{Message, Role};
pub use persona::{DataItem, Persona, WorldInfo};
pub use preset::{CharacterBlock, OrderEntry, Preset, PromptDefinition, PromptOrder, PromptRole};
pub use provider::{
    GenerationConfig, Provider, ProviderRequest, ProviderResponse, ResponseFormat, ThinkingLevel,
    Usage,
};
pub use session::{GameSession, SessionPatch};
