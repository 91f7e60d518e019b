//! Preset order resolution.
//!
//! Flattens a preset's `prompt_order` into a single list of entries, then
//! classifies each enabled entry into a [`PromptSlot`] so the linearizer can
//! match on a closed set instead of comparing identifier strings.

use mythos_core::{OrderEntry, Preset, PromptDefinition, PromptOrder};
use tracing::debug;

pub const CHAT_HISTORY: &str = "chatHistory";
pub const WORLD_INFO_BEFORE: &str = "worldInfoBefore";
pub const WORLD_INFO_AFTER: &str = "worldInfoAfter";

/// How to read the nested, per-character form of `prompt_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlockPolicy {
    /// Use the first character block; later blocks are ignored.
    FirstOnly,
}

/// Single-character mode: only the first block is honored.
pub const CHARACTER_BLOCK_POLICY: BlockPolicy = BlockPolicy::FirstOnly;

/// Where a world-info slot sits. Both render the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldInfoPosition {
    Before,
    After,
}

/// One renderable piece of the prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptSlot<'a> {
    /// A preset fragment, macro-resolved at render time
    Literal(&'a PromptDefinition),
    /// The windowed chat log
    ChatHistory,
    /// World info followed by the persona
    WorldInfo(WorldInfoPosition),
}

/// The preset's ordering as one flat list, disabled entries included.
///
/// Returns an empty list for an unrecognized `prompt_order` shape or an
/// empty nested form.
pub fn resolve_order(preset: &Preset) -> Vec<OrderEntry> {
    resolve_order_with(preset, CHARACTER_BLOCK_POLICY)
}

pub fn resolve_order_with(preset: &Preset, policy: BlockPolicy) -> Vec<OrderEntry> {
    match &preset.prompt_order {
        PromptOrder::Flat(entries) => entries.clone(),
        PromptOrder::Nested(blocks) => match policy {
            BlockPolicy::FirstOnly => {
                if blocks.len() > 1 {
                    debug!(
                        ignored = blocks.len() - 1,
                        "Preset has several character blocks; using the first"
                    );
                }
                blocks
                    .first()
                    .map(|block| block.order.clone())
                    .unwrap_or_default()
            }
        },
        PromptOrder::Unrecognized(_) => Vec::new(),
    }
}

/// Classify one entry. `None` for identifiers nothing renders.
///
/// Reserved identifiers win over a preset fragment of the same name.
pub fn classify<'a>(preset: &'a Preset, identifier: &str) -> Option<PromptSlot<'a>> {
    match identifier {
        CHAT_HISTORY => Some(PromptSlot::ChatHistory),
        WORLD_INFO_BEFORE => Some(PromptSlot::WorldInfo(WorldInfoPosition::Before)),
        WORLD_INFO_AFTER => Some(PromptSlot::WorldInfo(WorldInfoPosition::After)),
        other => preset.prompt(other).map(PromptSlot::Literal),
    }
}

/// Enabled entries, in order, as slots. Unknown identifiers are skipped.
pub fn resolve_slots(preset: &Preset) -> Vec<PromptSlot<'_>> {
    let entries = resolve_order(preset);
    let mut skipped = 0usize;

    let slots: Vec<_> = entries
        .iter()
        .filter(|entry| entry.enabled)
        .filter_map(|entry| {
            let slot = classify(preset, &entry.identifier);
            if slot.is_none() {
                skipped += 1;
                debug!(identifier = %entry.identifier, "No fragment for order entry; skipping");
            }
            slot
        })
        .collect();

    debug!(
        entries = entries.len(),
        slots = slots.len(),
        unresolved = skipped,
        "Resolved preset order"
    );
    slots
}
