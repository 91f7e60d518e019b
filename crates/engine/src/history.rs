//! Windowed view of the chat log for prompt construction.

use mythos_core::{Message, Role};

use crate::{NARRATOR, PLAYER_LABEL};

/// How many trailing messages a prompt carries when nothing else is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Format the last `limit` messages, oldest first, as `Label: content`
/// blocks separated by a blank line.
///
/// Player lines are labelled `Master`; every other role speaks as the
/// narrator. The log itself is not touched.
pub fn format_history(messages: &[Message], limit: usize) -> String {
    let start = messages.len().saturating_sub(limit);
    messages[start..]
        .iter()
        .map(|message| {
            let label = match message.role {
                Role::User => PLAYER_LABEL,
                Role::Model | Role::System => NARRATOR,
            };
            format!("{label}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
