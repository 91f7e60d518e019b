//! Macro substitution for preset fragment text.
//!
//! Supported tokens (matched case-insensitively):
//!
//! | token | value |
//! |---|---|
//! | `{{user}}`, `<user>` | persona name, or `User` when blank |
//! | `{{char}}`, `<char>` | the narrator name |
//! | `{{lastUserMessage}}` | the current turn's raw input |
//! | `{{charIfNotGroup}}` | the narrator name (no group chats) |
//!
//! Anything else is left as written.

use std::sync::LazyLock;

use mythos_core::Persona;
use regex::{NoExpand, Regex};

use crate::NARRATOR;

/// Substituted for `{{user}}` when the persona has no name yet.
pub const DEFAULT_USER_NAME: &str = "User";

/// The token a fragment uses to place the player's input itself.
pub const LAST_USER_MESSAGE: &str = "{{lastUserMessage}}";

static USER_BRACES: LazyLock<Regex> = LazyLock::new(|| macro_regex(r"\{\{user\}\}"));
static USER_ANGLE: LazyLock<Regex> = LazyLock::new(|| macro_regex(r"<user>"));
static CHAR_BRACES: LazyLock<Regex> = LazyLock::new(|| macro_regex(r"\{\{char\}\}"));
static CHAR_ANGLE: LazyLock<Regex> = LazyLock::new(|| macro_regex(r"<char>"));
static LAST_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| macro_regex(r"\{\{lastUserMessage\}\}"));
static CHAR_IF_NOT_GROUP: LazyLock<Regex> =
    LazyLock::new(|| macro_regex(r"\{\{charIfNotGroup\}\}"));

// Static literal patterns; compilation cannot fail.
#[allow(clippy::expect_used)]
fn macro_regex(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid macro regex")
}

/// Resolve every supported macro in `text`.
pub fn resolve(text: &str, persona: &Persona, user_input: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let user_name = if persona.name.is_empty() {
        DEFAULT_USER_NAME
    } else {
        persona.name.as_str()
    };

    let passes: [(&Regex, &str); 6] = [
        (&*USER_BRACES, user_name),
        (&*USER_ANGLE, user_name),
        (&*CHAR_BRACES, NARRATOR),
        (&*CHAR_ANGLE, NARRATOR),
        (&*LAST_MESSAGE, user_input),
        (&*CHAR_IF_NOT_GROUP, NARRATOR),
    ];

    passes
        .into_iter()
        .fold(text.to_string(), |buffer, (pattern, value)| {
            pattern.replace_all(&buffer, NoExpand(value)).into_owned()
        })
}

/// Whether a fragment places the player's input itself.
///
/// Exact-case match, unlike [`resolve`].
pub fn uses_last_user_message(text: &str) -> bool {
    text.contains(LAST_USER_MESSAGE)
}
