//! Preset model: the user-supplied prompt template.
//!
//! A preset is a bag of named prompt fragments (`prompts`) plus an ordering
//! (`prompt_order`) saying which fragments are rendered, in which order, and
//! whether each one is switched on. Presets come from uploaded JSON files in
//! the community preset format, where `prompt_order` is either a flat list of
//! `{identifier, enabled}` entries or a list of per-character blocks that each
//! wrap such a list under `order`.
//!
//! Parsing is deliberately forgiving below the top level: only a `prompts`
//! list and a `prompt_order` value are required. Order entries that cannot be
//! read are dropped rather than rejected, and mistyped fragment fields fall
//! back to their defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::PresetError;

/// Which chat role a fragment was authored for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    #[default]
    System,
    User,
    Assistant,
    /// Any other role string some editor wrote; rendered like the rest.
    #[serde(other)]
    Unknown,
}

/// One named, reusable block of template text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique key referenced from `prompt_order`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub identifier: String,

    /// Display name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(default)]
    pub role: PromptRole,

    /// Template text; may contain macros such as `{{user}}`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    #[serde(default)]
    pub system_prompt: bool,

    /// 0 = relative, 1 = absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_position: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_depth: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_order: Option<i64>,

    /// Informational only; `prompt_order` decides what is rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl PromptDefinition {
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            role: PromptRole::System,
            content: content.into(),
            system_prompt: false,
            injection_position: None,
            injection_depth: None,
            injection_order: None,
            enabled: None,
        }
    }

    /// Read one fragment from an uploaded file. Only the entry itself has to
    /// be an object; fields of the wrong type fall back to their defaults.
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let integer = |key: &str| map.get(key).and_then(Value::as_i64);

        Some(Self {
            identifier: text("identifier"),
            name: text("name"),
            role: map
                .get("role")
                .and_then(|role| serde_json::from_value(role.clone()).ok())
                .unwrap_or_default(),
            content: text("content"),
            system_prompt: map
                .get("system_prompt")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            injection_position: integer("injection_position"),
            injection_depth: integer("injection_depth"),
            injection_order: integer("injection_order"),
            enabled: map.get("enabled").and_then(Value::as_bool),
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single `{identifier, enabled}` slot in the ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub identifier: String,
    pub enabled: bool,
}

impl OrderEntry {
    pub fn new(identifier: impl Into<String>, enabled: bool) -> Self {
        Self {
            identifier: identifier.into(),
            enabled,
        }
    }

    /// Entries without a string identifier are unusable and dropped.
    /// A missing or non-boolean `enabled` reads as disabled.
    fn from_value(value: &Value) -> Option<Self> {
        let identifier = value.get("identifier")?.as_str()?;
        let enabled = value
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Some(Self::new(identifier, enabled))
    }
}

/// A per-character ordering block in the nested `prompt_order` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    pub order: Vec<OrderEntry>,
}

impl CharacterBlock {
    fn from_value(value: &Value) -> Option<Self> {
        let order = value
            .get("order")?
            .as_array()?
            .iter()
            .filter_map(OrderEntry::from_value)
            .collect();
        Some(Self {
            character_id: value.get("character_id").and_then(Value::as_i64),
            order,
        })
    }
}

/// The two ordering shapes found in preset files, tagged at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PromptOrder {
    /// `[{identifier, enabled}, ...]`
    Flat(Vec<OrderEntry>),
    /// `[{character_id, order: [...]}, ...]`
    Nested(Vec<CharacterBlock>),
    /// Anything else (kept verbatim so the preset round-trips); renders nothing.
    Unrecognized(Value),
}

impl Default for PromptOrder {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl From<Value> for PromptOrder {
    fn from(value: Value) -> Self {
        let Value::Array(items) = value else {
            return Self::Unrecognized(value);
        };

        let nested = items
            .first()
            .and_then(|first| first.get("order"))
            .is_some_and(Value::is_array);

        if nested {
            Self::Nested(items.iter().filter_map(CharacterBlock::from_value).collect())
        } else {
            Self::Flat(items.iter().filter_map(OrderEntry::from_value).collect())
        }
    }
}

/// A loaded preset. Read-only once loaded; replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Preset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,

    pub prompts: Vec<PromptDefinition>,

    pub prompt_order: PromptOrder,
}

impl Preset {
    /// Parse raw uploaded file bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PresetError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| PresetError::InvalidJson(e.to_string()))?;
        Self::try_from(value)
    }

    /// Look up a fragment by identifier (first match wins).
    pub fn prompt(&self, identifier: &str) -> Option<&PromptDefinition> {
        self.prompts.iter().find(|p| p.identifier == identifier)
    }

    /// Name shown in the UI.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Custom")
    }
}

impl TryFrom<Value> for Preset {
    type Error = PresetError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut map) = value else {
            return Err(PresetError::InvalidJson(
                "expected an object at the top level".into(),
            ));
        };

        let Some(Value::Array(raw_prompts)) = map.remove("prompts") else {
            return Err(PresetError::MissingPrompts);
        };

        let prompt_order = match map.remove("prompt_order") {
            None | Some(Value::Null) => return Err(PresetError::MissingPromptOrder),
            Some(order) => PromptOrder::from(order),
        };

        let prompts = raw_prompts
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                PromptDefinition::from_value(&raw).ok_or_else(|| PresetError::InvalidPrompt {
                    index,
                    reason: format!("expected an object, found {raw}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let number = |key: &str| map.get(key).and_then(Value::as_f64);

        let preset = Self {
            name: map.get("name").and_then(Value::as_str).map(String::from),
            temperature: number("temperature").map(|v| v as f32),
            top_p: number("top_p").map(|v| v as f32),
            top_k: number("top_k")
                .filter(|v| *v >= 0.0)
                .map(|v| v.round() as u32),
            repetition_penalty: number("repetition_penalty").map(|v| v as f32),
            prompts,
            prompt_order,
        };

        debug!(
            name = preset.display_name(),
            prompts = preset.prompts.len(),
            "Parsed preset"
        );
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_order_parses() {
        let preset = Preset::try_from(json!({
            "name": "Tawa",
            "temperature": 1.0,
            "prompts": [{"identifier": "main", "name": "Main", "role": "system", "content": "Hi {{user}}"}],
            "prompt_order": [
                {"identifier": "main", "enabled": true},
                {"identifier": "chatHistory", "enabled": false}
            ]
        }))
        .unwrap();

        assert_eq!(preset.display_name(), "Tawa");
        assert_eq!(preset.temperature, Some(1.0));
        assert_eq!(
            preset.prompt_order,
            PromptOrder::Flat(vec![
                OrderEntry::new("main", true),
                OrderEntry::new("chatHistory", false),
            ])
        );
    }

    #[test]
    fn nested_order_is_detected_from_first_block() {
        let preset = Preset::try_from(json!({
            "prompts": [],
            "prompt_order": [
                {"character_id": 100000, "order": [{"identifier": "main", "enabled": true}]},
                {"character_id": 100001, "order": [{"identifier": "nsfw", "enabled": true}]}
            ]
        }))
        .unwrap();

        let PromptOrder::Nested(blocks) = &preset.prompt_order else {
            panic!("expected nested order, got {:?}", preset.prompt_order);
        };
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].character_id, Some(100000));
        assert_eq!(blocks[0].order[0].identifier, "main");
    }

    #[test]
    fn non_list_order_is_unrecognized() {
        let preset = Preset::try_from(json!({
            "prompts": [],
            "prompt_order": {"identifier": "main"}
        }))
        .unwrap();
        assert!(matches!(preset.prompt_order, PromptOrder::Unrecognized(_)));
    }

    #[test]
    fn malformed_entries_are_dropped_or_disabled() {
        let order = PromptOrder::from(json!([
            {"identifier": "a", "enabled": true},
            {"enabled": true},
            "garbage",
            {"identifier": "b"}
        ]));
        assert_eq!(
            order,
            PromptOrder::Flat(vec![OrderEntry::new("a", true), OrderEntry::new("b", false)])
        );
    }

    #[test]
    fn missing_prompts_rejected() {
        let err = Preset::from_slice(br#"{"prompt_order": []}"#).unwrap_err();
        assert!(matches!(err, PresetError::MissingPrompts));
    }

    #[test]
    fn missing_prompt_order_rejected() {
        let err = Preset::from_slice(br#"{"prompts": []}"#).unwrap_err();
        assert!(matches!(err, PresetError::MissingPromptOrder));

        let err = Preset::from_slice(br#"{"prompts": [], "prompt_order": null}"#).unwrap_err();
        assert!(matches!(err, PresetError::MissingPromptOrder));
    }

    #[test]
    fn invalid_json_rejected() {
        let err = Preset::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, PresetError::InvalidJson(_)));
    }

    #[test]
    fn bad_prompt_reports_index() {
        let err = Preset::from_slice(br#"{"prompts": [{"identifier": "ok"}, 7], "prompt_order": []}"#)
            .unwrap_err();
        assert!(matches!(err, PresetError::InvalidPrompt { index: 1, .. }));
    }

    #[test]
    fn odd_fragment_fields_do_not_reject_preset() {
        let preset = Preset::from_slice(
            br#"{
                "prompts": [
                    {"identifier": "main", "role": "model", "content": "A"},
                    {"identifier": "jb", "role": null, "name": null, "content": "B"},
                    {"identifier": "nsfw", "injection_position": "0", "injection_depth": 4.5, "enabled": "yes"},
                    {"identifier": 12, "system_prompt": "true", "content": ["x"]}
                ],
                "prompt_order": [{"identifier": "main", "enabled": true}]
            }"#,
        )
        .unwrap();

        assert_eq!(preset.prompts.len(), 4);
        let main = preset.prompt("main").unwrap();
        assert_eq!(main.role, PromptRole::Unknown);
        assert_eq!(main.content, "A");

        let jb = preset.prompt("jb").unwrap();
        assert_eq!(jb.role, PromptRole::System);
        assert_eq!(jb.name, "");

        let nsfw = preset.prompt("nsfw").unwrap();
        assert_eq!(nsfw.injection_position, None);
        assert_eq!(nsfw.injection_depth, None);
        assert_eq!(nsfw.enabled, None);

        assert_eq!(preset.prompts[3].identifier, "");
        assert!(!preset.prompts[3].system_prompt);
        assert_eq!(preset.prompts[3].content, "");
    }

    #[test]
    fn null_content_reads_as_empty() {
        let preset = Preset::from_slice(
            br#"{"prompts": [{"identifier": "chatHistory", "content": null, "marker": true}], "prompt_order": []}"#,
        )
        .unwrap();
        assert_eq!(preset.prompt("chatHistory").unwrap().content, "");
    }

    #[test]
    fn serialized_preset_loads_back() {
        let preset = Preset::try_from(json!({
            "name": "Round",
            "top_k": 40,
            "prompts": [{"identifier": "main", "content": "x"}],
            "prompt_order": [{"character_id": 1, "order": [{"identifier": "main", "enabled": true}]}]
        }))
        .unwrap();

        let json = serde_json::to_string(&preset).unwrap();
        let reloaded: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, preset);
    }
}
