//! Persona and world records.
//!
//! Both are free-form, user (or model) editable text. The only structure is
//! the [`DataItem`] list used for skills, NPCs and entities.

use serde::{Deserialize, Deserializer, Serialize};

/// A named text block: a skill, an NPC, or a world entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    /// Title
    #[serde(default)]
    pub name: String,

    /// Body
    #[serde(default)]
    pub description: String,
}

impl DataItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The protagonist the player controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub personality: String,
    pub background: String,
    pub appearance: String,
    #[serde(deserialize_with = "lenient_items")]
    pub skills: Vec<DataItem>,
    pub goals: String,
    pub hobbies: String,
}

/// The setting the story takes place in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldInfo {
    pub genre: String,
    pub world_name: String,
    pub world_context: String,
    #[serde(deserialize_with = "lenient_items")]
    pub npcs: Vec<DataItem>,
    #[serde(deserialize_with = "lenient_items")]
    pub entities: Vec<DataItem>,
}

/// Older saves and model output list items as bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemRepr {
    Item(DataItem),
    Text(String),
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<DataItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<ItemRepr>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|item| match item {
            ItemRepr::Item(item) => item,
            ItemRepr::Text(text) => DataItem::new(text, String::new()),
        })
        .collect())
}
