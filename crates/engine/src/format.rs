//! Render persona and world records as tagged text blocks.
//!
//! Field text is spliced in as-is. Nothing is escaped, so a description
//! containing `<` or `"` reaches the model exactly as the user wrote it.

use mythos_core::{DataItem, Persona, WorldInfo};

fn tagged_items(items: &[DataItem], tag: &str) -> String {
    items
        .iter()
        .map(|item| format!("<{tag} name=\"{}\">{}</{tag}>", item.name, item.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<world_setting>`, `<npcs>` and `<entities>` blocks for the world.
pub fn format_world_info(world: &WorldInfo) -> String {
    format!(
        "<world_setting>\n  <genre>{}</genre>\n  <world_name>{}</world_name>\n  <context>{}</context>\n</world_setting>\n<npcs>\n  {}\n</npcs>\n<entities>\n  {}\n</entities>",
        world.genre,
        world.world_name,
        world.world_context,
        tagged_items(&world.npcs, "npc"),
        tagged_items(&world.entities, "entity"),
    )
}

/// A `<user_info>` block with every persona field and one tag per skill.
pub fn format_persona(persona: &Persona) -> String {
    format!(
        "<user_info>\n  <name>{}</name>\n  <age>{}</age>\n  <gender>{}</gender>\n  <personality>{}</personality>\n  <background>{}</background>\n  <appearance>{}</appearance>\n  <skills>\n    {}\n  </skills>\n  <goals>{}</goals>\n  <hobbies>{}</hobbies>\n</user_info>",
        persona.name,
        persona.age,
        persona.gender,
        persona.personality,
        persona.background,
        persona.appearance,
        tagged_items(&persona.skills, "skill"),
        persona.goals,
        persona.hobbies,
    )
}
