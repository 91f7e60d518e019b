//! `mythos author`: Model-assisted persona and world authoring.
//!
//! Results are written into the session only after the model call and the
//! parse both succeed.

use std::path::PathBuf;

use mythos_config::AppConfig;
use mythos_core::{DataItem, Persona};
use mythos_engine::{ItemKind, PersonaAuthor, PersonaField};

use super::session_file;
use crate::{AuthorTarget, ItemKindArg};

pub async fn run(
    target: AuthorTarget,
    session_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let provider = mythos_providers::build_from_config(&config)?;
    let author = PersonaAuthor::from_config(provider, &config);

    let session_path = session_path.as_deref();
    let mut session = session_file::load(session_path)?;

    let notice = |e: mythos_core::GenerationError| format!("{} ({e})", e.user_notice());

    match target {
        AuthorTarget::Persona { idea } => {
            let persona = author.generate_persona(&idea).await.map_err(notice)?;
            print_persona(&persona);
            session.persona = persona;
        }
        AuthorTarget::Field { field } => {
            let field = PersonaField::from_key(&field)
                .ok_or_else(|| format!("Unknown persona field `{field}`"))?;
            let current = current_value(&session.persona, field);
            let text = author
                .suggest_field(&session.persona, field, &current)
                .await
                .map_err(notice)?;
            println!("{text}");
            assign_field(&mut session.persona, field, text);
        }
        AuthorTarget::Items { kind, hint } => {
            let kind = match kind {
                ItemKindArg::Skills => ItemKind::Skill,
                ItemKindArg::Npcs => ItemKind::Npc,
                ItemKindArg::Entities => ItemKind::Entity,
            };
            let items = author
                .generate_items(kind, &session.persona, &session.world_info, &hint)
                .await
                .map_err(notice)?;
            for item in &items {
                println!("  • {}: {}", item.name, item.description);
            }
            target_list(&mut session, kind).extend(items);
        }
    }

    if session_path.is_some() {
        session_file::save(session_path, &session)?;
        println!("\n✅ Session updated");
    }
    Ok(())
}

fn target_list(session: &mut mythos_core::GameSession, kind: ItemKind) -> &mut Vec<DataItem> {
    match kind {
        ItemKind::Skill => &mut session.persona.skills,
        ItemKind::Npc => &mut session.world_info.npcs,
        ItemKind::Entity => &mut session.world_info.entities,
    }
}

fn current_value(persona: &Persona, field: PersonaField) -> String {
    match field {
        PersonaField::Name => persona.name.clone(),
        PersonaField::Age => persona.age.clone(),
        PersonaField::Gender => persona.gender.clone(),
        PersonaField::Personality => persona.personality.clone(),
        PersonaField::Background => persona.background.clone(),
        PersonaField::Appearance => persona.appearance.clone(),
        PersonaField::Skills => persona
            .skills
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PersonaField::Goals => persona.goals.clone(),
        PersonaField::Hobbies => persona.hobbies.clone(),
    }
}

fn assign_field(persona: &mut Persona, field: PersonaField, text: String) {
    match field {
        PersonaField::Name => persona.name = text,
        PersonaField::Age => persona.age = text,
        PersonaField::Gender => persona.gender = text,
        PersonaField::Personality => persona.personality = text,
        PersonaField::Background => persona.background = text,
        PersonaField::Appearance => persona.appearance = text,
        // A suggested skill is one new entry, not a replacement list.
        PersonaField::Skills => persona.skills.push(DataItem::new(text, String::new())),
        PersonaField::Goals => persona.goals = text,
        PersonaField::Hobbies => persona.hobbies = text,
    }
}

fn print_persona(persona: &Persona) {
    println!("  Name:        {}", persona.name);
    println!("  Age:         {}", persona.age);
    println!("  Gender:      {}", persona.gender);
    println!("  Personality: {}", persona.personality);
    println!("  Background:  {}", persona.background);
    println!("  Appearance:  {}", persona.appearance);
    for skill in &persona.skills {
        println!("  Skill:       {} {}", skill.name, skill.description);
    }
    println!("  Goals:       {}", persona.goals);
    println!("  Hobbies:     {}", persona.hobbies);
}
