//! `mythos preset`: Validate and summarize a preset file.

use std::path::Path;

use mythos_core::Preset;
use mythos_engine::PromptSlot;
use mythos_engine::order::{classify, resolve_order};

pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(file).map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let preset = Preset::from_slice(&bytes)
        .map_err(|e| format!("Preset {} rejected: {e}", file.display()))?;

    let order = resolve_order(&preset);
    let enabled = order.iter().filter(|e| e.enabled).count();

    println!("Preset: {}", preset.display_name());
    println!("=======");
    println!("  Fragments:    {}", preset.prompts.len());
    println!("  Order:        {} entries ({enabled} enabled)", order.len());
    if let Some(temperature) = preset.temperature {
        println!("  Temperature:  {temperature}");
    }
    if let Some(top_p) = preset.top_p {
        println!("  Top P:        {top_p}");
    }
    if let Some(top_k) = preset.top_k {
        println!("  Top K:        {top_k}");
    }

    if order.is_empty() {
        println!("\n  ⚠️  Order is empty; turns will use the built-in template");
        return Ok(());
    }

    println!();
    for entry in &order {
        let mark = if entry.enabled { "✅" } else { "  " };
        let kind = match classify(&preset, &entry.identifier) {
            Some(PromptSlot::ChatHistory) => "chat history".to_string(),
            Some(PromptSlot::WorldInfo(_)) => "world info + persona".to_string(),
            Some(PromptSlot::Literal(def)) if def.content.is_empty() => "empty fragment".to_string(),
            Some(PromptSlot::Literal(def)) => format!("{} chars", def.content.chars().count()),
            None => "unresolved, skipped".to_string(),
        };
        println!("  {mark} {:<28} {kind}", entry.identifier);
    }
    println!();

    Ok(())
}
