//! `mythos chat`: Single-message or interactive play.

use std::io::Write;
use std::path::PathBuf;

use mythos_config::AppConfig;
use mythos_core::GameSession;
use mythos_engine::{NARRATOR, TurnHandler};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::session_file;

pub async fn run(
    preset: Option<PathBuf>,
    session_path: Option<PathBuf>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check credentials early: give a clear error
    if !config.has_credentials() {
        eprintln!();
        eprintln!("  ERROR: No API key or proxy configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export GEMINI_API_KEY='AIza...'");
        eprintln!("    export MYTHOS_API_KEY='AIza...'");
        eprintln!();
        eprintln!("  Or add `api_key` or a [proxy] section to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No credentials found. See above for setup instructions.".into());
    }

    let provider = mythos_providers::build_from_config(&config)?;
    let turns = TurnHandler::from_config(provider, &config);

    let session_path = session_path.as_deref();
    let mut session = session_file::load_with_preset(session_path, preset.as_deref())?;

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let outcome = turns.run(&mut session, &msg).await;
        eprint!("\r              \r");
        session_file::save(session_path, &session)?;
        let outcome = outcome.map_err(|e| format!("{} ({e})", e.user_notice()))?;
        println!("{}", outcome.reply);
        return Ok(());
    }

    // Interactive mode
    print_banner(&config, &session);

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt_marker()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {
                prompt_marker()?;
                continue;
            }
            "exit" | "quit" | "/exit" | "/quit" => break,
            "/clear" => {
                session.clear_history();
                session_file::save(session_path, &session)?;
                println!("  History cleared.\n");
                prompt_marker()?;
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let outcome = turns.run(&mut session, line).await;
        eprint!("\r     \r");

        match outcome {
            Ok(outcome) => {
                println!();
                for reply_line in outcome.reply.lines() {
                    println!("  {NARRATOR} > {reply_line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [{}] {e}", e.user_notice());
                println!();
            }
        }
        session_file::save(session_path, &session)?;
        prompt_marker()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn print_banner(config: &AppConfig, session: &GameSession) {
    let preset = session
        .active_preset
        .as_ref()
        .map_or("(built-in template)", |p| p.display_name());
    let persona = if session.persona.name.is_empty() {
        "(unnamed)"
    } else {
        session.persona.name.as_str()
    };

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║            Mythos — Interactive Play         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Preset:    {preset}");
    println!("  Persona:   {persona}");
    println!("  History:   {} messages", session.messages().len());
    println!();
    println!("  Type your line and press Enter.");
    println!("  /clear wipes the history, /exit quits.");
    println!();
}

fn prompt_marker() -> std::io::Result<()> {
    print!("  Master > ");
    std::io::stdout().flush()
}
