//! `mythos render`: Show the prompt a turn would send.
//!
//! The input is appended to a copy of the session first, exactly as a real
//! turn would, so the chat history section includes it.

use std::path::PathBuf;

use mythos_config::AppConfig;
use mythos_core::Message;
use mythos_engine::PromptBuilder;

use super::session_file;

pub fn run(
    input: &str,
    preset: Option<PathBuf>,
    session_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let mut session = session_file::load_with_preset(session_path.as_deref(), preset.as_deref())?;

    session.push(Message::user(input));
    let prompt = PromptBuilder::new(config.session.history_limit).construct_prompt(&session, input);

    println!("{prompt}");
    Ok(())
}
