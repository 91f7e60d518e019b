//! Session and preset files on disk.
//!
//! Sessions are plain JSON in the camelCase shape of `GameSession`. A
//! missing session file starts a fresh session.

use std::path::Path;

use mythos_core::GameSession;
use tracing::{debug, info};

pub fn load(path: Option<&Path>) -> Result<GameSession, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(GameSession::default());
    };
    if !path.exists() {
        info!(path = %path.display(), "No session file yet; starting fresh");
        return Ok(GameSession::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read session {}: {e}", path.display()))?;
    let session: GameSession = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse session {}: {e}", path.display()))?;
    debug!(path = %path.display(), messages = session.messages().len(), "Loaded session");
    Ok(session)
}

pub fn save(path: Option<&Path>, session: &GameSession) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(session)?)?;
    debug!(path = %path.display(), "Saved session");
    Ok(())
}

/// Load a session, then replace its preset with the one at `preset` if given.
///
/// A rejected preset is an error here: the CLI has no earlier preset to fall
/// back on that the user would expect to keep.
pub fn load_with_preset(
    session_path: Option<&Path>,
    preset_path: Option<&Path>,
) -> Result<GameSession, Box<dyn std::error::Error>> {
    let mut session = load(session_path)?;
    if let Some(preset_path) = preset_path {
        let bytes = std::fs::read(preset_path)
            .map_err(|e| format!("Failed to read preset {}: {e}", preset_path.display()))?;
        session
            .load_preset_bytes(&bytes)
            .map_err(|e| format!("Preset {} rejected: {e}", preset_path.display()))?;
    }
    Ok(session)
}
