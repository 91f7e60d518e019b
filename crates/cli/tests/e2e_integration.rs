//! End-to-end integration tests for Mythos.
//!
//! These tests drive the full pipeline from a preset file on disk through
//! prompt construction, a scripted model, and the session update, then
//! persist and reload the session.

use std::sync::{Arc, Mutex};

use mythos_config::AppConfig;
use mythos_core::error::{ProviderError, TurnError};
use mythos_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use mythos_core::{DataItem, GameSession, Persona, Role, WorldInfo};
use mythos_engine::{ItemKind, PersonaAuthor, PromptBuilder, TurnHandler};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted results in sequence and keeps
/// the prompts it was sent.
struct ScriptedProvider {
    results: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            panic!("ScriptedProvider exhausted");
        }
        self.prompts.lock().unwrap().push(request.prompt);
        results.remove(0)
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        text: text.to_string(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

const TAWA_PRESET: &str = r#"{
    "name": "Tawa",
    "temperature": 1.0,
    "top_p": 0.98,
    "prompts": [
        {"identifier": "main", "name": "Main", "role": "system", "system_prompt": true,
         "content": "{{char}} narrates a story for {{user}}."},
        {"identifier": "jailbreak", "name": "JB", "role": "system", "content": "SHOULD_NOT_APPEAR"},
        {"identifier": "chatHistory", "name": "Chat History", "system_prompt": true, "marker": true},
        {"identifier": "worldInfoBefore", "name": "World Info (before)", "marker": true}
    ],
    "prompt_order": [
        {"character_id": 100000, "order": [
            {"identifier": "worldInfoBefore", "enabled": true},
            {"identifier": "main", "enabled": true},
            {"identifier": "jailbreak", "enabled": false},
            {"identifier": "chatHistory", "enabled": true}
        ]},
        {"character_id": 100001, "order": [
            {"identifier": "jailbreak", "enabled": true}
        ]}
    ]
}"#;

fn luna_session() -> GameSession {
    GameSession::new(
        Persona {
            name: "Luna".into(),
            age: "19".into(),
            skills: vec![DataItem::new("Hacking", "Breaks ICE")],
            ..Persona::default()
        },
        WorldInfo {
            genre: "Cyberpunk".into(),
            world_name: "Neo Saigon".into(),
            npcs: vec![DataItem::new("Kai", "Bartender")],
            ..WorldInfo::default()
        },
    )
}

#[tokio::test]
async fn preset_file_to_session_update() {
    let dir = tempfile::tempdir().unwrap();
    let preset_path = dir.path().join("tawa.json");
    std::fs::write(&preset_path, TAWA_PRESET).unwrap();

    let mut session = luna_session();
    session
        .load_preset_bytes(&std::fs::read(&preset_path).unwrap())
        .unwrap();

    let provider = Arc::new(ScriptedProvider::texts(&["Mưa rơi trên bảng hiệu neon."]));
    let turns = TurnHandler::new(provider.clone(), "gemini-3-pro-preview");

    let outcome = turns
        .run(&mut session, "Tôi bước vào quán bar.")
        .await
        .unwrap();
    assert_eq!(outcome.reply, "Mưa rơi trên bảng hiệu neon.");

    let prompt = &provider.prompts()[0];
    let world = prompt.find("<genre>Cyberpunk</genre>").unwrap();
    let main = prompt.find("Tawa narrates a story for Luna.").unwrap();
    let history = prompt.find("<chathistory>\nMaster: Tôi bước vào quán bar.\n</chathistory>").unwrap();
    assert!(world < main && main < history);
    assert!(prompt.contains("<npc name=\"Kai\">Bartender</npc>"));
    assert!(!prompt.contains("SHOULD_NOT_APPEAR"));
    assert!(prompt.ends_with("\nMaster: Tôi bước vào quán bar.\nTawa:"));

    let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Model]);
}

#[tokio::test]
async fn session_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");

    let mut session = luna_session();
    session.load_preset_bytes(TAWA_PRESET.as_bytes()).unwrap();

    let provider = Arc::new(ScriptedProvider::texts(&["first reply", "second reply"]));
    let turns = TurnHandler::new(provider.clone(), "gemini-3-pro-preview");
    turns.run(&mut session, "one").await.unwrap();

    std::fs::write(&session_path, serde_json::to_string_pretty(&session).unwrap()).unwrap();
    let raw = std::fs::read_to_string(&session_path).unwrap();
    assert!(raw.contains("\"worldInfo\""));
    assert!(raw.contains("\"activePreset\""));
    assert!(!raw.contains("isProcessing"));

    let mut restored: GameSession = serde_json::from_str(&raw).unwrap();
    assert_eq!(restored.messages(), session.messages());
    assert_eq!(restored.active_preset, session.active_preset);

    turns.run(&mut restored, "two").await.unwrap();
    let second_prompt = &provider.prompts()[1];
    assert!(second_prompt.contains("Master: one\n\nTawa: first reply\n\nMaster: two"));
    assert_eq!(restored.messages().len(), 4);
}

#[tokio::test]
async fn failed_turn_then_retry() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderError::ApiError {
            status_code: 500,
            message: "upstream".into(),
        }),
        Ok(text_response("Đã kết nối lại.")),
    ]));
    let turns = TurnHandler::new(provider, "gemini-3-pro-preview");
    let mut session = luna_session();

    let err = turns.run(&mut session, "hello").await.unwrap_err();
    assert!(matches!(err, TurnError::Provider(_)));
    assert!(!err.user_notice().is_empty());
    assert_eq!(session.messages().len(), 1);
    assert!(!session.is_processing());

    turns.run(&mut session, "hello").await.unwrap();
    let contents: Vec<_> = session.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hello", "hello", "Đã kết nối lại."]);
}

#[test]
fn rejected_preset_keeps_active_one() {
    let mut session = luna_session();
    session.load_preset_bytes(TAWA_PRESET.as_bytes()).unwrap();

    assert!(session.load_preset_bytes(b"not json").is_err());
    assert!(session.load_preset_bytes(br#"{"prompt_order": []}"#).is_err());
    assert_eq!(
        session.active_preset.as_ref().map(|p| p.display_name()),
        Some("Tawa")
    );
}

#[test]
fn config_history_limit_bounds_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[session]\nhistory_limit = 2\n").unwrap();
    let config = AppConfig::load_from(&config_path).unwrap();

    let mut session = luna_session();
    for i in 0..6 {
        session.push(mythos_core::Message::user(format!("line {i}")));
    }

    let prompt =
        PromptBuilder::new(config.session.history_limit).construct_prompt(&session, "hello");
    assert!(prompt.contains("hello"));
    assert!(prompt.contains("Master: line 4\n\nMaster: line 5"));
    assert!(!prompt.contains("line 3"));
}

#[tokio::test]
async fn generated_npcs_added_only_on_success() {
    let provider = Arc::new(ScriptedProvider::texts(&[
        r#"{"items": [{"name": "Mei", "description": "Fixer"}]}"#,
        "not json at all",
    ]));
    let author = PersonaAuthor::new(provider, "gemini-3-pro-preview");
    let mut session = luna_session();

    let items = author
        .generate_items(ItemKind::Npc, &session.persona, &session.world_info, "")
        .await
        .unwrap();
    session.world_info.npcs.extend(items);
    assert_eq!(session.world_info.npcs.len(), 2);

    let result = author
        .generate_items(ItemKind::Npc, &session.persona, &session.world_info, "")
        .await;
    assert!(result.is_err());
    assert_eq!(session.world_info.npcs.len(), 2);
}
