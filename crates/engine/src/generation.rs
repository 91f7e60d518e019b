//! Model-assisted authoring of personas and world items.
//!
//! Every call returns a fresh value and touches no session. The caller
//! assigns the result only once it has it, so a failed or garbled generation
//! never leaves a half-filled persona behind.

use std::sync::Arc;

use mythos_config::AppConfig;
use mythos_core::error::GenerationError;
use mythos_core::provider::{GenerationConfig, Provider, ProviderRequest, ResponseFormat};
use mythos_core::{DataItem, Persona, WorldInfo};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Instruction sent with every authoring request.
pub const AUTHOR_INSTRUCTION: &str = "Bạn là trợ lý viết sáng tạo cho game nhập vai (RPG). Nhiệm vụ của bạn là giúp người dùng tạo ra hồ sơ nhân vật chi tiết và hấp dẫn.
QUY TẮC TUYỆT ĐỐI:
1. Chỉ xuất ra nội dung văn bản thuần túy bằng tiếng Việt.
2. KHÔNG bao gồm các câu dẫn dắt như \"Đây là mô tả...\", \"Dựa trên ý tưởng của bạn...\".
3. Nếu người dùng đã nhập liệu, hãy MỞ RỘNG và TRAU CHUỐT nó, KHÔNG thay thế hoàn toàn ý tưởng gốc.
4. Giữ văn phong huyền bí, thanh lịch hoặc phù hợp với bối cảnh nhân vật.";

/// A single persona field the author can write or polish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaField {
    Name,
    Age,
    Gender,
    Personality,
    Background,
    Appearance,
    Skills,
    Goals,
    Hobbies,
}

impl PersonaField {
    pub const ALL: [PersonaField; 9] = [
        Self::Name,
        Self::Age,
        Self::Gender,
        Self::Personality,
        Self::Background,
        Self::Appearance,
        Self::Skills,
        Self::Goals,
        Self::Hobbies,
    ];

    /// Field key as it appears in persona JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Personality => "personality",
            Self::Background => "background",
            Self::Appearance => "appearance",
            Self::Skills => "skills",
            Self::Goals => "goals",
            Self::Hobbies => "hobbies",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Which list a batch of generated items is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Skill,
    Npc,
    Entity,
}

impl ItemKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Skill => "kỹ năng đặc biệt của nhân vật chính",
            Self::Npc => "nhân vật phụ (NPC) sống trong thế giới",
            Self::Entity => "thực thể của thế giới (phe phái, địa danh, vật phẩm, tổ chức)",
        }
    }
}

/// Writes persona and world content through a [`Provider`].
pub struct PersonaAuthor {
    provider: Arc<dyn Provider>,
    model: String,
    config: GenerationConfig,
}

impl PersonaAuthor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            config: GenerationConfig::default(),
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.model.clone())
            .with_generation_config(config.generation.to_generation_config())
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    async fn ask(&self, prompt: String, format: ResponseFormat) -> Result<String, GenerationError> {
        let request = ProviderRequest::new(self.model.clone(), prompt)
            .with_system_instruction(AUTHOR_INSTRUCTION)
            .with_config(self.config.clone())
            .with_response_format(format);

        debug!(format = format.mime_type(), "Sending authoring request");
        let response = self.provider.generate(request).await.map_err(|e| {
            warn!(error = %e, "Authoring request failed");
            GenerationError::from(e)
        })?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    /// Build a whole persona from a short idea.
    pub async fn generate_persona(&self, idea: &str) -> Result<Persona, GenerationError> {
        let prompt = format!(
            "Hãy tạo một hồ sơ nhân vật đầy đủ dựa trên ý tưởng sau: \"{idea}\".\n\
             Trả về kết quả dưới dạng JSON (không dùng Markdown code block) với các trường sau:\n\
             name, age, gender, personality, background, appearance, skills (mảng chuỗi), goals, hobbies."
        );

        let text = self.ask(prompt, ResponseFormat::Json).await?;
        let value = parse_json(&text)?;
        if !value.is_object() {
            return Err(GenerationError::MalformedOutput(
                "expected a JSON object for the persona".into(),
            ));
        }

        let persona: Persona = serde_json::from_value(value)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;
        info!(name = %persona.name, skills = persona.skills.len(), "Generated persona");
        Ok(persona)
    }

    /// Write a fresh value for `field`, or polish `current_value` when the
    /// user already typed something.
    pub async fn suggest_field(
        &self,
        persona: &Persona,
        field: PersonaField,
        current_value: &str,
    ) -> Result<String, GenerationError> {
        let mut context = format!(
            "THÔNG TIN NHÂN VẬT HIỆN TẠI:\n- Tên: {}\n- Tuổi: {}\n- Giới tính: {}\n",
            persona.name, persona.age, persona.gender
        );
        if !persona.personality.is_empty() {
            context.push_str(&format!("- Tính cách: {}\n", persona.personality));
        }
        if !persona.background.is_empty() {
            context.push_str(&format!("- Tiền sử: {}\n", persona.background));
        }

        let prompt = format!(
            "{context}\nYÊU CẦU:\nHãy viết nội dung cho trường: \"{}\".\n\
             Giá trị hiện tại của người dùng (nếu có): \"{current_value}\".\n\n\
             HƯỚNG DẪN:\n\
             - Nếu giá trị hiện tại trống: Hãy sáng tạo nội dung mới phù hợp với Tên, Tuổi, Giới tính đã cung cấp.\n\
             - Nếu giá trị hiện tại có nội dung: Hãy viết lại đoạn đó cho hay hơn, chi tiết hơn, văn phong cuốn hút hơn, nhưng giữ nguyên ý chính.\n\
             - Đối với trường 'skills': Chỉ gợi ý 1 kỹ năng đặc biệt hoặc mô tả ngắn gọn về khả năng.",
            field.key()
        );

        let text = self.ask(prompt, ResponseFormat::PlainText).await?;
        debug!(field = field.key(), chars = text.len(), "Suggested field value");
        Ok(text)
    }

    /// Generate a batch of skills, NPCs or entities fitting the persona and world.
    pub async fn generate_items(
        &self,
        kind: ItemKind,
        persona: &Persona,
        world: &WorldInfo,
        hint: &str,
    ) -> Result<Vec<DataItem>, GenerationError> {
        let mut prompt = format!(
            "BỐI CẢNH:\n- Thể loại: {}\n- Thế giới: {}\n- Mô tả thế giới: {}\n- Nhân vật chính: {} ({})\n\n\
             YÊU CẦU:\nHãy tạo danh sách {} phù hợp với bối cảnh trên.\n",
            world.genre,
            world.world_name,
            world.world_context,
            persona.name,
            persona.personality,
            kind.describe()
        );
        if !hint.trim().is_empty() {
            prompt.push_str(&format!("Gợi ý của người dùng: \"{}\".\n", hint.trim()));
        }
        prompt.push_str(
            "Trả về JSON (không dùng Markdown code block) dạng {\"items\": [{\"name\": \"...\", \"description\": \"...\"}]}.",
        );

        let text = self.ask(prompt, ResponseFormat::Json).await?;
        let items = parse_items(&parse_json(&text)?)?;
        info!(kind = ?kind, count = items.len(), "Generated items");
        Ok(items)
    }
}

/// Parse model JSON, tolerating a surrounding Markdown code fence.
fn parse_json(text: &str) -> Result<Value, GenerationError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GenerationError::MalformedOutput(format!("invalid JSON: {e}")))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Accepts a bare array or an object holding the array under `items` (or
/// under its only array-valued key). Elements may be objects or strings.
fn parse_items(value: &Value) -> Result<Vec<DataItem>, GenerationError> {
    let list = match value {
        Value::Array(list) => list,
        Value::Object(map) => map
            .get("items")
            .and_then(Value::as_array)
            .or_else(|| map.values().find_map(Value::as_array))
            .ok_or_else(|| GenerationError::MalformedOutput("no item list in response".into()))?,
        _ => {
            return Err(GenerationError::MalformedOutput(
                "expected a JSON list of items".into(),
            ));
        }
    };

    list.iter()
        .enumerate()
        .map(|(index, raw)| match raw {
            Value::String(name) => Ok(DataItem::new(name.clone(), String::new())),
            Value::Object(_) => serde_json::from_value::<DataItem>(raw.clone())
                .map_err(|e| GenerationError::MalformedOutput(format!("item #{index}: {e}"))),
            _ => Err(GenerationError::MalformedOutput(format!(
                "item #{index} is neither text nor an object"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use mythos_core::error::ProviderError;

    fn author(provider: Arc<ScriptedProvider>) -> PersonaAuthor {
        PersonaAuthor::new(provider, "gemini-3-pro-preview")
    }

    #[tokio::test]
    async fn persona_from_idea_accepts_string_skills() {
        let provider = Arc::new(ScriptedProvider::single_text(
            r#"{"name":"Luna","age":"19","gender":"Nữ","personality":"Lạnh lùng",
                "background":"Hacker","appearance":"Tóc bạc","skills":["Hacking","Stealth"],
                "goals":"Tự do","hobbies":"Đọc sách"}"#,
        ));
        let persona = author(provider.clone())
            .generate_persona("nữ hacker cyberpunk")
            .await
            .unwrap();

        assert_eq!(persona.name, "Luna");
        assert_eq!(persona.skills, vec![
            DataItem::new("Hacking", ""),
            DataItem::new("Stealth", ""),
        ]);

        let request = &provider.requests()[0];
        assert_eq!(request.response_format, ResponseFormat::Json);
        assert_eq!(request.system_instruction.as_deref(), Some(AUTHOR_INSTRUCTION));
        assert!(request.prompt.contains("nữ hacker cyberpunk"));
    }

    #[tokio::test]
    async fn persona_tolerates_code_fence() {
        let provider = Arc::new(ScriptedProvider::single_text(
            "```json\n{\"name\":\"Kai\",\"skills\":[{\"name\":\"Blade\",\"description\":\"Fast\"}]}\n```",
        ));
        let persona = author(provider).generate_persona("samurai").await.unwrap();
        assert_eq!(persona.name, "Kai");
        assert_eq!(persona.skills[0].description, "Fast");
    }

    #[tokio::test]
    async fn non_json_persona_is_malformed() {
        let provider = Arc::new(ScriptedProvider::single_text("Đây là nhân vật của bạn..."));
        let err = author(provider).generate_persona("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn json_array_is_not_a_persona() {
        let provider = Arc::new(ScriptedProvider::single_text("[1, 2]"));
        let err = author(provider).generate_persona("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::RateLimited {
            retry_after_secs: 5,
        }));
        let err = author(provider).generate_persona("x").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Provider(ProviderError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn blank_reply_is_empty_response() {
        let provider = Arc::new(ScriptedProvider::single_text("  \n "));
        let persona = Persona::default();
        let err = author(provider)
            .suggest_field(&persona, PersonaField::Goals, "")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn suggest_field_sends_context_and_current_value() {
        let provider = Arc::new(ScriptedProvider::single_text("  Một quá khứ bí ẩn.  "));
        let persona = Persona {
            name: "Luna".into(),
            personality: "Lạnh lùng".into(),
            ..Persona::default()
        };

        let text = author(provider.clone())
            .suggest_field(&persona, PersonaField::Background, "mồ côi")
            .await
            .unwrap();

        assert_eq!(text, "Một quá khứ bí ẩn.");
        let request = &provider.requests()[0];
        assert_eq!(request.response_format, ResponseFormat::PlainText);
        assert!(request.prompt.contains("- Tên: Luna"));
        assert!(request.prompt.contains("- Tính cách: Lạnh lùng"));
        assert!(!request.prompt.contains("- Tiền sử:"));
        assert!(request.prompt.contains("\"background\""));
        assert!(request.prompt.contains("\"mồ côi\""));
    }

    #[tokio::test]
    async fn items_from_wrapped_object() {
        let provider = Arc::new(ScriptedProvider::single_text(
            r#"{"items":[{"name":"Kai","description":"Bartender"},"Mei"]}"#,
        ));
        let world = WorldInfo {
            genre: "Cyberpunk".into(),
            ..WorldInfo::default()
        };
        let items = author(provider.clone())
            .generate_items(ItemKind::Npc, &Persona::default(), &world, "quán bar")
            .await
            .unwrap();

        assert_eq!(items, vec![DataItem::new("Kai", "Bartender"), DataItem::new("Mei", "")]);
        let prompt = &provider.requests()[0].prompt;
        assert!(prompt.contains("Cyberpunk"));
        assert!(prompt.contains("quán bar"));
    }

    #[tokio::test]
    async fn items_from_bare_array() {
        let provider = Arc::new(ScriptedProvider::single_text(
            r#"[{"name":"Arasaka","description":"Megacorp"}]"#,
        ));
        let items = author(provider)
            .generate_items(ItemKind::Entity, &Persona::default(), &WorldInfo::default(), "")
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn one_bad_item_rejects_the_batch() {
        let provider = Arc::new(ScriptedProvider::single_text(r#"{"items":["ok", 42]}"#));
        let err = author(provider)
            .generate_items(ItemKind::Skill, &Persona::default(), &WorldInfo::default(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(m) if m.contains("#1")));
    }

    #[test]
    fn fence_stripping() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn field_keys_round_trip() {
        for field in PersonaField::ALL {
            assert_eq!(PersonaField::from_key(field.key()), Some(field));
        }
        assert_eq!(PersonaField::from_key("nickname"), None);
    }
}
