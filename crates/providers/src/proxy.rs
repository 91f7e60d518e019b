//! Reverse-proxy client.
//!
//! Community proxies front the model behind an OpenAI-compatible
//! `/chat/completions` endpoint guarded by an optional password. The prompt
//! goes out as one user message; the system instruction, when present, as a
//! leading system message.

use async_trait::async_trait;
use mythos_core::error::ProviderError;
use mythos_core::provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct ReverseProxyProvider {
    name: String,
    base_url: String,
    password: Option<String>,
    client: reqwest::Client,
}

impl ReverseProxyProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            name: format!("proxy:{}", name.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            password: password.filter(|p| !p.is_empty()),
            client: crate::http_client(),
        }
    }

    fn to_api_messages(request: &ProviderRequest) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(instruction) = &request.system_instruction {
            messages.push(ApiMessage {
                role: "system".into(),
                content: Some(instruction.clone()),
            });
        }
        messages.push(ApiMessage {
            role: "user".into(),
            content: Some(request.prompt.clone()),
        });
        messages
    }

    fn build_body(request: &ProviderRequest) -> serde_json::Value {
        let config = &request.config;
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(request),
            "temperature": config.temperature,
            "stream": false,
        });

        if let Some(top_p) = config.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if let Some(top_k) = config.top_k {
            body["top_k"] = serde_json::json!(top_k);
        }

        if let Some(max_tokens) = config.max_output_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if request.response_format == ResponseFormat::Json {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }
}

#[async_trait]
impl Provider for ReverseProxyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_body(&request);

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(password) = &self.password {
            builder = builder.header("Authorization", format!("Bearer {password}"));
        }

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Proxy returned error");
            return Err(crate::status_error(status, error_body, &request.model));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".into()))?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            text,
            usage,
            model: api_response.model.unwrap_or(request.model),
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let mut builder = self.client.get(&url);
        if let Some(password) = &self.password {
            builder = builder.header("Authorization", format!("Bearer {password}"));
        }
        let response = builder.send().await.map_err(crate::transport_error)?;
        Ok(response.status().is_success())
    }
}

// --- OpenAI-compatible API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
