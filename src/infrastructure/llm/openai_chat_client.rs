use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::application::ports::{
    CompletionChoice, CompletionRequest, CompletionResponse, LlmClient, LlmClientError,
};
use crate::domain::{Message, MessageRole};
use crate::presentation::config::LlmSettings;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAuth {
    Bearer(String),
    AzureApiKey { key: String, api_version: String },
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    auth: ChatAuth,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(client: Client, base_url: impl Into<String>, auth: ChatAuth) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            ChatAuth::Bearer(key) => request.header("Authorization", format!("Bearer {}", key)),
            ChatAuth::AzureApiKey { key, api_version } => request
                .header("api-key", key)
                .query(&[("api-version", api_version)]),
        }
    }

    fn to_wire(request: &CompletionRequest) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role().api_name(),
                    content: m.content(),
                })
                .collect(),
            max_tokens: request.max_tokens,
        }
    }
}

impl ChatCompletionResponse {
    fn into_completion(self) -> Result<CompletionResponse, LlmClientError> {
        let choices = self
            .choices
            .into_iter()
            .map(|choice| {
                let role = match choice.message.role {
                    Some(role) => role
                        .parse::<MessageRole>()
                        .map_err(LlmClientError::InvalidResponse)?,
                    None => MessageRole::Assistant,
                };
                Ok(CompletionChoice {
                    message: Message::new(role, choice.message.content.unwrap_or_default()),
                })
            })
            .collect::<Result<Vec<_>, LlmClientError>>()?;

        Ok(CompletionResponse { choices })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmClientError> {
        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&Self::to_wire(request));

        let response = self
            .apply_auth(http_request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            choices = completion_response.choices.len(),
            "Chat completion received"
        );

        completion_response.into_completion()
    }
}

pub fn create_llm_client(settings: &LlmSettings) -> Result<OpenAiChatClient, LlmClientError> {
    let (base_url, auth) = match settings.provider.as_str() {
        "openai" => (
            OPENAI_BASE_URL.to_string(),
            ChatAuth::Bearer(settings.api_key.clone()),
        ),
        "lmstudio" => {
            let base_url = settings.base_url.clone().ok_or_else(|| {
                LlmClientError::Configuration(
                    "base_url required for lmstudio provider".to_string(),
                )
            })?;
            (base_url, ChatAuth::Bearer(settings.api_key.clone()))
        }
        "azure" => {
            let endpoint = settings.azure_endpoint.as_ref().ok_or_else(|| {
                LlmClientError::Configuration(
                    "azure_endpoint required for azure provider".to_string(),
                )
            })?;
            (
                format!(
                    "{}/openai/deployments/{}",
                    endpoint.trim_end_matches('/'),
                    settings.chat_model
                ),
                ChatAuth::AzureApiKey {
                    key: settings.api_key.clone(),
                    api_version: settings
                        .api_version
                        .clone()
                        .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
                },
            )
        }
        _ => {
            return Err(LlmClientError::Configuration(format!(
                "unknown provider: {}",
                settings.provider
            )));
        }
    };

    let mut builder = Client::builder();
    if let Some(seconds) = settings.request_timeout_seconds {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    let client = builder
        .build()
        .map_err(|e| LlmClientError::Configuration(e.to_string()))?;

    Ok(OpenAiChatClient::new(client, base_url, auth))
}
