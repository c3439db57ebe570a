use async_trait::async_trait;
use std::error::Error as StdError;
use serde::Serialize;
use serde_json::Value as JsonValue;
use reqwest::Client as HttpClient;
use log::info;

use super::{ build_http_client, send_json, ChatClient };
use crate::llm::{ ChatReply, LlmConfig };

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const SYSTEM_PROMPT: &str = "You are a helpful and friendly cooking assistant.";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RoleMessage<'a>>,
}

#[derive(Serialize)]
struct RoleMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Extracts `choices[0].message.content`.
pub fn parse_openai_response(body: &JsonValue) -> ChatReply {
    ChatReply::from_text(
        body.pointer("/choices/0/message/content").and_then(JsonValue::as_str)
    )
}

pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIChatClient {
    pub fn new(
        http: HttpClient,
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Self {
        Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "OpenAI API key is required for OpenAIChatClient".to_string())?;
        let http = build_http_client(config)?;

        Ok(Self::new(http, api_key, config.completion_model.clone(), config.base_url.clone()))
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, prompt: &str) -> ChatReply {
        info!("OpenAIChatClient::complete() → model={} base_url={}", self.model, self.base_url);
        let payload = CompletionRequest {
            model: &self.model,
            messages: vec![
                RoleMessage { role: "system", content: SYSTEM_PROMPT },
                RoleMessage { role: "user", content: prompt }
            ],
        };
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let request = self.http.post(url).bearer_auth(&self.api_key).json(&payload);

        send_json(request, parse_openai_response).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
