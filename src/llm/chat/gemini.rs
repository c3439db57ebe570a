use async_trait::async_trait;
use std::error::Error as StdError;
use serde::Serialize;
use serde_json::Value as JsonValue;
use reqwest::Client as HttpClient;
use log::info;

use super::{ build_http_client, send_json, ChatClient };
use crate::llm::{ ChatReply, LlmConfig };

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

/// Extracts `candidates[0].content.parts[0].text`.
pub fn parse_gemini_response(body: &JsonValue) -> ChatReply {
    ChatReply::from_text(
        body.pointer("/candidates/0/content/parts/0/text").and_then(JsonValue::as_str)
    )
}

pub struct GeminiChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
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
            .ok_or_else(|| "Google API key is required for GeminiChatClient".to_string())?;
        let http = build_http_client(config)?;

        Ok(Self::new(http, api_key, config.completion_model.clone(), config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, prompt: &str) -> ChatReply {
        info!("GeminiChatClient::complete() → model={} base_url={}", self.model, self.base_url);
        let payload = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt.to_string() }],
            }],
        };
        let request = self.http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload);

        send_json(request, parse_gemini_response).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
