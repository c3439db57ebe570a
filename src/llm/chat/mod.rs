pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use log::warn;
use reqwest::{ Client as HttpClient, RequestBuilder };
use serde_json::Value as JsonValue;
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ ChatReply, LlmConfig, LlmType, ReplyErrorKind };
use self::gemini::GeminiChatClient;
use self::openai::OpenAIChatClient;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends one stateless prompt. Never fails: every failure is folded into the reply.
    async fn complete(&self, prompt: &str) -> ChatReply;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

pub fn build_http_client(
    config: &LlmConfig
) -> Result<HttpClient, Box<dyn StdError + Send + Sync>> {
    let mut builder = HttpClient::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Sends a prepared request and runs `parse` over the JSON body.
/// An error status still goes through `parse` when its body is JSON, so a
/// provider error object reads as "no answer" rather than a failure.
pub async fn send_json(
    request: RequestBuilder,
    parse: fn(&JsonValue) -> ChatReply
) -> ChatReply {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Chat request failed: {}", e);
            return ChatReply::from_reqwest(&e);
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Chat provider returned {}: {}", status, body);
        return match serde_json::from_str::<JsonValue>(&body) {
            Ok(value) => parse(&value),
            Err(_) => ChatReply::Error { kind: ReplyErrorKind::Status(status.as_u16()) },
        };
    }

    match response.json::<JsonValue>().await {
        Ok(body) => parse(&body),
        Err(e) => {
            warn!("Chat provider body could not be decoded: {}", e);
            ChatReply::Error { kind: ReplyErrorKind::Parse }
        }
    }
}
