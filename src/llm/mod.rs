pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use std::time::Duration;

pub const NO_ANSWER_TEXT: &str = "Sorry, I couldn't understand that.";
pub const FAILURE_TEXT: &str = "Something went wrong.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    Gemini,
    OpenAI,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}
impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(LlmType::Gemini),
            "openai" => Ok(LlmType::OpenAI),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Gemini,
            api_key: None,
            completion_model: None,
            base_url: None,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyErrorKind {
    Transport,
    Timeout,
    Status(u16),
    Parse,
}

impl fmt::Display for ReplyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyErrorKind::Transport => write!(f, "transport failure"),
            ReplyErrorKind::Timeout => write!(f, "request timed out"),
            ReplyErrorKind::Status(code) => write!(f, "unexpected HTTP status {}", code),
            ReplyErrorKind::Parse => write!(f, "response body was not valid JSON"),
        }
    }
}

/// Outcome of one completion request, already stripped of provider shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Success {
        text: String,
    },
    /// The provider answered but the expected text was missing.
    Empty,
    Error {
        kind: ReplyErrorKind,
    },
}

impl ChatReply {
    pub fn from_text(text: Option<&str>) -> Self {
        match text {
            Some(t) if !t.is_empty() => ChatReply::Success { text: t.to_string() },
            _ => ChatReply::Empty,
        }
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ReplyErrorKind::Timeout
        } else if let Some(status) = err.status() {
            ReplyErrorKind::Status(status.as_u16())
        } else if err.is_decode() {
            ReplyErrorKind::Parse
        } else {
            ReplyErrorKind::Transport
        };
        ChatReply::Error { kind }
    }

    /// The text the user sees for this reply.
    pub fn into_text(self) -> String {
        match self {
            ChatReply::Success { text } => text,
            ChatReply::Empty => NO_ANSWER_TEXT.to_string(),
            ChatReply::Error { .. } => FAILURE_TEXT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_names_case_insensitively() {
        assert_eq!("Gemini".parse::<LlmType>(), Ok(LlmType::Gemini));
        assert_eq!("openai".parse::<LlmType>(), Ok(LlmType::OpenAI));
        assert!("ollama".parse::<LlmType>().is_err());
    }

    #[test]
    fn reply_text_uses_fallbacks() {
        assert_eq!(ChatReply::from_text(Some("Boil it.")).into_text(), "Boil it.");
        assert_eq!(ChatReply::from_text(Some("")).into_text(), NO_ANSWER_TEXT);
        assert_eq!(ChatReply::from_text(None).into_text(), NO_ANSWER_TEXT);
        let failed = ChatReply::Error { kind: ReplyErrorKind::Timeout };
        assert_eq!(failed.into_text(), FAILURE_TEXT);
    }
}
