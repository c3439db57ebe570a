use serde::{ Serialize, Deserialize };
use super::chat::{ Message, Session };

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub message: Message,
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Debug)]
pub struct RecipeQuery {
    #[serde(default)]
    pub ingredients: String,
}

#[derive(Deserialize, Debug)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub prefix: String,
}

/// Read-only view of the chat state handed to renderers.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatSnapshot {
    pub sessions: Vec<Session>,
    pub current_index: usize,
    pub active: Session,
    pub input: String,
    pub is_typing: bool,
    pub pending_deletion: Option<usize>,
}
