use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

pub const GREETING_TEXT: &str = "Hello! I’m your ChatChef 👨‍🍳 Ask me anything about cooking!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { sender: Sender::Bot, text: text.into() }
    }
}

/// One conversation thread, oldest message first.
pub type Session = Vec<Message>;

/// The sequence every fresh session starts with.
pub fn greeting() -> Session {
    vec![Message::bot(GREETING_TEXT)]
}

/// True when the session holds nothing beyond its opening message.
pub fn is_fresh(session: &[Message]) -> bool {
    session.len() <= 1
}

/// Decodes one stored entry, `None` when it is not an array of messages.
pub fn session_from_value(value: &JsonValue) -> Option<Session> {
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

/// Reads a stored slot, falling back to the greeting when the slot is absent or malformed.
pub fn session_or_greeting(slot: Option<&Option<Session>>) -> Session {
    match slot {
        Some(Some(session)) => session.clone(),
        _ => greeting(),
    }
}
