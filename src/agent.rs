use crate::llm::chat::ChatClient;
use crate::llm::ChatReply;
use crate::models::api::ChatSnapshot;
use crate::models::chat::{ greeting, Message, Session };
use crate::session::{ DeletionFlow, SessionError, SessionStore };

use log::{ debug, error };
use std::sync::{ Arc, Mutex, MutexGuard };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Submit the input buffer. No newline is inserted.
    Send,
    Edited,
}

struct ChatState {
    store: SessionStore,
    active: Session,
    input: String,
    typing: bool,
    deletion: DeletionFlow,
}

fn lock(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives one chat: the active sequence, the input buffer, the typing flag
/// and the session store behind them.
///
/// Sends are not serialized. Two exchanges in flight at once each append
/// their bot message when they finish, so replies land in completion order
/// and the first completion clears the typing flag.
#[derive(Clone)]
pub struct ChatEngine {
    client: Arc<dyn ChatClient>,
    state: Arc<Mutex<ChatState>>,
}

impl ChatEngine {
    /// Resumes the most recent session when the store has one.
    pub fn new(client: Arc<dyn ChatClient>, store: SessionStore) -> Self {
        let active = if store.is_empty() { greeting() } else { store.session(0) };
        Self {
            client,
            state: Arc::new(
                Mutex::new(ChatState {
                    store,
                    active,
                    input: String::new(),
                    typing: false,
                    deletion: DeletionFlow::Idle,
                })
            ),
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let state = lock(&self.state);
        ChatSnapshot {
            sessions: state.store.sessions(),
            current_index: state.store.current_index(),
            active: state.active.clone(),
            input: state.input.clone(),
            is_typing: state.typing,
            pending_deletion: state.deletion.pending(),
        }
    }

    pub fn is_typing(&self) -> bool {
        lock(&self.state).typing
    }

    pub fn set_input(&self, text: &str) {
        lock(&self.state).input = text.to_string();
    }

    /// Appends and persists the user message, then marks the request in flight.
    /// Returns `None` for blank text, leaving every piece of state untouched.
    pub fn begin_send(&self, text: &str) -> Option<PendingExchange> {
        if text.trim().is_empty() {
            return None;
        }
        {
            let mut guard = lock(&self.state);
            let state = &mut *guard;
            state.active.push(Message::user(text));
            state.store.sync_active(&state.active);
            state.input.clear();
            state.typing = true;
        }
        debug!("Dispatching chat prompt ({} chars)", text.len());
        Some(PendingExchange {
            client: self.client.clone(),
            prompt: text.to_string(),
            typing: TypingGuard { state: self.state.clone() },
        })
    }

    pub fn begin_send_input(&self) -> Option<PendingExchange> {
        let text = lock(&self.state).input.clone();
        self.begin_send(&text)
    }

    /// Sends `text` and waits for the bot message it produced.
    pub async fn send(&self, text: &str) -> Option<Message> {
        match self.begin_send(text) {
            Some(pending) => Some(pending.complete().await),
            None => None,
        }
    }

    /// Edits the input buffer. Enter without Shift asks for a send instead of a newline.
    pub fn apply_key(&self, press: KeyPress) -> KeyAction {
        let mut state = lock(&self.state);
        match press.key {
            Key::Enter if !press.shift => {
                return KeyAction::Send;
            }
            Key::Enter => state.input.push('\n'),
            Key::Char(ch) => state.input.push(ch),
            Key::Backspace => {
                state.input.pop();
            }
        }
        KeyAction::Edited
    }

    pub async fn handle_key(&self, press: KeyPress) -> KeyAction {
        let action = self.apply_key(press);
        if action == KeyAction::Send {
            if let Some(pending) = self.begin_send_input() {
                pending.complete().await;
            }
        }
        action
    }

    pub fn new_chat(&self) -> Session {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        state.active = state.store.start_new_session(&state.active);
        state.active.clone()
    }

    pub fn select_session(&self, index: usize) -> Result<Session, SessionError> {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        state.active = state.store.select_session(index)?;
        Ok(state.active.clone())
    }

    /// Marks a stored session for deletion. Out-of-range indices leave the flow untouched.
    pub fn request_deletion(&self, index: usize) -> Result<(), SessionError> {
        let mut state = lock(&self.state);
        let len = state.store.len();
        if index >= len {
            return Err(SessionError::OutOfRange { index, len });
        }
        state.deletion.request(index);
        Ok(())
    }

    pub fn pending_deletion(&self) -> Option<usize> {
        lock(&self.state).deletion.pending()
    }

    /// Deletes the pending session, if any, and resyncs the active sequence.
    pub fn confirm_deletion(&self) -> Result<Option<Session>, SessionError> {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let next = state.deletion.confirm(&mut state.store)?;
        if let Some(active) = &next {
            state.active = active.clone();
        }
        Ok(next)
    }

    pub fn cancel_deletion(&self) {
        lock(&self.state).deletion.cancel();
    }
}

/// Clears the typing flag when the exchange ends, however it ends.
struct TypingGuard {
    state: Arc<Mutex<ChatState>>,
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        lock(&self.state).typing = false;
    }
}

/// A request whose user message is already on screen.
pub struct PendingExchange {
    client: Arc<dyn ChatClient>,
    prompt: String,
    typing: TypingGuard,
}

impl PendingExchange {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Waits for the provider, appends the bot message and persists the session.
    pub async fn complete(self) -> Message {
        let reply = self.client.complete(&self.prompt).await;
        match &reply {
            ChatReply::Error { kind } => error!("Chat request failed: {}", kind),
            ChatReply::Empty => debug!("Chat provider returned no usable text"),
            ChatReply::Success { .. } => {}
        }
        let message = Message::bot(reply.into_text());

        let mut guard = lock(&self.typing.state);
        let state = &mut *guard;
        state.active.push(message.clone());
        state.store.sync_active(&state.active);
        drop(guard);

        message
    }
}
