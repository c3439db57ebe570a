pub mod deletion;

use log::{ debug, warn };
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use crate::history::KeyValueStorage;
use crate::models::chat::{ greeting, is_fresh, session_from_value, session_or_greeting, Message, Session };

pub use deletion::DeletionFlow;

pub const SESSIONS_KEY: &str = "chatSessions";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session index {index} out of range (have {len})")]
    OutOfRange {
        index: usize,
        len: usize,
    },
}

/// Ordered chat sessions plus the index of the one being edited.
///
/// Slots that failed to decode stay as `None` so later indices keep their
/// meaning; every read of such a slot yields the greeting instead.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    sessions: Vec<Option<Session>>,
    current: usize,
}

impl SessionStore {
    /// Reads persisted sessions. Missing or corrupt data yields an empty store.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::load_with_key(storage, SESSIONS_KEY)
    }

    pub fn load_with_key(storage: Arc<dyn KeyValueStorage>, key: &str) -> Self {
        let sessions = match storage.get_item(key) {
            Ok(Some(raw)) => decode_sessions(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read stored sessions, starting empty: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} chat sessions", sessions.len());
        Self {
            storage,
            key: key.to_string(),
            sessions,
            current: 0,
        }
    }

    /// Writes the whole collection. Failures are logged, never returned.
    pub fn persist(&self) {
        let encoded = match serde_json::to_string(&self.sessions) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode chat sessions: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&self.key, &encoded) {
            warn!("Failed to persist chat sessions: {}", e);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn session(&self, index: usize) -> Session {
        session_or_greeting(self.sessions.get(index))
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.sessions
            .iter()
            .map(|slot| session_or_greeting(Some(slot)))
            .collect()
    }

    /// Archives `active` when it holds a conversation and opens a fresh session at the front.
    pub fn start_new_session(&mut self, active: &[Message]) -> Session {
        if !is_fresh(active) {
            self.write_current(active);
        } else if matches!(self.sessions.get(self.current), Some(Some(s)) if is_fresh(s)) {
            self.sessions.remove(self.current);
        }
        let fresh = greeting();
        self.sessions.insert(0, Some(fresh.clone()));
        self.current = 0;
        self.persist();
        fresh
    }

    pub fn select_session(&mut self, index: usize) -> Result<Session, SessionError> {
        self.check_index(index)?;
        self.current = index;
        Ok(self.session(index))
    }

    /// Removes a session and returns the active sequence for the re-derived current index.
    pub fn delete_session(&mut self, index: usize) -> Result<Session, SessionError> {
        self.check_index(index)?;
        self.sessions.remove(index);
        let len = self.sessions.len();

        if index == self.current {
            if len == 0 {
                self.current = 0;
                self.persist();
                return Ok(greeting());
            }
            self.current = index.min(len - 1);
        } else if index < self.current {
            self.current -= 1;
        } else if self.current >= len {
            self.current = len.saturating_sub(1);
        }

        self.persist();
        Ok(self.session(self.current))
    }

    /// Mirrors the active sequence into the current slot and persists.
    pub fn sync_active(&mut self, active: &[Message]) {
        self.write_current(active);
        self.persist();
    }

    fn write_current(&mut self, active: &[Message]) {
        if self.current < self.sessions.len() {
            self.sessions[self.current] = Some(active.to_vec());
        } else {
            self.sessions.push(Some(active.to_vec()));
            self.current = self.sessions.len() - 1;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index >= self.sessions.len() {
            return Err(SessionError::OutOfRange { index, len: self.sessions.len() });
        }
        Ok(())
    }
}

fn decode_sessions(raw: &str) -> Vec<Option<Session>> {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Array(entries)) => entries.iter().map(session_from_value).collect(),
        Ok(_) => {
            warn!("Stored chat sessions are not an array, starting empty");
            Vec::new()
        }
        Err(e) => {
            warn!("Stored chat sessions are corrupt, starting empty: {}", e);
            Vec::new()
        }
    }
}
