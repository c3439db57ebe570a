use super::{ Session, SessionError, SessionStore };

/// Confirmation gate in front of `SessionStore::delete_session`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeletionFlow {
    #[default]
    Idle,
    Pending(usize),
}

impl DeletionFlow {
    /// Marks `index` for deletion, replacing any earlier request.
    pub fn request(&mut self, index: usize) {
        *self = DeletionFlow::Pending(index);
    }

    pub fn pending(&self) -> Option<usize> {
        match self {
            DeletionFlow::Idle => None,
            DeletionFlow::Pending(index) => Some(*index),
        }
    }

    /// Deletes the pending session and returns the new active sequence.
    /// `Ok(None)` when nothing was pending.
    pub fn confirm(&mut self, store: &mut SessionStore) -> Result<Option<Session>, SessionError> {
        match std::mem::take(self) {
            DeletionFlow::Idle => Ok(None),
            DeletionFlow::Pending(index) => store.delete_session(index).map(Some),
        }
    }

    pub fn cancel(&mut self) {
        *self = DeletionFlow::Idle;
    }
}
