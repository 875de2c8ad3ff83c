//! In-memory, session-keyed conversation store.
//!
//! The store serializes access per call by holding the map lock for the whole
//! `advance`, which never awaits. The one blocking operation of the system —
//! plan generation — happens in the route handler *after* the terminal turn
//! has already removed the session entry.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};

use destress_core::catalog::DomainCatalog;
use destress_core::conversation::{Conversation, Turn, WELCOME_MESSAGE};

/// Shared handle to the session map. Cloning is cheap; all clones see the
/// same sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Conversation>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the conversation for `session_id` by one user message.
    ///
    /// A session with no state is created and greeted — the message content is
    /// ignored for that first call. A terminal turn removes the entry, so the
    /// next call from the same session starts over.
    pub fn advance(&self, session_id: &str, message: &str, catalog: &DomainCatalog) -> Turn {
        let mut sessions = self.inner.lock().expect("session store lock poisoned");

        match sessions.entry(session_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(Conversation::new());
                Turn::Prompt(WELCOME_MESSAGE.to_string())
            }
            Entry::Occupied(mut slot) => {
                let turn = slot.get_mut().advance(message, catalog);
                if matches!(turn, Turn::Completed(_)) {
                    slot.remove();
                }
                turn
            }
        }
    }

    /// Drop a session's state. Returns whether anything was removed.
    pub fn reset(&self, session_id: &str) -> bool {
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .remove(session_id)
            .is_some()
    }

    pub fn active(&self) -> usize {
        self.inner.lock().expect("session store lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use destress_core::conversation::START_REMINDER;

    fn catalog() -> DomainCatalog {
        DomainCatalog::builtin()
    }

    #[test]
    fn first_contact_returns_the_welcome_regardless_of_content() {
        let catalog = catalog();
        let store = SessionStore::new();

        for (session, message) in [("a", ""), ("b", "hello"), ("c", "anything at all")] {
            let turn = store.advance(session, message, &catalog);
            assert_eq!(turn, Turn::Prompt(WELCOME_MESSAGE.to_string()));
        }
        assert_eq!(store.active(), 3);
    }

    #[test]
    fn second_call_consumes_the_message() {
        let catalog = catalog();
        let store = SessionStore::new();

        store.advance("s", "", &catalog);
        let turn = store.advance("s", "hello", &catalog);
        assert_eq!(turn, Turn::Prompt(catalog.selection_prompt().to_string()));
    }

    #[test]
    fn sessions_do_not_interfere() {
        let catalog = catalog();
        let store = SessionStore::new();

        store.advance("a", "", &catalog);
        store.advance("a", "hello", &catalog);
        store.advance("b", "", &catalog);

        // "a" is selecting a domain; "b" is still waiting for the keyword
        let turn = store.advance("b", "1", &catalog);
        assert_eq!(turn, Turn::Prompt(START_REMINDER.to_string()));
    }

    #[test]
    fn terminal_turn_clears_the_session() {
        let catalog = catalog();
        let store = SessionStore::new();

        store.advance("s", "", &catalog);
        store.advance("s", "hello", &catalog);
        store.advance("s", "1", &catalog);
        for i in 0..4 {
            store.advance("s", &format!("answer {i}"), &catalog);
        }
        let turn = store.advance("s", "last answer", &catalog);
        assert!(matches!(turn, Turn::Completed(_)));
        assert_eq!(store.active(), 0);

        // Immediately afterwards the session behaves like a brand-new one
        let turn = store.advance("s", "hello", &catalog);
        assert_eq!(turn, Turn::Prompt(WELCOME_MESSAGE.to_string()));
    }

    #[test]
    fn reset_removes_state() {
        let catalog = catalog();
        let store = SessionStore::new();

        store.advance("s", "", &catalog);
        assert!(store.reset("s"));
        assert!(!store.reset("s"));
        assert_eq!(store.active(), 0);
    }
}
