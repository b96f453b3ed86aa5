//! In-memory conversation store for the LLM chat mode.
//!
//! Conversations live for the process lifetime only; there is no persistence
//! layer by design. The store is keyed by caller-supplied conversation ids and
//! is safe to share across request handlers.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Key used when the caller supplies no conversation id.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// One chat turn in the OpenAI-compatible wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A single conversation: message history plus an active flag.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    pub active: bool,
}

impl Conversation {
    /// New conversation seeded with the system prompt.
    pub fn new(system_prompt: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new("system", system_prompt)],
            active: true,
        }
    }

    /// Deactivate the conversation. Further chat requests against it are rejected.
    pub fn end(&mut self) {
        self.active = false;
    }
}

/// Concurrent map of conversation id -> conversation.
pub struct ConversationStore {
    system_prompt: String,
    inner: DashMap<String, Conversation>,
}

impl ConversationStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            inner: DashMap::new(),
        }
    }

    /// Resolves an optional caller-supplied id to a store key.
    pub fn resolve_id(id: Option<&str>) -> &str {
        match id {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_CONVERSATION_ID,
        }
    }

    /// Ensures a conversation exists for `id` and returns whether it is active.
    pub fn get_or_create(&self, id: &str) -> bool {
        self.inner
            .entry(id.to_string())
            .or_insert_with(|| Conversation::new(&self.system_prompt))
            .active
    }

    /// Appends a message to an existing conversation. No-op for unknown ids.
    pub fn push_message(&self, id: &str, message: ChatMessage) {
        if let Some(mut conv) = self.inner.get_mut(id) {
            conv.messages.push(message);
        }
    }

    /// Snapshot of the message history for `id` (empty for unknown ids).
    pub fn messages(&self, id: &str) -> Vec<ChatMessage> {
        self.inner
            .get(id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Deactivates the conversation. Returns false if the id is unknown.
    pub fn end(&self, id: &str) -> bool {
        match self.inner.get_mut(id) {
            Some(mut conv) => {
                conv.end();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_is_seeded_with_system_prompt() {
        let store = ConversationStore::new("You are a helpful assistant.");
        assert!(store.get_or_create("abc"));
        let messages = store.messages("abc");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are a helpful assistant.");
    }

    #[test]
    fn push_and_snapshot_round_trip() {
        let store = ConversationStore::new("sys");
        store.get_or_create("c1");
        store.push_message("c1", ChatMessage::new("user", "hello"));
        store.push_message("c1", ChatMessage::new("assistant", "hi"));
        let messages = store.messages("c1");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, "assistant");
    }

    #[test]
    fn ended_conversation_reports_inactive() {
        let store = ConversationStore::new("sys");
        store.get_or_create("c1");
        assert!(store.end("c1"));
        assert!(!store.get_or_create("c1"));
        assert!(!store.end("missing"));
    }

    #[test]
    fn missing_id_resolves_to_default_key() {
        assert_eq!(ConversationStore::resolve_id(None), DEFAULT_CONVERSATION_ID);
        assert_eq!(ConversationStore::resolve_id(Some("")), DEFAULT_CONVERSATION_ID);
        assert_eq!(ConversationStore::resolve_id(Some("x")), "x");
    }
}
