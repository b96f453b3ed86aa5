//! minichat-core: chat backend core (configuration, conversation store, and the
//! offline knowledge-tree responder).
//!
//! The gateway and the LLM client both build on these types so the public API
//! stays consistent across the workspace.

mod config;
mod conversation;
mod knowledge;

pub use config::CoreConfig;
pub use conversation::{ChatMessage, Conversation, ConversationStore, DEFAULT_CONVERSATION_ID};
pub use knowledge::{
    Category, KnowledgeBase, KnowledgeError, Node, Strategy, TreeResponder, ROOT_LABEL,
};
