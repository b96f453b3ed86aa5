//! Offline knowledge-tree responder.
//!
//! Three pieces, wired together once at process start:
//!
//! | Piece          | Role                                                    |
//! |----------------|---------------------------------------------------------|
//! | `KnowledgeBase`| loads category -> {keywords, responses} + fallback pool |
//! | `Node` builder | two-level tree (root -> category -> keyword)            |
//! | `TreeResponder`| BFS + DFS keyword matching, longest-answer reconciliation |
//!
//! The tree is immutable after construction; `get_response` is a pure
//! in-memory computation and safe to call from concurrent handlers.

mod base;
mod responder;
mod tree;

pub use base::{Category, KnowledgeBase, KnowledgeError};
pub use responder::{Strategy, TreeResponder};
pub use tree::{Node, ROOT_LABEL};
