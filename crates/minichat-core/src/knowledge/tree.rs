//! Response tree builder.
//!
//! The tree is a fixed-depth hierarchy derived from the knowledge base:
//! a synthetic root, one child per category, one grandchild per keyword.
//! Each category and keyword node is bound to one response, drawn uniformly
//! at random from its category's response list at construction time. The
//! binding is fixed for the process lifetime; queries never re-roll it.

use super::base::KnowledgeBase;
use rand::seq::SliceRandom;
use rand::Rng;

/// Sentinel label for the synthetic root. The root carries an empty response,
/// so it can never qualify as a match candidate.
pub const ROOT_LABEL: &str = "ROOT";

/// A labeled tree node bound to a single response string.
#[derive(Debug, Clone)]
pub struct Node {
    pub label: String,
    pub response: String,
    pub children: Vec<Node>,
}

impl Node {
    pub(crate) fn new(label: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            response: response.into(),
            children: Vec::new(),
        }
    }

    /// Builds the response tree from a loaded knowledge base.
    ///
    /// The `fallback` pool is never placed in the tree; it is reserved for
    /// queries no node matches.
    pub fn build(kb: &KnowledgeBase) -> Self {
        Self::build_with(kb, &mut rand::thread_rng())
    }

    /// As [`Node::build`], with a caller-supplied RNG so tests can pin the
    /// response bindings.
    pub fn build_with<R: Rng + ?Sized>(kb: &KnowledgeBase, rng: &mut R) -> Self {
        let mut root = Node::new(ROOT_LABEL, "");
        for category in &kb.categories {
            let mut category_node = Node::new(
                category.name.as_str(),
                pick_response(&category.responses, rng),
            );
            for keyword in &category.keywords {
                category_node
                    .children
                    .push(Node::new(keyword.as_str(), pick_response(&category.responses, rng)));
            }
            root.children.push(category_node);
        }
        tracing::debug!(
            target: "minichat::knowledge",
            categories = root.children.len(),
            nodes = root.node_count(),
            "response tree built"
        );
        root
    }

    /// Total node count including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

/// Uniform draw from a (validated non-empty) response list.
fn pick_response<R: Rng + ?Sized>(responses: &[String], rng: &mut R) -> String {
    responses
        .choose(rng)
        .cloned()
        .unwrap_or_default()
}
