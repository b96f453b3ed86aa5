//! Dual-strategy matcher over the response tree.
//!
//! Both strategies share one scoring rule and one traversal routine; only the
//! queue discipline differs. The matcher holds no per-call state, so one
//! responder can serve concurrent queries.

use super::base::KnowledgeBase;
use super::tree::Node;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// Traversal discipline for a single search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Level order: FIFO queue seeded with the root.
    BreadthFirst,
    /// Preorder: LIFO stack; children are pushed in reverse stored order so
    /// they are still visited left to right.
    DepthFirst,
}

/// Offline responder: immutable response tree plus the fallback pool.
///
/// Built once at process start; `get_response` never fails and never returns
/// an empty string (the fallback pool absorbs unmatched queries).
pub struct TreeResponder {
    root: Node,
    fallback: Vec<String>,
}

impl TreeResponder {
    /// Builds the responder from a loaded knowledge base.
    pub fn new(kb: &KnowledgeBase) -> Self {
        Self {
            root: Node::build(kb),
            fallback: kb.fallback.clone(),
        }
    }

    /// As [`TreeResponder::new`] with a caller-supplied RNG, pinning the
    /// per-node response bindings.
    pub fn with_rng<R: Rng + ?Sized>(kb: &KnowledgeBase, rng: &mut R) -> Self {
        Self {
            root: Node::build_with(kb, rng),
            fallback: kb.fallback.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(root: Node, fallback: Vec<String>) -> Self {
        Self { root, fallback }
    }

    /// Number of nodes in the response tree, root included.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Runs one traversal pass and returns its response.
    ///
    /// Empty query short-circuits to the first fallback response without
    /// traversing. A traversal that finds no node with score > 0 returns a
    /// uniformly random fallback response.
    pub fn search(&self, query: &str, strategy: Strategy) -> String {
        if query.is_empty() {
            return self.fallback[0].clone();
        }

        let tokens = tokenize(query);
        let mut pending: VecDeque<&Node> = VecDeque::new();
        pending.push_back(&self.root);
        let mut best: Option<&Node> = None;
        let mut best_score = 0usize;

        while let Some(node) = match strategy {
            Strategy::BreadthFirst => pending.pop_front(),
            Strategy::DepthFirst => pending.pop_back(),
        } {
            let score = score(&node.label, &tokens);
            // Strictly greater keeps the earlier-visited node on ties.
            if score > best_score && !node.response.is_empty() {
                best_score = score;
                best = Some(node);
            }
            match strategy {
                Strategy::BreadthFirst => pending.extend(node.children.iter()),
                Strategy::DepthFirst => pending.extend(node.children.iter().rev()),
            }
        }

        match best {
            Some(node) if best_score > 0 => node.response.clone(),
            _ => self
                .fallback
                .choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Public operation: runs both strategies and reconciles their answers.
    /// Always returns a response; unmatched queries fall back, never error.
    pub fn get_response(&self, query: &str) -> String {
        let bfs = self.search(query, Strategy::BreadthFirst);
        let dfs = self.search(query, Strategy::DepthFirst);
        let response = reconcile(bfs, dfs);
        tracing::debug!(
            target: "minichat::knowledge",
            query_len = query.len(),
            response_len = response.len(),
            "offline response selected"
        );
        response
    }
}

/// Lowercased, deduplicated whitespace tokens of the query.
fn tokenize(query: &str) -> HashSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Count of query tokens in symmetric substring containment with the label.
/// Each distinct token contributes at most 1.
fn score(label: &str, tokens: &HashSet<String>) -> usize {
    let label = label.to_lowercase();
    tokens
        .iter()
        .filter(|token| token.contains(&label) || label.contains(token.as_str()))
        .count()
}

/// Picks the longer of the two answers (in characters) as the more informative
/// one; the breadth-first answer wins exact ties.
fn reconcile(bfs: String, dfs: String) -> String {
    if dfs.chars().count() > bfs.chars().count() {
        dfs
    } else {
        bfs
    }
}
