//! Backtracking matcher.
//!
//! Walks the grammar tree depth-first against the token stream, trying each
//! node's children in priority order. A node that is backtracked out of at
//! token index `i` is recorded as exhausted at `(node, i)` and never entered
//! there again, which bounds a run by the number of `(node, index)` pairs.
//!
//! Matched values are kept in a per-run slot map keyed by node handle, so
//! any number of runs can share one tree.

use std::collections::{HashMap, HashSet};

use crate::sender::CommandSender;
use crate::tree::{GrammarTree, MatchMode, Matched, NodeId};
use crate::value::Value;

/// Outcome of one resolution run.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Winning node: the executor node of an exact match, otherwise the
    /// deepest node reached (the root if nothing matched).
    pub node: NodeId,
    /// Tokens consumed on the path to `node`.
    pub consumed: usize,
    /// Tokens supplied.
    pub supplied: usize,
    /// Whether every token was consumed and `node` carries an executor.
    pub complete: bool,
    slots: HashMap<NodeId, Value>,
}

impl Resolution {
    /// Value matched at `node` during this run.
    pub fn slot(&self, node: NodeId) -> Option<&Value> {
        self.slots.get(&node)
    }
}

/// Resolve `tokens` against `tree` for `sender`.
pub fn resolve(tree: &GrammarTree, sender: &dyn CommandSender, tokens: &[&str]) -> Resolution {
    Run::new(tree, sender, tokens, MatchMode::Strict, Goal::Execute).finish()
}

/// Like [`resolve`], with every sender gate admitting the caller.
pub fn resolve_ignoring_gates(
    tree: &GrammarTree,
    sender: &dyn CommandSender,
    tokens: &[&str],
) -> Resolution {
    Run::new(tree, sender, tokens, MatchMode::IgnoreSenderGates, Goal::Execute).finish()
}

/// First node (in match order) whose path consumes exactly `tokens`.
/// Executors are not required.
pub fn locate(tree: &GrammarTree, sender: &dyn CommandSender, tokens: &[&str]) -> Option<NodeId> {
    let run = Run::new(tree, sender, tokens, MatchMode::Strict, Goal::Locate).finish();
    (run.consumed == run.supplied).then_some(run.node)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Goal {
    /// Stop at a node with an executor once every token is consumed.
    Execute,
    /// Stop at any node once every token is consumed.
    Locate,
}

struct Run<'a> {
    tree: &'a GrammarTree,
    sender: &'a dyn CommandSender,
    tokens: &'a [&'a str],
    mode: MatchMode,
    goal: Goal,
}

impl<'a> Run<'a> {
    fn new(
        tree: &'a GrammarTree,
        sender: &'a dyn CommandSender,
        tokens: &'a [&'a str],
        mode: MatchMode,
        goal: Goal,
    ) -> Self {
        Self {
            tree,
            sender,
            tokens,
            mode,
            goal,
        }
    }

    fn finish(self) -> Resolution {
        let len = self.tokens.len();
        let mut exhausted: HashSet<(NodeId, usize)> = HashSet::new();
        let mut slots: HashMap<NodeId, Value> = HashMap::new();
        let mut current = NodeId::ROOT;
        let mut index = 0usize;
        let mut depth = 0usize;
        // (node, consumed, depth) of the deepest partial match so far.
        let mut best = (NodeId::ROOT, 0usize, 0usize);

        loop {
            if index == len {
                let done = match self.goal {
                    Goal::Execute => self.tree.get(current).executor().is_some(),
                    Goal::Locate => true,
                };
                if done {
                    tracing::trace!(node = %current, consumed = index, "resolved");
                    return Resolution {
                        node: current,
                        consumed: index,
                        supplied: len,
                        complete: self.goal == Goal::Execute,
                        slots,
                    };
                }
            }

            if let Some((child, matched)) = self.next_child(current, index, &exhausted) {
                if let Matched::Value(v) = matched {
                    slots.insert(child, v);
                }
                current = child;
                index += self.tree.get(child).width();
                depth += 1;
                if depth > best.2 {
                    best = (current, index, depth);
                }
                continue;
            }

            let Some(parent) = self.tree.get(current).parent() else {
                tracing::trace!(node = %best.0, consumed = best.1, supplied = len, "no exact match");
                return Resolution {
                    node: best.0,
                    consumed: best.1,
                    supplied: len,
                    complete: false,
                    slots,
                };
            };
            index -= self.tree.get(current).width();
            tracing::trace!(node = %current, index, "backtrack");
            exhausted.insert((current, index));
            slots.remove(&current);
            current = parent;
            depth -= 1;
        }
    }

    fn next_child(
        &self,
        current: NodeId,
        index: usize,
        exhausted: &HashSet<(NodeId, usize)>,
    ) -> Option<(NodeId, Matched)> {
        let remaining = &self.tokens[index..];
        self.tree
            .get(current)
            .children()
            .iter()
            .copied()
            .filter(|&c| !exhausted.contains(&(c, index)))
            .find_map(|c| {
                let node = self.tree.get(c);
                if node.width() > remaining.len() {
                    return None;
                }
                node.attempt_match(self.sender, remaining, self.mode)
                    .map(|m| (c, m))
            })
    }
}
