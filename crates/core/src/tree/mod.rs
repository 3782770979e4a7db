//! Arena-backed grammar tree.
//!
//! Nodes live in a flat `Vec` owned by [`GrammarTree`] and refer to each
//! other through [`NodeId`] handles, so the tree is freely cloneable and
//! resolution runs keep their scratch state outside it.
//!
//! Siblings are kept sorted by descending [`NodeKind::priority`], ties
//! broken by registration order (the handle's index).

mod node;

pub use node::{
    Aggregate, Combinator, Executor, MatchMode, Matched, Node, NodeKind, SenderGate, combinator,
    executor,
};

use std::fmt;

use crate::error::TreeError;

/// Stable handle to a node in one [`GrammarTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Handle of every tree's root.
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index (also the registration order).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The grammar of one command: every overload as a path from the root.
#[derive(Debug, Clone)]
pub struct GrammarTree {
    nodes: Vec<Node>,
}

impl Default for GrammarTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarTree {
    /// Tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
        }
    }

    /// Number of nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node behind `id`.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutable node behind `id`. Structure can only change through
    /// [`add_child`](Self::add_child) and [`remove_child`](Self::remove_child).
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Create a detached node.
    pub fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// Create a node and attach it under `parent`.
    pub fn add_node(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeError> {
        self.check(parent)?;
        let id = self.insert(kind);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Attach the detached node `child` under `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;
        if child == NodeId::ROOT {
            return Err(TreeError::RootCannotBeChild);
        }
        if let Some(existing) = self.get(child).parent {
            return Err(TreeError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        let key = sort_key(self.get(child).kind.priority(), child);
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.partition_point(|&s| sort_key(self.get(s).kind.priority(), s) < key);
        self.nodes[parent.0].children.insert(pos, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`. The child keeps its own subtree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;
        if self.get(child).parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    /// First child of `parent` with the same shape as `kind`.
    pub fn find_child(&self, parent: NodeId, kind: &NodeKind) -> Option<NodeId> {
        self.node(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).kind.matches_shape(kind))
    }

    /// Whether `a` and `b` have the same shape.
    pub fn matches_shape(&self, a: NodeId, b: NodeId) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.kind.matches_shape(&b.kind),
            _ => false,
        }
    }

    /// `id` followed by each of its ancestors, ending at the root (or the
    /// top of a detached subtree).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).map(|_| id), move |&n| self.get(n).parent)
    }

    /// Non-root nodes from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<_> = self.ancestors(id).filter(|&n| n != NodeId::ROOT).collect();
        path.reverse();
        path
    }

    /// Tokens consumed along the path from the root to `id`.
    pub fn width_to(&self, id: NodeId) -> usize {
        self.ancestors(id).map(|n| self.get(n).width()).sum()
    }

    /// Every node carrying an executor, in depth-first match order.
    pub fn terminals(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.get(id);
            if node.executor.is_some() {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Human-readable usage of the overload ending at `id`, e.g.
    /// `"give <player> <count>"`. Gates and aggregates are not shown.
    pub fn usage(&self, id: NodeId) -> String {
        self.path(id)
            .into_iter()
            .filter_map(|n| {
                let node = self.get(n);
                match &node.kind {
                    NodeKind::Literal(text) => Some(text.clone()),
                    NodeKind::Argument(arg) => {
                        Some(format!("<{}>", node.tip().unwrap_or(arg.name())))
                    }
                    _ => None,
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id))
        }
    }
}

fn sort_key(priority: i32, id: NodeId) -> (i32, NodeId) {
    (-priority, id)
}
