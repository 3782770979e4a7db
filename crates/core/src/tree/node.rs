use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::argument::{Argument, Suggester};
use crate::error::ExecutorError;
use crate::sender::CommandSender;
use crate::value::Value;

use super::NodeId;

/// Callback run when a command line resolves to a node.
///
/// Receives one value per value-producing node on the matched path, in
/// declaration order, with aggregates already folded.
pub type Executor =
    Arc<dyn Fn(&dyn CommandSender, &[Value]) -> Result<(), ExecutorError> + Send + Sync>;

/// Folds an aggregate's operand values into one composite value.
pub type Combinator = Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>;

/// Wrap a closure as an [`Executor`].
pub fn executor<F>(f: F) -> Executor
where
    F: Fn(&dyn CommandSender, &[Value]) -> Result<(), ExecutorError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`Combinator`].
pub fn combinator<F>(f: F) -> Combinator
where
    F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Caller types admitted by a sender-gated node. Empty admits everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderGate {
    allowed: BTreeSet<String>,
}

impl SenderGate {
    /// Gate admitting the given caller types.
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Gate admitting every caller.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether a caller of type `kind` passes.
    pub fn allows(&self, kind: &str) -> bool {
        self.allowed.is_empty() || self.allowed.contains(kind)
    }

    /// Admitted caller types, sorted.
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

/// Folds the `arity` values matched just before it into one.
#[derive(Clone)]
pub struct Aggregate {
    label: String,
    arity: usize,
    combinator: Combinator,
}

impl Aggregate {
    /// Aggregate named `label` folding `arity` values with `combinator`.
    pub fn new(label: impl Into<String>, arity: usize, combinator: Combinator) -> Self {
        Self {
            label: label.into(),
            arity,
            combinator,
        }
    }

    /// Display label (e.g., `"position"`).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of operand values.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Apply the combinator to operands in declaration order.
    pub fn combine(&self, operands: &[Value]) -> Option<Value> {
        (self.combinator)(operands)
    }
}

impl fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregate")
            .field("label", &self.label)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// What a node matches.
#[derive(Clone)]
pub enum NodeKind {
    /// Tree root; never matched itself.
    Root,
    /// Fixed keyword.
    Literal(String),
    /// Typed argument.
    Argument(Arc<dyn Argument>),
    /// Caller-type gate; consumes no token.
    Sender(SenderGate),
    /// Folds preceding values; consumes no token.
    Aggregate(Aggregate),
}

impl NodeKind {
    /// Tokens consumed when this node matches.
    pub fn width(&self) -> usize {
        match self {
            NodeKind::Literal(_) | NodeKind::Argument(_) => 1,
            NodeKind::Root | NodeKind::Sender(_) | NodeKind::Aggregate(_) => 0,
        }
    }

    /// Ordering weight among siblings; higher is tried first.
    ///
    /// Gates, then literals, then typed arguments. Text arguments lose one
    /// point, the stock `String` argument another.
    pub fn priority(&self) -> i32 {
        match self {
            NodeKind::Sender(_) => 2,
            NodeKind::Literal(_) => 1,
            NodeKind::Argument(arg) => {
                let text = i32::from(arg.kind() == crate::value::ValueKind::Text);
                let stock = i32::from(arg.name() == "String");
                -text - stock
            }
            NodeKind::Root | NodeKind::Aggregate(_) => 0,
        }
    }

    /// Whether two kinds describe the same branch for merging purposes:
    /// same variant and same literal text, argument identity, admitted
    /// callers or aggregate. Aggregates are only the same when they share
    /// one [`Combinator`] instance as well as label and arity.
    pub fn matches_shape(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Root, NodeKind::Root) => true,
            (NodeKind::Literal(a), NodeKind::Literal(b)) => a == b,
            (NodeKind::Argument(a), NodeKind::Argument(b)) => {
                a.name() == b.name() && a.kind() == b.kind()
            }
            (NodeKind::Sender(a), NodeKind::Sender(b)) => a == b,
            (NodeKind::Aggregate(a), NodeKind::Aggregate(b)) => {
                a.label == b.label
                    && a.arity == b.arity
                    && Arc::ptr_eq(&a.combinator, &b.combinator)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => f.write_str("Root"),
            NodeKind::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            NodeKind::Argument(a) => f.debug_tuple("Argument").field(&a.name()).finish(),
            NodeKind::Sender(g) => f.debug_tuple("Sender").field(g).finish(),
            NodeKind::Aggregate(a) => a.fmt(f),
        }
    }
}

/// How strictly sender gates apply during a match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Gates reject callers of other types.
    Strict,
    /// Gates admit everyone; used to tell wrong-sender from wrong-usage.
    IgnoreSenderGates,
}

/// Result of a successful match attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Matched {
    /// The node produced a value for the executor.
    Value(Value),
    /// The node matched but produces nothing on its own.
    Structural,
}

/// A grammar-tree node. Links are arena handles owned by
/// [`GrammarTree`](super::GrammarTree).
#[derive(Clone)]
pub struct Node {
    pub(super) kind: NodeKind,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) permissions: BTreeSet<String>,
    pub(super) executor: Option<Executor>,
    pub(super) suggester: Option<Suggester>,
    pub(super) tip: Option<String>,
}

impl Node {
    pub(super) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            permissions: BTreeSet::new(),
            executor: None,
            suggester: None,
            tip: None,
        }
    }

    /// What this node matches.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent handle; `None` for the root and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in match order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Permissions required to run this node's executor.
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Require `permission` to run this node's executor.
    pub fn add_permission(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
    }

    /// Executor, if an overload ends here.
    pub fn executor(&self) -> Option<&Executor> {
        self.executor.as_ref()
    }

    /// Attach an executor, returning the previous one.
    pub fn set_executor(&mut self, executor: Executor) -> Option<Executor> {
        self.executor.replace(executor)
    }

    /// Completion override, if any.
    pub fn suggester(&self) -> Option<&Suggester> {
        self.suggester.as_ref()
    }

    /// Replace the argument-level suggestions for this node.
    pub fn set_suggester(&mut self, suggester: Suggester) {
        self.suggester = Some(suggester);
    }

    /// Usage hint.
    pub fn tip(&self) -> Option<&str> {
        self.tip.as_deref()
    }

    /// Set the usage hint.
    pub fn set_tip(&mut self, tip: impl Into<String>) {
        self.tip = Some(tip.into());
    }

    /// Tokens consumed when this node matches.
    pub fn width(&self) -> usize {
        self.kind.width()
    }

    /// Try to match this node against the start of `window`.
    ///
    /// `window` must hold at least [`width`](Self::width) tokens.
    pub fn attempt_match(
        &self,
        sender: &dyn CommandSender,
        window: &[&str],
        mode: MatchMode,
    ) -> Option<Matched> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Literal(text) => {
                let token = window.first()?;
                (*token == text.as_str()).then(|| Matched::Value(Value::Literal(text.clone())))
            }
            NodeKind::Argument(arg) => {
                let token = window.first()?;
                if token.is_empty() {
                    return None;
                }
                arg.convert(token).map(Matched::Value)
            }
            NodeKind::Sender(gate) => {
                let admitted = mode == MatchMode::IgnoreSenderGates || gate.allows(sender.kind());
                admitted.then(|| Matched::Value(Value::Sender(sender.info())))
            }
            NodeKind::Aggregate(_) => Some(Matched::Structural),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("permissions", &self.permissions)
            .field("executor", &self.executor.is_some())
            .field("tip", &self.tip)
            .finish()
    }
}
