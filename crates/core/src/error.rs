//! Typed error types for grammar construction and command dispatch.

use std::collections::BTreeMap;

use cmdtree_diagnostics::{Diagnostic, codes};

use crate::token::CommandLine;
use crate::tree::NodeId;
use crate::value::SenderInfo;

/// Error returned by a command executor.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

/// Grammar-tree wiring failures.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The handle does not belong to this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The root cannot be attached below another node.
    #[error("the root node cannot be a child")]
    RootCannotBeChild,

    /// The child already has a parent.
    #[error("node {child} is already attached to {parent}")]
    AlreadyAttached {
        /// Node being attached.
        child: NodeId,
        /// Its existing parent.
        parent: NodeId,
    },

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle {
        /// Intended parent.
        parent: NodeId,
        /// Node being attached.
        child: NodeId,
    },

    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Claimed parent.
        parent: NodeId,
        /// Node being detached.
        child: NodeId,
    },
}

/// Failures while turning command declarations into a grammar tree.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A parameter names an argument the registry does not know.
    #[error("/{command}: unknown argument type '{name}'")]
    UnknownArgument {
        /// Command being built.
        command: String,
        /// Unresolved argument name.
        name: String,
    },

    /// Two overloads resolve to the same terminal node.
    #[error("/{command}: overload '{usage}' is declared twice")]
    DuplicateOverload {
        /// Command being built.
        command: String,
        /// Usage line of the clashing overload.
        usage: String,
    },

    /// An aggregate parameter has no parts.
    #[error("/{command}: aggregate '{label}' has no parts")]
    EmptyAggregate {
        /// Command being built.
        command: String,
        /// Aggregate label.
        label: String,
    },

    /// An overload has no executor.
    #[error("/{command}: overload '{usage}' has no executor")]
    MissingExecutor {
        /// Command being built.
        command: String,
        /// Usage line of the overload.
        usage: String,
    },

    /// A required permission is not a well-formed dotted key.
    #[error("/{command}: invalid permission '{permission}': {reason}")]
    InvalidPermission {
        /// Command being built.
        command: String,
        /// Offending permission.
        permission: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The command name is empty or contains whitespace.
    #[error("invalid command name '{0}'")]
    InvalidName(String),

    /// Low-level tree wiring failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Value collection failures. Surfaced to callers as wrong usage.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectError {
    /// Fewer values on the path than the aggregate's arity.
    #[error("aggregate '{label}' needs {arity} values but only {available} precede it")]
    Underflow {
        /// Aggregate label.
        label: String,
        /// Values the aggregate folds.
        arity: usize,
        /// Values actually available.
        available: usize,
    },

    /// The combinator returned no value for its operands.
    #[error("aggregate '{label}' rejected its operands")]
    CombinatorRejected {
        /// Aggregate label.
        label: String,
    },
}

/// Caller-facing outcome of a failed dispatch.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No command is registered under that name.
    #[error("unknown command /{command}")]
    NotFound {
        /// Name as typed.
        command: String,
    },

    /// The line matched no overload exactly.
    #[error("/{command} was used incorrectly")]
    WrongUsage {
        /// Command name.
        command: String,
        /// Tokens consumed by the best partial match.
        consumed: usize,
        /// Tokens supplied.
        supplied: usize,
        /// Collection failure behind the refusal, if any.
        #[source]
        cause: Option<CollectError>,
    },

    /// The caller lacks permissions required by the matched overload.
    #[error("you do not have permission to use /{command} (missing: {})", .missing.join(", "))]
    Unauthorized {
        /// Command name.
        command: String,
        /// Missing permissions, sorted.
        missing: Vec<String>,
    },

    /// The only matching overload is gated to other caller types.
    #[error("/{command} cannot be used by {sender}")]
    WrongSender {
        /// Command name.
        command: String,
        /// The rejected caller.
        sender: SenderInfo,
    },

    /// The executor returned an error or panicked.
    #[error("/{command} failed: {source}")]
    Executor {
        /// Command name.
        command: String,
        /// Underlying failure.
        #[source]
        source: ExecutorError,
    },

    /// A command with this name is already registered.
    #[error("command /{command} is already registered")]
    AlreadyRegistered {
        /// Clashing name.
        command: String,
    },
}

/// Panic payload caught at the dispatch boundary.
#[derive(Debug, thiserror::Error)]
#[error("executor panicked: {0}")]
pub struct ExecutorPanic(pub String);

impl CommandError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::NotFound { .. } => codes::COMMAND_NOT_FOUND,
            CommandError::WrongUsage { .. } => codes::WRONG_USAGE,
            CommandError::Unauthorized { .. } => codes::UNAUTHORIZED,
            CommandError::WrongSender { .. } => codes::WRONG_SENDER,
            CommandError::Executor { .. } => codes::EXECUTOR_FAILED,
            CommandError::AlreadyRegistered { .. } => codes::DUPLICATE_COMMAND,
        }
    }

    /// Command name the error refers to.
    pub fn command(&self) -> &str {
        match self {
            CommandError::NotFound { command }
            | CommandError::WrongUsage { command, .. }
            | CommandError::Unauthorized { command, .. }
            | CommandError::WrongSender { command, .. }
            | CommandError::Executor { command, .. }
            | CommandError::AlreadyRegistered { command } => command,
        }
    }

    /// Convert to a diagnostic, pointing into `line` when available.
    pub fn to_diagnostic(&self, line: Option<&CommandLine<'_>>) -> Diagnostic {
        let mut ctx = BTreeMap::from([("command".to_string(), self.command().to_string())]);
        let span = match self {
            CommandError::WrongUsage {
                consumed,
                supplied,
                cause,
                ..
            } => {
                ctx.insert("consumed".into(), consumed.to_string());
                ctx.insert("supplied".into(), supplied.to_string());
                if let Some(cause) = cause {
                    ctx.insert("cause".into(), cause.to_string());
                }
                line.map(|l| l.unconsumed_span(*consumed))
            }
            CommandError::Unauthorized { missing, .. } => {
                ctx.insert("missing".into(), missing.join(","));
                line.map(CommandLine::full_span)
            }
            CommandError::WrongSender { sender, .. } => {
                ctx.insert("sender".into(), sender.name.clone());
                ctx.insert("senderKind".into(), sender.kind.clone());
                line.map(CommandLine::name_span)
            }
            CommandError::Executor { source, .. } => {
                ctx.insert("error".into(), source.to_string());
                line.map(CommandLine::full_span)
            }
            CommandError::NotFound { .. } | CommandError::AlreadyRegistered { .. } => {
                line.map(CommandLine::name_span)
            }
        };
        Diagnostic::from_code(self.code(), self.to_string(), span).with_context(ctx)
    }
}

impl BuildError {
    /// Convert to an `INVALID_GRAMMAR` diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::from_code(codes::INVALID_GRAMMAR, self.to_string(), None)
    }
}
