//! Tree-structured command dispatch for interactive consoles.
//!
//! Commands are declared as overloads ([`Signature`]s) through a
//! [`CommandBuilder`], which merges them into one grammar tree per command.
//! A [`CommandRegistry`] owns the commands and runs the dispatch pipeline:
//! backtracking resolution, sender gating, permission checks, value
//! collection and executor invocation. The same trees drive completion
//! ([`CommandRegistry::complete`]), usage tips and pending-token checks.

#![warn(missing_docs)]

/// Typed arguments, their conversions and completion candidates.
pub mod argument;
/// Permission checks in front of executors.
pub mod authorize;
/// Declarative overload builder.
pub mod builder;
/// Folding matched values into executor arguments.
pub mod collect;
/// Dispatch configuration.
pub mod config;
/// Error types and diagnostic conversion.
pub mod error;
/// Command registry and dispatch pipeline.
pub mod registry;
/// Backtracking matcher.
pub mod resolve;
/// Command callers.
pub mod sender;
/// Completions, tips and pending-token checks.
pub mod suggest;
/// Command-line tokenization.
pub mod token;
/// Arena-backed grammar tree.
pub mod tree;
/// Values produced by matching.
pub mod value;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Building
pub use builder::{CommandBuilder, Param, Signature};

// Dispatch
pub use config::{DispatchConfig, PermissionPolicy};
pub use registry::{Command, CommandRegistry};
pub use suggest::TokenCheck;

// Errors
pub use error::{BuildError, CollectError, CommandError, ExecutorError, ExecutorPanic, TreeError};

// Arguments and values
pub use argument::{Argument, ArgumentRegistry, SuggestContext};
pub use sender::{CommandSender, MemorySender};
pub use value::{SenderInfo, Value, ValueKind};

// Tree
pub use tree::{GrammarTree, NodeId, NodeKind};

// Diagnostics (re-exported from the diagnostics crate)
pub use cmdtree_diagnostics::{Diagnostic, Severity, Span, codes};

// Permissions (re-exported from the permission crate)
pub use cmdtree_permission::{Permissible, PermissionStore};
