//! Declarative command construction.
//!
//! A command is declared as a list of [`Signature`]s, each an ordered list
//! of [`Param`]s plus an executor. Overloads that start the same way share
//! their common prefix in the resulting [`GrammarTree`].
//!
//! ```
//! use cmdtree_core::{CommandBuilder, Param, Signature};
//!
//! let give = CommandBuilder::new("give")
//!     .description("Give items to a player")
//!     .overload(
//!         Signature::new([Param::arg("String").tip("player"), Param::arg("Integer").tip("count")])
//!             .permission("items.give")
//!             .executes(|sender, args| {
//!                 sender.send_message(&format!("gave {} x{}", args[0], args[1]));
//!                 Ok(())
//!             }),
//!     )
//!     .build()
//!     .unwrap();
//! assert_eq!(give.usages(), ["/give <player> <count>"]);
//! ```

use std::sync::Arc;

use cmdtree_permission::validate_permission;

use crate::argument::{Argument, ArgumentRegistry, SuggestContext, Suggester};
use crate::error::{BuildError, ExecutorError, TreeError};
use crate::registry::Command;
use crate::sender::CommandSender;
use crate::tree::{Aggregate, Combinator, Executor, GrammarTree, NodeId, NodeKind, SenderGate};
use crate::value::Value;

enum ParamKind {
    Literal(String),
    Named(String),
    Argument(Arc<dyn Argument>),
    Sender(SenderGate),
    Aggregate {
        label: String,
        parts: Vec<Param>,
        combinator: Combinator,
    },
}

/// One position in a [`Signature`].
pub struct Param {
    kind: ParamKind,
    tip: Option<String>,
    suggester: Option<Suggester>,
}

impl Param {
    fn new(kind: ParamKind) -> Self {
        Self {
            kind,
            tip: None,
            suggester: None,
        }
    }

    /// Fixed keyword.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(ParamKind::Literal(text.into()))
    }

    /// Argument looked up by name in the builder's [`ArgumentRegistry`].
    pub fn arg(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Named(name.into()))
    }

    /// Argument given directly.
    pub fn argument(argument: Arc<dyn Argument>) -> Self {
        Self::new(ParamKind::Argument(argument))
    }

    /// Restrict the rest of the overload to callers of the given types.
    /// Produces the caller's [`SenderInfo`](crate::SenderInfo) as a value.
    pub fn sender<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ParamKind::Sender(SenderGate::new(kinds)))
    }

    /// The caller's [`SenderInfo`](crate::SenderInfo), whoever it is.
    pub fn any_sender() -> Self {
        Self::new(ParamKind::Sender(SenderGate::any()))
    }

    /// Several params folded into one value by `combinator`, which receives
    /// one value per part in declaration order.
    pub fn aggregate<F>(label: impl Into<String>, parts: impl IntoIterator<Item = Param>, combinator: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        Self::aggregate_with(label, parts, Arc::new(combinator))
    }

    /// Like [`aggregate`](Self::aggregate) with a shared [`Combinator`].
    /// Overloads passing the same instance share one aggregate node.
    pub fn aggregate_with(
        label: impl Into<String>,
        parts: impl IntoIterator<Item = Param>,
        combinator: Combinator,
    ) -> Self {
        Self::new(ParamKind::Aggregate {
            label: label.into(),
            parts: parts.into_iter().collect(),
            combinator,
        })
    }

    /// Usage hint shown by tips and usage lines.
    pub fn tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }

    /// Replace the argument's completion candidates at this position.
    pub fn suggest_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&SuggestContext<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggester = Some(Arc::new(f));
        self
    }
}

/// One overload: params, required permissions and an executor.
pub struct Signature {
    params: Vec<Param>,
    permissions: Vec<String>,
    executor: Option<Executor>,
}

impl Signature {
    /// Overload made of `params`, in order.
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            params: params.into_iter().collect(),
            permissions: Vec::new(),
            executor: None,
        }
    }

    /// Require `permission` to run this overload.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Run `f` when a line matches this overload.
    pub fn executes<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn CommandSender, &[Value]) -> Result<(), ExecutorError> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(f));
        self
    }
}

/// Builder for a [`Command`].
pub struct CommandBuilder {
    name: String,
    description: String,
    help: String,
    arguments: ArgumentRegistry,
    overloads: Vec<Signature>,
}

impl CommandBuilder {
    /// Start a command called `name`, resolving named arguments against the
    /// built-in registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            help: String::new(),
            arguments: ArgumentRegistry::with_builtins(),
            overloads: Vec::new(),
        }
    }

    /// One-line description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Longer help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Resolve [`Param::arg`] names against `registry` instead of the built-ins.
    pub fn arguments(mut self, registry: ArgumentRegistry) -> Self {
        self.arguments = registry;
        self
    }

    /// Add an overload.
    pub fn overload(mut self, signature: Signature) -> Self {
        self.overloads.push(signature);
        self
    }

    /// Build the grammar tree.
    pub fn build(self) -> Result<Command, BuildError> {
        let name = self.name.to_lowercase();
        if name.is_empty() || name.starts_with('/') || name.chars().any(char::is_whitespace) {
            return Err(BuildError::InvalidName(self.name));
        }

        let mut tree = GrammarTree::new();
        let overloads = self.overloads.len();
        for signature in self.overloads {
            let mut at = NodeId::ROOT;
            for param in signature.params {
                at = place(&mut tree, &self.arguments, &name, at, param)?;
            }

            let usage = tree.usage(at);
            let Some(executor) = signature.executor else {
                return Err(BuildError::MissingExecutor {
                    command: name,
                    usage,
                });
            };
            for permission in &signature.permissions {
                if let Err(reason) = validate_permission(permission) {
                    return Err(BuildError::InvalidPermission {
                        command: name,
                        permission: permission.clone(),
                        reason,
                    });
                }
            }

            let node = tree.node_mut(at).ok_or(TreeError::UnknownNode(at))?;
            if node.executor().is_some() {
                return Err(BuildError::DuplicateOverload {
                    command: name,
                    usage,
                });
            }
            node.set_executor(executor);
            for permission in signature.permissions {
                node.add_permission(permission);
            }
        }

        tracing::debug!(command = %name, overloads, nodes = tree.len(), "command built");
        Ok(Command::new(name, self.description, self.help, tree))
    }
}

fn place(
    tree: &mut GrammarTree,
    arguments: &ArgumentRegistry,
    command: &str,
    mut at: NodeId,
    param: Param,
) -> Result<NodeId, BuildError> {
    let Param {
        kind,
        tip,
        suggester,
    } = param;

    let kind = match kind {
        ParamKind::Literal(text) => NodeKind::Literal(text),
        ParamKind::Named(name) => match arguments.get(&name) {
            Some(arg) => NodeKind::Argument(arg),
            None => {
                return Err(BuildError::UnknownArgument {
                    command: command.to_string(),
                    name,
                });
            }
        },
        ParamKind::Argument(arg) => NodeKind::Argument(arg),
        ParamKind::Sender(gate) => NodeKind::Sender(gate),
        ParamKind::Aggregate {
            label,
            parts,
            combinator,
        } => {
            if parts.is_empty() {
                return Err(BuildError::EmptyAggregate {
                    command: command.to_string(),
                    label,
                });
            }
            let arity = parts.len();
            for part in parts {
                at = place(tree, arguments, command, at, part)?;
            }
            NodeKind::Aggregate(Aggregate::new(label, arity, combinator))
        }
    };

    let default_tip = match &kind {
        NodeKind::Argument(arg) => Some(arg.name().to_string()),
        _ => None,
    };
    let id = match tree.find_child(at, &kind) {
        Some(existing) => existing,
        None => tree.add_node(at, kind)?,
    };
    let node = tree.node_mut(id).ok_or(TreeError::UnknownNode(id))?;
    // A merged node keeps the first explicit tip; only the default yields.
    let tip_is_default = node.tip().is_none() || node.tip() == default_tip.as_deref();
    match (tip, default_tip) {
        (Some(tip), _) if tip_is_default => node.set_tip(tip),
        (None, Some(default)) if node.tip().is_none() => node.set_tip(default),
        _ => {}
    }
    match suggester {
        Some(s) if node.suggester().is_none() => node.set_suggester(s),
        _ => {}
    }
    Ok(id)
}
