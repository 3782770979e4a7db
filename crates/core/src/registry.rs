//! Command registry and top-level dispatch.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::authorize::authorize;
use crate::collect::collect;
use crate::config::DispatchConfig;
use crate::error::{CommandError, ExecutorError, ExecutorPanic};
use crate::resolve::{resolve, resolve_ignoring_gates};
use crate::sender::CommandSender;
use crate::suggest::{TokenCheck, check_last_token, suggest, tips};
use crate::token::CommandLine;
use crate::tree::{GrammarTree, NodeId, NodeKind};

/// A named command and its grammar.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    description: String,
    help: String,
    tree: GrammarTree,
}

impl Command {
    /// Wrap an already-built tree. Prefer [`CommandBuilder`](crate::CommandBuilder).
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        help: impl Into<String>,
        tree: GrammarTree,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            help: help.into(),
            tree,
        }
    }

    /// Command name (lowercase, no `/`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Longer help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Grammar tree.
    pub fn tree(&self) -> &GrammarTree {
        &self.tree
    }

    /// One usage line per overload, e.g. `"/give <player> <count>"`.
    pub fn usages(&self) -> Vec<String> {
        self.tree
            .terminals()
            .into_iter()
            .map(|id| {
                let usage = self.tree.usage(id);
                if usage.is_empty() {
                    format!("/{}", self.name)
                } else {
                    format!("/{} {usage}", self.name)
                }
            })
            .collect()
    }
}

/// Commands by name, plus the dispatch pipeline.
///
/// Lookup is case-insensitive. Dispatch takes `&self`, so a registry can be
/// shared between threads once populated.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
    config: DispatchConfig,
}

impl CommandRegistry {
    /// Empty registry with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry with `config`.
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            commands: BTreeMap::new(),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Add `command`. Fails if the name is taken.
    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        let key = command.name.to_lowercase();
        if self.commands.contains_key(&key) {
            return Err(CommandError::AlreadyRegistered { command: key });
        }
        tracing::debug!(command = %key, "command registered");
        self.commands.insert(key, command);
        Ok(())
    }

    /// Remove and return the command called `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Command> {
        let removed = self.commands.remove(&name.to_lowercase());
        if removed.is_some() {
            tracing::debug!(command = name, "command unregistered");
        }
        removed
    }

    /// Command called `name`.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(&name.to_lowercase())
    }

    /// Whether a command called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Parse and run a raw line such as `"/give Steve 3"`.
    pub fn execute(&self, sender: &dyn CommandSender, line: &str) -> Result<(), CommandError> {
        let Some(parsed) = CommandLine::parse(line) else {
            return Err(CommandError::NotFound {
                command: String::new(),
            });
        };
        self.execute_tokens(sender, parsed.name(), &parsed.arg_texts())
    }

    /// Run command `name` with pre-split argument tokens.
    pub fn execute_tokens(
        &self,
        sender: &dyn CommandSender,
        name: &str,
        tokens: &[&str],
    ) -> Result<(), CommandError> {
        let command = self.get(name).ok_or_else(|| CommandError::NotFound {
            command: name.to_string(),
        })?;
        let tree = command.tree();
        let cmd_name = command.name().to_string();
        tracing::debug!(command = %cmd_name, sender = sender.name(), tokens = tokens.len(), "dispatch");

        let resolution = resolve(tree, sender, tokens);
        if !resolution.complete {
            let relaxed = resolve_ignoring_gates(tree, sender, tokens);
            if relaxed.complete && rejects_sender(tree, relaxed.node, sender) {
                return Err(CommandError::WrongSender {
                    command: cmd_name,
                    sender: sender.info(),
                });
            }
            return Err(CommandError::WrongUsage {
                command: cmd_name,
                consumed: resolution.consumed,
                supplied: resolution.supplied,
                cause: None,
            });
        }

        let Some(executor) = tree.get(resolution.node).executor() else {
            return Err(CommandError::WrongUsage {
                command: cmd_name,
                consumed: resolution.consumed,
                supplied: resolution.supplied,
                cause: None,
            });
        };

        authorize(tree, resolution.node, self.config.permission_policy, sender).map_err(
            |missing| CommandError::Unauthorized {
                command: cmd_name.clone(),
                missing,
            },
        )?;

        let values = collect(tree, &resolution).map_err(|cause| CommandError::WrongUsage {
            command: cmd_name.clone(),
            consumed: resolution.consumed,
            supplied: resolution.supplied,
            cause: Some(cause),
        })?;

        let outcome = if self.config.catch_executor_panics {
            catch_unwind(AssertUnwindSafe(|| executor(sender, &values)))
                .unwrap_or_else(|payload| {
                    let panic: ExecutorError = Box::new(ExecutorPanic(panic_message(&*payload)));
                    Err(panic)
                })
        } else {
            executor(sender, &values)
        };
        outcome.map_err(|source| {
            tracing::debug!(command = %cmd_name, error = %source, "executor failed");
            CommandError::Executor {
                command: cmd_name,
                source,
            }
        })
    }

    // ── Completion ──────────────────────────────────────────────────────

    /// Completion candidates for the last token of `line`.
    ///
    /// While only a command name is being typed, registered names with that
    /// prefix are returned (if enabled).
    pub fn complete(&self, sender: &dyn CommandSender, line: &str) -> Vec<String> {
        let parsed = CommandLine::parse(line);
        let typing_name = parsed
            .as_ref()
            .is_none_or(|p| p.args().is_empty() && !p.has_trailing_space());
        if typing_name {
            if !self.config.complete_command_names {
                return Vec::new();
            }
            let prefix = parsed.map(|p| p.name().to_lowercase()).unwrap_or_default();
            return self
                .commands
                .keys()
                .filter(|n| n.starts_with(&prefix))
                .cloned()
                .collect();
        }

        let Some(parsed) = parsed else {
            return Vec::new();
        };
        let Some(command) = self.get(parsed.name()) else {
            return Vec::new();
        };
        suggest(
            command.tree(),
            sender,
            command.name(),
            &parsed.completion_tokens(),
        )
    }

    /// Tips for the arguments still expected after `line`.
    pub fn tips(&self, sender: &dyn CommandSender, line: &str) -> Vec<String> {
        let Some(parsed) = CommandLine::parse(line) else {
            return Vec::new();
        };
        let Some(command) = self.get(parsed.name()) else {
            return Vec::new();
        };
        tips(command.tree(), sender, &parsed.completion_tokens())
    }

    /// Whether the last token of `line` is acceptable where it stands.
    pub fn check_last_token(&self, sender: &dyn CommandSender, line: &str) -> TokenCheck {
        let Some(parsed) = CommandLine::parse(line) else {
            return TokenCheck::Accepted;
        };
        let Some(command) = self.get(parsed.name()) else {
            return TokenCheck::Rejected {
                message: format!("unknown command /{}", parsed.name()),
            };
        };
        check_last_token(command.tree(), sender, &parsed.completion_tokens())
    }
}

fn rejects_sender(tree: &GrammarTree, node: NodeId, sender: &dyn CommandSender) -> bool {
    tree.ancestors(node).any(|id| match tree.get(id).kind() {
        NodeKind::Sender(gate) => !gate.allows(sender.kind()),
        _ => false,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
