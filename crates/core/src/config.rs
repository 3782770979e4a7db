//! Dispatch configuration.

use serde::{Deserialize, Serialize};

/// Which nodes' permissions a caller must hold to run an overload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionPolicy {
    /// Only the matched executor node's permissions.
    #[default]
    LeafOnly,
    /// The union of the permissions of every node on the matched path.
    InheritAncestors,
}

/// Settings for [`CommandRegistry`](crate::CommandRegistry).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Permission collection policy.
    pub permission_policy: PermissionPolicy,
    /// Complete a partially typed command name against registered names.
    pub complete_command_names: bool,
    /// Turn executor panics into [`CommandError::Executor`](crate::CommandError::Executor)
    /// instead of unwinding into the caller.
    pub catch_executor_panics: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            permission_policy: PermissionPolicy::LeafOnly,
            complete_command_names: true,
            catch_executor_panics: true,
        }
    }
}

impl DispatchConfig {
    /// Set the permission policy (builder pattern).
    pub fn with_permission_policy(mut self, policy: PermissionPolicy) -> Self {
        self.permission_policy = policy;
        self
    }

    /// Enable or disable command-name completion (builder pattern).
    pub fn with_command_name_completion(mut self, enabled: bool) -> Self {
        self.complete_command_names = enabled;
        self
    }

    /// Enable or disable catching executor panics (builder pattern).
    pub fn with_panic_catching(mut self, enabled: bool) -> Self {
        self.catch_executor_panics = enabled;
        self
    }
}
