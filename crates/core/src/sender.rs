//! Command callers.

use std::sync::{Arc, Mutex, PoisonError};

use cmdtree_permission::{Permissible, PermissionStore};

use crate::value::SenderInfo;

/// Whoever issued a command line: a player, the console, a script.
///
/// The [`kind`](Self::kind) tag is what sender-gated grammar nodes check.
pub trait CommandSender: Permissible {
    /// Display name.
    fn name(&self) -> &str;

    /// Caller type tag.
    fn kind(&self) -> &str;

    /// Deliver a message back to the caller.
    fn send_message(&self, message: &str);

    /// Serializable snapshot of this caller.
    fn info(&self) -> SenderInfo {
        SenderInfo::new(self.name(), self.kind())
    }
}

/// A sender that records every message it receives.
///
/// Permission checks go to a shared [`PermissionStore`], so grants made
/// elsewhere are visible immediately.
#[derive(Debug)]
pub struct MemorySender {
    info: SenderInfo,
    permissions: Arc<PermissionStore>,
    outbox: Mutex<Vec<String>>,
}

impl MemorySender {
    /// Create a sender backed by `permissions`.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        permissions: Arc<PermissionStore>,
    ) -> Self {
        Self {
            info: SenderInfo::new(name, kind),
            permissions,
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// The permission store this sender consults.
    pub fn permissions(&self) -> &Arc<PermissionStore> {
        &self.permissions
    }

    /// Copy of every message received so far.
    pub fn messages(&self) -> Vec<String> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the received messages.
    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.outbox.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Permissible for MemorySender {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has_permission(permission)
    }
}

impl CommandSender for MemorySender {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn kind(&self) -> &str {
        &self.info.kind
    }

    fn send_message(&self, message: &str) {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn info(&self) -> SenderInfo {
        self.info.clone()
    }
}
