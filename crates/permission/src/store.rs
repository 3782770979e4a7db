use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Permissible;

/// Hierarchical permission map shared between callers.
///
/// Many concurrent [`has_permission`](Permissible::has_permission) checks
/// proceed together; [`define`](Self::define) and
/// [`undefine`](Self::undefine) take the write lock and exclude them until
/// the change is in place.
///
/// Lookup walks a dotted key from most to least specific and stops at the
/// first explicit definition:
///
/// ```
/// use cmdtree_permission::{Permissible, PermissionStore};
///
/// let store = PermissionStore::new();
/// store.define("world.edit", true);
/// store.define("world.edit.nether", false);
///
/// assert!(store.has_permission("world.edit.overworld"));
/// assert!(!store.has_permission("world.edit.nether.roof"));
/// assert!(!store.has_permission("world"));
/// ```
#[derive(Debug, Default)]
pub struct PermissionStore {
    grants: RwLock<HashMap<String, bool>>,
}

impl PermissionStore {
    /// Empty store; every lookup is denied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from explicit `(permission, granted)` pairs.
    pub fn from_grants<I, K>(grants: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        let map = grants.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            grants: RwLock::new(map),
        }
    }

    /// Explicitly grant (`true`) or deny (`false`) `permission`.
    ///
    /// Returns the previous explicit definition, if any.
    pub fn define(&self, permission: impl Into<String>, granted: bool) -> Option<bool> {
        let permission = permission.into();
        tracing::debug!(%permission, granted, "permission defined");
        self.write().insert(permission, granted)
    }

    /// Remove the explicit definition of `permission`, falling back to its
    /// ancestors again.
    pub fn undefine(&self, permission: &str) -> Option<bool> {
        let previous = self.write().remove(permission);
        if previous.is_some() {
            tracing::debug!(permission, "permission undefined");
        }
        previous
    }

    /// The explicit definition of exactly `permission`, without fallback.
    pub fn definition(&self, permission: &str) -> Option<bool> {
        self.read().get(permission).copied()
    }

    /// Copy of every explicit definition, sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Number of explicit definitions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store has no explicit definitions.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panicking writer cannot leave the map half-updated (each write is a
    // single insert/remove), so a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, bool>> {
        self.grants.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, bool>> {
        self.grants.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Permissible for PermissionStore {
    fn has_permission(&self, permission: &str) -> bool {
        if permission.is_empty() {
            return false;
        }
        let grants = self.read();
        let mut key = permission;
        loop {
            if let Some(&granted) = grants.get(key) {
                return granted;
            }
            match key.rfind('.') {
                Some(dot) => key = &key[..dot],
                None => return false,
            }
        }
    }
}

impl Clone for PermissionStore {
    fn clone(&self) -> Self {
        Self {
            grants: RwLock::new(self.read().clone()),
        }
    }
}

/// Check that `permission` is a well-formed dotted key.
///
/// Keys must be non-empty, contain no whitespace and have no empty
/// segments (`"a..b"`, `".a"`, `"a."`).
pub fn validate_permission(permission: &str) -> Result<(), String> {
    if permission.is_empty() {
        return Err("must not be empty".into());
    }
    if permission.chars().any(char::is_whitespace) {
        return Err(format!("'{permission}' contains whitespace"));
    }
    if permission.split('.').any(str::is_empty) {
        return Err(format!("'{permission}' has an empty segment"));
    }
    Ok(())
}
