//! Permission gate in front of executors.

use std::collections::BTreeSet;

use cmdtree_permission::Permissible;

use crate::config::PermissionPolicy;
use crate::tree::{GrammarTree, NodeId};

/// Permissions required to run the executor at `node` under `policy`.
pub fn required_permissions(
    tree: &GrammarTree,
    node: NodeId,
    policy: PermissionPolicy,
) -> BTreeSet<String> {
    match policy {
        PermissionPolicy::LeafOnly => tree
            .node(node)
            .map(|n| n.permissions().clone())
            .unwrap_or_default(),
        PermissionPolicy::InheritAncestors => tree
            .ancestors(node)
            .flat_map(|id| tree.get(id).permissions().iter().cloned())
            .collect(),
    }
}

/// Check `caller` against every permission required at `node`.
///
/// Returns the missing permissions, sorted, on failure.
pub fn authorize<P: Permissible + ?Sized>(
    tree: &GrammarTree,
    node: NodeId,
    policy: PermissionPolicy,
    caller: &P,
) -> Result<(), Vec<String>> {
    let missing: Vec<String> = required_permissions(tree, node, policy)
        .into_iter()
        .filter(|p| !caller.has_permission(p))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!(node = %node, ?missing, "authorization denied");
        Err(missing)
    }
}
