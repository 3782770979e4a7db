//! Property tests for hierarchical permission lookup.

use cmdtree_permission::{Permissible, PermissionStore};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn dotted() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

proptest! {
    #[test]
    fn ancestor_grant_covers_descendant(path in dotted(), extra in dotted(), granted in any::<bool>()) {
        let parent = path.join(".");
        let child = format!("{parent}.{}", extra.join("."));
        let store = PermissionStore::from_grants([(parent.clone(), granted)]);
        prop_assert_eq!(store.has_permission(&child), granted);
        prop_assert_eq!(store.has_permission(&parent), granted);
    }

    #[test]
    fn most_specific_definition_wins(path in dotted(), outer in any::<bool>(), inner in any::<bool>()) {
        prop_assume!(path.len() >= 2);
        let full = path.join(".");
        let prefix = path[..path.len() - 1].join(".");
        let store = PermissionStore::from_grants([(prefix, outer), (full.clone(), inner)]);
        prop_assert_eq!(store.has_permission(&full), inner);
    }

    #[test]
    fn empty_store_denies(path in dotted()) {
        let store = PermissionStore::new();
        prop_assert!(!store.has_permission(&path.join(".")));
    }

    #[test]
    fn sibling_grant_does_not_leak(path in dotted(), a in segment(), b in segment()) {
        prop_assume!(a != b);
        let base = path.join(".");
        let store = PermissionStore::from_grants([(format!("{base}.{a}"), true)]);
        let key = format!("{base}.{b}");
        prop_assert!(!store.has_permission(&key));
    }
}

#[test]
fn dotted_fallback_cases() {
    let only_ab = PermissionStore::from_grants([("a.b", true)]);
    assert!(only_ab.has_permission("a.b.c"));

    let only_a_false = PermissionStore::from_grants([("a", false)]);
    assert!(!only_a_false.has_permission("a.b.c"));

    assert!(!PermissionStore::new().has_permission("a.b.c"));
}
