use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{PermissionStore, validate_permission};

/// Errors that can occur when loading or validating a permission profile.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Identity of the caller a profile describes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SenderSpec {
    /// Display name (e.g., `"Steve"`).
    pub name: String,
    /// Caller type tag checked by sender-gated command nodes (e.g., `"player"`).
    pub kind: String,
}

/// A caller identity plus its explicit permission grants.
///
/// # Example
/// ```
/// let json = r#"{
///     "id": "admin",
///     "schema_version": "1.0.0",
///     "sender": { "name": "root", "kind": "console" },
///     "grants": { "console": true, "console.stop": false }
/// }"#;
/// let profile = cmdtree_permission::load_profile_from_str(json).unwrap();
/// assert_eq!(profile.sender.kind, "console");
/// assert_eq!(profile.grants.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionProfile {
    /// Unique profile identifier.
    pub id: String,
    /// Profile schema version for forward compatibility (e.g., `"1.0.0"`).
    pub schema_version: String,
    /// Who this profile speaks for.
    pub sender: SenderSpec,
    /// Explicit grants (`true`) and denials (`false`), keyed by dotted permission.
    #[serde(default)]
    pub grants: BTreeMap<String, bool>,
}

impl PermissionProfile {
    /// A fresh [`PermissionStore`] seeded with this profile's grants.
    pub fn to_store(&self) -> PermissionStore {
        PermissionStore::from_grants(self.grants.iter().map(|(k, v)| (k.clone(), *v)))
    }
}

/// Load and validate a [`PermissionProfile`] from a JSON string.
///
/// Performs structural validation after deserialization:
/// - `id`, `schema_version`, `sender.name` and `sender.kind` must be non-empty
/// - every grant key must pass [`validate_permission`]
pub fn load_profile_from_str(s: &str) -> Result<PermissionProfile, ProfileError> {
    let profile: PermissionProfile = serde_json::from_str(s)?;

    for (field, value) in [
        ("id", &profile.id),
        ("schema_version", &profile.schema_version),
        ("sender.name", &profile.sender.name),
        ("sender.kind", &profile.sender.kind),
    ] {
        if value.trim().is_empty() {
            return Err(ProfileError::InvalidField {
                field: field.into(),
                reason: "must not be empty".into(),
            });
        }
    }

    for key in profile.grants.keys() {
        if let Err(reason) = validate_permission(key) {
            return Err(ProfileError::InvalidField {
                field: format!("grants[{key:?}]"),
                reason,
            });
        }
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Permissible;

    #[test]
    fn load_valid_profile() {
        let json = r#"{
            "id": "builder",
            "schema_version": "1.0.0",
            "sender": { "name": "Alex", "kind": "player" },
            "grants": { "world.edit": true, "world.edit.nether": false }
        }"#;
        let p = load_profile_from_str(json).unwrap();
        assert_eq!(p.id, "builder");
        assert_eq!(p.sender.name, "Alex");
        let store = p.to_store();
        assert!(store.has_permission("world.edit.spawn"));
        assert!(!store.has_permission("world.edit.nether"));
    }

    #[test]
    fn grants_default_to_empty() {
        let json = r#"{ "id": "guest", "schema_version": "1", "sender": { "name": "g", "kind": "player" } }"#;
        let p = load_profile_from_str(json).unwrap();
        assert!(p.grants.is_empty());
        assert!(p.to_store().is_empty());
    }

    #[test]
    fn missing_sender_rejected() {
        let err = load_profile_from_str(r#"{ "id": "x", "schema_version": "1" }"#).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidJson(_)), "{err}");
    }

    #[test]
    fn empty_fields_rejected() {
        let cases = [
            (r#"{ "id": "", "schema_version": "1", "sender": { "name": "a", "kind": "b" } }"#, "id"),
            (r#"{ "id": "x", "schema_version": " ", "sender": { "name": "a", "kind": "b" } }"#, "schema_version"),
            (r#"{ "id": "x", "schema_version": "1", "sender": { "name": "", "kind": "b" } }"#, "sender.name"),
            (r#"{ "id": "x", "schema_version": "1", "sender": { "name": "a", "kind": "" } }"#, "sender.kind"),
        ];
        for (json, field) in cases {
            let err = load_profile_from_str(json).unwrap_err();
            assert!(
                err.to_string().contains(field),
                "error should mention {field}: {err}"
            );
        }
    }

    #[test]
    fn malformed_grant_key_rejected() {
        let json = r#"{
            "id": "x", "schema_version": "1",
            "sender": { "name": "a", "kind": "b" },
            "grants": { "world..edit": true }
        }"#;
        let err = load_profile_from_str(json).unwrap_err();
        assert!(err.to_string().contains("world..edit"), "{err}");
    }
}
