//! Permission checks for command callers.
//!
//! A caller is anything implementing [`Permissible`]. The stock backing
//! store is [`PermissionStore`], a reader/writer locked map of dotted
//! permission strings with hierarchical fallback, which can be seeded from
//! a JSON [`PermissionProfile`].

#![warn(missing_docs)]

mod profile;
mod store;

pub use profile::{PermissionProfile, ProfileError, SenderSpec, load_profile_from_str};
pub use store::{PermissionStore, validate_permission};

/// Capability to answer "is this permission granted?".
///
/// Implementations must not mutate any state while answering.
pub trait Permissible {
    /// Whether `permission` is granted.
    fn has_permission(&self, permission: &str) -> bool;
}

impl<T: Permissible + ?Sized> Permissible for &T {
    fn has_permission(&self, permission: &str) -> bool {
        (**self).has_permission(permission)
    }
}

impl<T: Permissible + ?Sized> Permissible for std::sync::Arc<T> {
    fn has_permission(&self, permission: &str) -> bool {
        (**self).has_permission(permission)
    }
}
