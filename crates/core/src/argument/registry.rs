use std::collections::HashMap;
use std::sync::Arc;

use super::{
    Argument, BooleanArgument, DoubleArgument, FloatArgument, IntegerArgument, LongArgument,
    StringArgument,
};
use crate::value::ValueKind;

/// Arguments by name, plus a default argument per value kind.
///
/// The first argument registered for a kind becomes that kind's default.
#[derive(Clone, Default)]
pub struct ArgumentRegistry {
    by_name: HashMap<String, Arc<dyn Argument>>,
    by_kind: HashMap<ValueKind, Arc<dyn Argument>>,
}

impl ArgumentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with `String`, `Integer`, `Long`, `Float`, `Double`
    /// and `Boolean`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StringArgument));
        registry.register(Arc::new(IntegerArgument));
        registry.register(Arc::new(LongArgument));
        registry.register(Arc::new(FloatArgument));
        registry.register(Arc::new(DoubleArgument));
        registry.register(Arc::new(BooleanArgument));
        registry
    }

    /// Register `argument` under its name, replacing (and returning) any
    /// argument previously registered under that name.
    pub fn register(&mut self, argument: Arc<dyn Argument>) -> Option<Arc<dyn Argument>> {
        self.by_kind
            .entry(argument.kind())
            .or_insert_with(|| Arc::clone(&argument));
        self.by_name
            .insert(argument.name().to_string(), argument)
    }

    /// Argument registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Argument>> {
        self.by_name.get(name).cloned()
    }

    /// Default argument for values of `kind`.
    pub fn for_kind(&self, kind: ValueKind) -> Option<Arc<dyn Argument>> {
        self.by_kind.get(&kind).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ArgumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentRegistry")
            .field("names", &self.names())
            .finish()
    }
}
