//! Typed arguments: token conversion and completion candidates.

mod builtin;
mod registry;

pub use builtin::{
    BooleanArgument, DoubleArgument, FloatArgument, IntegerArgument, LongArgument, StringArgument,
};
pub use registry::ArgumentRegistry;

use std::sync::Arc;

use crate::sender::CommandSender;
use crate::value::{Value, ValueKind};

/// Everything a suggester gets to look at.
pub struct SuggestContext<'a> {
    /// Who is typing.
    pub sender: &'a dyn CommandSender,
    /// Command name (without the leading `/`).
    pub command: &'a str,
    /// Every argument token typed so far, the pending one last.
    pub tokens: &'a [&'a str],
}

impl SuggestContext<'_> {
    /// The token being completed (empty if the caller just typed a space).
    pub fn pending(&self) -> &str {
        self.tokens.last().copied().unwrap_or("")
    }
}

/// Node-level completion override.
pub type Suggester = Arc<dyn Fn(&SuggestContext<'_>) -> Vec<String> + Send + Sync>;

/// Wrap a closure as a [`Suggester`].
pub fn suggester<F>(f: F) -> Suggester
where
    F: Fn(&SuggestContext<'_>) -> Vec<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A typed argument.
///
/// Conversion never fails loudly: malformed input is `None`, which the
/// resolver treats as an ordinary no-match and backtracks past.
pub trait Argument: Send + Sync {
    /// Argument name, used for lookup and as the default tip.
    fn name(&self) -> &str;

    /// Kind of value [`convert`](Self::convert) produces.
    fn kind(&self) -> ValueKind;

    /// Convert one token, or `None` if it is not acceptable.
    fn convert(&self, token: &str) -> Option<Value>;

    /// Completion candidates for the pending token. Empty means "no suggestions".
    fn suggest(&self, _ctx: &SuggestContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

impl std::fmt::Debug for dyn Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Argument({}: {})", self.name(), self.kind())
    }
}
