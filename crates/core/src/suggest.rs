//! Completion candidates, usage tips and pending-token checks.
//!
//! All three start from the *anchor*: the node reached by the committed
//! tokens (every token but the pending last one). Completions come from the
//! anchor's children, looking through zero-width children (admitted sender
//! gates and aggregates) to the token-consuming nodes below them.

use std::collections::HashSet;

use crate::argument::SuggestContext;
use crate::resolve::{locate, resolve};
use crate::sender::CommandSender;
use crate::tree::{GrammarTree, MatchMode, NodeId, NodeKind};

/// Whether the pending token can be accepted where it stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    /// Some overload accepts the token (or nothing has been typed yet).
    Accepted,
    /// No overload accepts the token.
    Rejected {
        /// Human-readable reason.
        message: String,
    },
}

/// Node whose children describe what the last token of `tokens` may be, or
/// `None` if the committed tokens match nothing.
///
/// When `tokens` resolves to a complete match the anchor is taken from that
/// match's path, so it is always an ancestor of the winning node. Otherwise
/// the committed tokens are located on their own.
pub fn anchor(tree: &GrammarTree, sender: &dyn CommandSender, tokens: &[&str]) -> Option<NodeId> {
    let Some(committed) = tokens.len().checked_sub(1) else {
        return Some(NodeId::ROOT);
    };

    let full = resolve(tree, sender, tokens);
    if full.complete {
        let mut anchor = NodeId::ROOT;
        let mut consumed = 0;
        for id in tree.path(full.node) {
            consumed += tree.get(id).width();
            if consumed > committed {
                break;
            }
            anchor = id;
        }
        return Some(anchor);
    }

    locate(tree, sender, &tokens[..committed])
}

/// Completion candidates for the last token, deduplicated, in match order.
pub fn suggest(
    tree: &GrammarTree,
    sender: &dyn CommandSender,
    command: &str,
    tokens: &[&str],
) -> Vec<String> {
    let tokens: &[&str] = if tokens.is_empty() { &[""] } else { tokens };
    let ctx = SuggestContext {
        sender,
        command,
        tokens,
    };
    let pending = ctx.pending();

    let Some(anchor) = anchor(tree, sender, tokens) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in frontier(tree, sender, anchor) {
        let node = tree.get(id);
        let candidates = match (node.suggester(), node.kind()) {
            (Some(custom), _) => custom(&ctx),
            (None, NodeKind::Literal(text)) if text.starts_with(pending) => vec![text.clone()],
            (None, NodeKind::Argument(arg)) => arg.suggest(&ctx),
            _ => Vec::new(),
        };
        for c in candidates {
            if seen.insert(c.clone()) {
                out.push(c);
            }
        }
    }
    out
}

/// Tips of the nodes still expected after the committed tokens, following
/// the highest-priority branch from the anchor. Nodes without a tip are
/// skipped.
pub fn tips(tree: &GrammarTree, sender: &dyn CommandSender, tokens: &[&str]) -> Vec<String> {
    let tokens: &[&str] = if tokens.is_empty() { &[""] } else { tokens };
    let mut out = Vec::new();
    let Some(mut current) = anchor(tree, sender, tokens) else {
        return out;
    };
    while let Some(next) = tree
        .get(current)
        .children()
        .iter()
        .copied()
        .find(|&c| visible(tree, sender, c))
    {
        if let Some(tip) = tree.get(next).tip() {
            out.push(tip.to_string());
        }
        current = next;
    }
    out
}

/// Check the last token of `tokens` against every node that could consume it.
pub fn check_last_token(
    tree: &GrammarTree,
    sender: &dyn CommandSender,
    tokens: &[&str],
) -> TokenCheck {
    let pending = tokens.last().copied().unwrap_or("");
    if pending.is_empty() {
        return TokenCheck::Accepted;
    }

    let candidates = anchor(tree, sender, tokens)
        .map(|a| frontier(tree, sender, a))
        .unwrap_or_default();
    let accepted = candidates.iter().any(|&id| {
        tree.get(id)
            .attempt_match(sender, &[pending], MatchMode::Strict)
            .is_some()
    });
    if accepted {
        return TokenCheck::Accepted;
    }

    let expected: Vec<String> = candidates
        .iter()
        .map(|&id| {
            let node = tree.get(id);
            match node.kind() {
                NodeKind::Literal(text) => format!("'{text}'"),
                NodeKind::Argument(arg) => format!("<{}>", node.tip().unwrap_or(arg.name())),
                _ => String::new(),
            }
        })
        .collect();
    let message = if expected.is_empty() {
        format!("unexpected argument '{pending}'")
    } else {
        format!("'{pending}' is not valid here; expected {}", expected.join(" or "))
    };
    TokenCheck::Rejected { message }
}

/// Token-consuming nodes reachable from `from` through zero-width children,
/// in match order.
fn frontier(tree: &GrammarTree, sender: &dyn CommandSender, from: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.get(from).children().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if !visible(tree, sender, id) {
            continue;
        }
        let node = tree.get(id);
        if node.width() > 0 {
            out.push(id);
        } else {
            stack.extend(node.children().iter().rev().copied());
        }
    }
    out
}

fn visible(tree: &GrammarTree, sender: &dyn CommandSender, id: NodeId) -> bool {
    match tree.get(id).kind() {
        NodeKind::Sender(gate) => gate.allows(sender.kind()),
        _ => true,
    }
}
