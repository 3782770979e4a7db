//! Value collection along a resolved path.

use crate::error::CollectError;
use crate::resolve::Resolution;
use crate::tree::{GrammarTree, NodeKind};
use crate::value::Value;

/// Values for the executor of `resolution.node`, root to leaf.
///
/// Each value-producing node contributes its slot. An aggregate node
/// replaces the `arity` values immediately before it with the combinator's
/// result, so nested aggregates fold inner to outer.
pub fn collect(tree: &GrammarTree, resolution: &Resolution) -> Result<Vec<Value>, CollectError> {
    let mut stack: Vec<Value> = Vec::new();
    for id in tree.path(resolution.node) {
        match tree.get(id).kind() {
            NodeKind::Aggregate(agg) => {
                let available = stack.len();
                if available < agg.arity() {
                    return Err(CollectError::Underflow {
                        label: agg.label().to_string(),
                        arity: agg.arity(),
                        available,
                    });
                }
                let operands = stack.split_off(available - agg.arity());
                let folded = agg
                    .combine(&operands)
                    .ok_or_else(|| CollectError::CombinatorRejected {
                        label: agg.label().to_string(),
                    })?;
                stack.push(folded);
            }
            _ => {
                if let Some(v) = resolution.slot(id) {
                    stack.push(v.clone());
                }
            }
        }
    }
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::IntegerArgument;
    use crate::resolve::resolve;
    use crate::sender::MemorySender;
    use crate::tree::{Aggregate, NodeId, combinator, executor};
    use cmdtree_permission::PermissionStore;
    use std::sync::Arc;

    fn sender() -> MemorySender {
        MemorySender::new("tester", "player", Arc::new(PermissionStore::new()))
    }

    fn int_chain(t: &mut GrammarTree, mut at: NodeId, n: usize) -> NodeId {
        for _ in 0..n {
            at = t
                .add_node(at, NodeKind::Argument(Arc::new(IntegerArgument)))
                .unwrap();
        }
        at
    }

    fn sum(label: &str, arity: usize) -> NodeKind {
        NodeKind::Aggregate(Aggregate::new(
            label,
            arity,
            combinator(|vs| {
                vs.iter()
                    .map(Value::as_i64)
                    .sum::<Option<i64>>()
                    .map(Value::Long)
            }),
        ))
    }

    #[test]
    fn aggregate_folds_in_declaration_order() {
        let mut t = GrammarTree::new();
        let last = int_chain(&mut t, NodeId::ROOT, 3);
        let agg = t
            .add_node(
                last,
                NodeKind::Aggregate(Aggregate::new(
                    "digits",
                    3,
                    combinator(|vs| {
                        Some(Value::Text(vs.iter().map(ToString::to_string).collect()))
                    }),
                )),
            )
            .unwrap();
        t.node_mut(agg).unwrap().set_executor(executor(|_, _| Ok(())));

        let r = resolve(&t, &sender(), &["1", "2", "3"]);
        assert!(r.complete);
        assert_eq!(collect(&t, &r).unwrap(), [Value::Text("123".into())]);
    }

    #[test]
    fn values_outside_the_aggregate_are_kept() {
        // "add" <a> <b> [sum] <c>
        let mut t = GrammarTree::new();
        let add = t
            .add_node(NodeId::ROOT, NodeKind::Literal("add".into()))
            .unwrap();
        let b = int_chain(&mut t, add, 2);
        let agg = t.add_node(b, sum("pair", 2)).unwrap();
        let c = int_chain(&mut t, agg, 1);
        t.node_mut(c).unwrap().set_executor(executor(|_, _| Ok(())));

        let r = resolve(&t, &sender(), &["add", "4", "5", "6"]);
        assert_eq!(
            collect(&t, &r).unwrap(),
            [Value::Literal("add".into()), Value::Long(9), Value::Int(6)]
        );
    }

    #[test]
    fn nested_aggregates_fold_inner_first() {
        // <a> <b> [inner:2] <c> [outer:2]
        let mut t = GrammarTree::new();
        let b = int_chain(&mut t, NodeId::ROOT, 2);
        let inner = t.add_node(b, sum("inner", 2)).unwrap();
        let c = int_chain(&mut t, inner, 1);
        let outer = t
            .add_node(
                c,
                NodeKind::Aggregate(Aggregate::new(
                    "outer",
                    2,
                    combinator(|vs| match vs {
                        [Value::Long(ab), Value::Int(c)] => Some(Value::Long(ab * i64::from(*c))),
                        _ => None,
                    }),
                )),
            )
            .unwrap();
        t.node_mut(outer).unwrap().set_executor(executor(|_, _| Ok(())));

        let r = resolve(&t, &sender(), &["2", "3", "4"]);
        assert_eq!(collect(&t, &r).unwrap(), [Value::Long(20)]);
    }

    #[test]
    fn underflow_and_rejection_are_reported() {
        let mut t = GrammarTree::new();
        let a = int_chain(&mut t, NodeId::ROOT, 1);
        let agg = t.add_node(a, sum("too-wide", 2)).unwrap();
        t.node_mut(agg).unwrap().set_executor(executor(|_, _| Ok(())));
        let r = resolve(&t, &sender(), &["1"]);
        assert_eq!(
            collect(&t, &r),
            Err(CollectError::Underflow {
                label: "too-wide".into(),
                arity: 2,
                available: 1
            })
        );

        let mut t = GrammarTree::new();
        let a = int_chain(&mut t, NodeId::ROOT, 1);
        let agg = t
            .add_node(
                a,
                NodeKind::Aggregate(Aggregate::new("never", 1, combinator(|_| None))),
            )
            .unwrap();
        t.node_mut(agg).unwrap().set_executor(executor(|_, _| Ok(())));
        let r = resolve(&t, &sender(), &["1"]);
        assert_eq!(
            collect(&t, &r),
            Err(CollectError::CombinatorRejected {
                label: "never".into()
            })
        );
    }
}
