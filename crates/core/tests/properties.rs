//! Property tests for resolution, anchoring and aggregation.

mod common;

use cmdtree_core::collect::collect;
use cmdtree_core::resolve::resolve;
use cmdtree_core::suggest::anchor;
use cmdtree_core::{
    Command, CommandBuilder, CommandRegistry, CommandSender, ExecutorError, Param, Signature, Value,
};
use common::{Point, calls, fold_point, recorder, sender};
use proptest::prelude::*;

fn ok(_: &dyn CommandSender, _: &[Value]) -> Result<(), ExecutorError> {
    Ok(())
}

fn sum(values: &[Value]) -> Option<Value> {
    Some(Value::Long(values.iter().filter_map(Value::as_i64).sum()))
}

/// Overloads that overlap heavily, so resolution has to backtrack.
fn mixed() -> Command {
    CommandBuilder::new("mix")
        .overload(Signature::new([Param::literal("a"), Param::arg("Integer")]).executes(ok))
        .overload(Signature::new([Param::literal("a"), Param::arg("String")]).executes(ok))
        .overload(Signature::new([Param::arg("String"), Param::arg("String")]).executes(ok))
        .overload(
            Signature::new([Param::arg("Integer"), Param::arg("Integer"), Param::arg("Integer")])
                .executes(ok),
        )
        .overload(
            Signature::new([Param::aggregate(
                "sum",
                [Param::arg("Integer"), Param::arg("Integer")],
                sum,
            )])
            .executes(ok),
        )
        .overload(Signature::new([Param::literal("b")]).executes(ok))
        .overload(Signature::new([Param::arg("String")]).executes(ok))
        .overload(Signature::new([Param::arg("Boolean"), Param::literal("a")]).executes(ok))
        .build()
        .unwrap()
}

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("true".to_string()),
        "-?[0-9]{1,3}",
        "[a-z]{1,4}",
    ]
}

fn tokens() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(token(), 0..6)
}

proptest! {
    #[test]
    fn resolution_is_deterministic(raw in tokens()) {
        let cmd = mixed();
        let s = sender("console", &[]);
        let toks: Vec<&str> = raw.iter().map(String::as_str).collect();
        let first = resolve(cmd.tree(), &s, &toks);
        for _ in 0..3 {
            let again = resolve(cmd.tree(), &s, &toks);
            prop_assert_eq!(again.node, first.node);
            prop_assert_eq!(again.consumed, first.consumed);
            prop_assert_eq!(again.complete, first.complete);
        }
        let cloned = cmd.tree().clone();
        prop_assert_eq!(resolve(&cloned, &s, &toks).node, first.node);
    }

    #[test]
    fn anchor_is_ancestor_of_complete_match(raw in tokens()) {
        let cmd = mixed();
        let s = sender("console", &[]);
        let toks: Vec<&str> = raw.iter().map(String::as_str).collect();
        let full = resolve(cmd.tree(), &s, &toks);
        prop_assume!(full.complete);
        let a = anchor(cmd.tree(), &s, &toks);
        prop_assert!(a.is_some());
        let a = a.unwrap();
        prop_assert!(cmd.tree().ancestors(full.node).any(|n| n == a));
    }

    #[test]
    fn complete_match_consumes_every_token(raw in tokens()) {
        let cmd = mixed();
        let s = sender("console", &[]);
        let toks: Vec<&str> = raw.iter().map(String::as_str).collect();
        let r = resolve(cmd.tree(), &s, &toks);
        if r.complete {
            prop_assert_eq!(r.consumed, toks.len());
            prop_assert_eq!(cmd.tree().width_to(r.node), toks.len());
            prop_assert!(collect(cmd.tree(), &r).is_ok());
        } else {
            prop_assert!(r.consumed <= toks.len());
        }
    }

    #[test]
    fn aggregate_matches_direct_fold(x in any::<i32>(), y in any::<i32>(), z in any::<i32>()) {
        let log = calls();
        let mut r = CommandRegistry::new();
        r.register(common::point(&log)).unwrap();
        r.execute(&sender("console", &[]), &format!("/point {x} {y} {z}")).unwrap();

        let direct = fold_point(&[Value::Int(x), Value::Int(y), Value::Int(z)]).unwrap();
        let log = log.lock().unwrap();
        let collected = &log[0].1;
        prop_assert_eq!(collected.len(), 1);
        prop_assert_eq!(collected[0].downcast_ref::<Point>(), direct.downcast_ref::<Point>());
        prop_assert_eq!(collected[0].downcast_ref::<Point>(), Some(&Point(x, y, z)));
    }

    #[test]
    fn exact_literals_beat_arguments(words in prop::collection::vec("[a-z]{1,6}", 1..5)) {
        let log = calls();
        let literal = Signature::new(words.iter().map(Param::literal))
            .executes(recorder(&log, "literal"));
        let generic = Signature::new(words.iter().map(|_| Param::arg("String")))
            .executes(recorder(&log, "generic"));
        let mut r = CommandRegistry::new();
        r.register(
            CommandBuilder::new("lit")
                .overload(generic)
                .overload(literal)
                .build()
                .unwrap(),
        )
        .unwrap();
        r.execute(&sender("console", &[]), &format!("lit {}", words.join(" "))).unwrap();
        let log = log.lock().unwrap();
        prop_assert_eq!(log[0].0.as_str(), "literal");
    }
}
