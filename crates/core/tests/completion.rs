//! Completion, tips and pending-token checks on raw lines.

mod common;

use cmdtree_core::{CommandBuilder, CommandRegistry, Param, Signature, TokenCheck};
use common::{calls, registry, sender};

#[test]
fn tips_track_remaining_arguments() {
    let log = calls();
    let r = registry(&log);
    let s = sender("console", &[]);
    assert_eq!(r.tips(&s, "/tip "), ["x", "y", "z"]);
    assert_eq!(r.tips(&s, "/tip 1 "), ["y", "z"]);
    assert_eq!(r.tips(&s, "/tip 1 2 "), ["z"]);
    assert!(r.tips(&s, "/tip 1 2 3 ").is_empty());
}

#[test]
fn tips_for_partially_typed_argument_include_it() {
    let log = calls();
    let r = registry(&log);
    let s = sender("console", &[]);
    assert_eq!(r.tips(&s, "/tip 1"), ["x", "y", "z"]);
    assert_eq!(r.tips(&s, "/tip 1 2 3"), ["z"]);
}

#[test]
fn tips_after_unmatched_tokens_are_empty() {
    let log = calls();
    let r = registry(&log);
    let s = sender("console", &[]);
    assert!(r.tips(&s, "/tip a ").is_empty());
    assert!(r.tips(&s, "/missing ").is_empty());
}

#[test]
fn completes_literals_and_argument_hints() {
    let log = calls();
    let r = registry(&log);
    let s = sender("console", &[]);
    assert_eq!(r.complete(&s, "/num "), ["help", "[num]"]);
    assert_eq!(r.complete(&s, "/num h"), ["help"]);
    assert_eq!(r.complete(&s, "/num -4"), ["[num]"]);
    assert!(r.complete(&s, "/num x").is_empty());
    assert_eq!(r.complete(&s, "/num 5 "), ["[text]"]);
    assert!(r.complete(&s, "/num help ").is_empty());
}

#[test]
fn gated_branches_are_hidden_from_other_senders() {
    let log = calls();
    let r = registry(&log);
    assert!(r.complete(&sender("player", &[]), "/ban ").is_empty());
    assert_eq!(r.complete(&sender("admin", &[]), "/ban "), ["[text]"]);
}

#[test]
fn command_names_complete_by_prefix() {
    let log = calls();
    let r = registry(&log);
    let s = sender("console", &[]);
    assert_eq!(r.complete(&s, "/"), ["ban", "num", "point", "tip"]);
    assert_eq!(r.complete(&s, "/p"), ["point"]);
    assert!(r.complete(&s, "/zz").is_empty());
}

#[test]
fn custom_suggester_sees_context() {
    let mut r = CommandRegistry::new();
    r.register(
        CommandBuilder::new("warp")
            .overload(
                Signature::new([Param::arg("String").tip("name").suggest_with(|ctx| {
                    ["home", "hub", "spawn"]
                        .into_iter()
                        .filter(|w| w.starts_with(ctx.pending()))
                        .map(|w| format!("{w}@{}", ctx.sender.name()))
                        .collect()
                })])
                .executes(|_, _| Ok(())),
            )
            .build()
            .unwrap(),
    )
    .unwrap();
    let s = sender("player", &[]);
    assert_eq!(r.complete(&s, "/warp h"), ["home@player-1", "hub@player-1"]);
}

#[test]
fn last_token_check_on_lines() {
    let log = calls();
    let r = registry(&log);
    let s = sender("console", &[]);
    assert_eq!(r.check_last_token(&s, "/tip 1 2"), TokenCheck::Accepted);
    assert_eq!(r.check_last_token(&s, "/tip 1 "), TokenCheck::Accepted);
    let TokenCheck::Rejected { message } = r.check_last_token(&s, "/tip 1 two") else {
        panic!("expected rejection");
    };
    assert_eq!(message, "'two' is not valid here; expected <y>");
    assert!(matches!(
        r.check_last_token(&s, "/nope x"),
        TokenCheck::Rejected { .. }
    ));
}
