//! Shared fixtures for `cmdtree_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::{Arc, Mutex};

use cmdtree_core::{
    Command, CommandBuilder, CommandRegistry, ExecutorError, MemorySender, Param,
    PermissionStore, Signature, Value,
};

/// Composite value built by the `position` aggregate.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub i32, pub i32, pub i32);

/// Calls recorded by [`recorder`] executors: `(overload label, values)`.
pub type Calls = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

/// Executor that appends `(label, values)` to `calls`.
#[allow(dead_code)]
pub fn recorder(
    calls: &Calls,
    label: &str,
) -> impl Fn(&dyn cmdtree_core::CommandSender, &[Value]) -> Result<(), ExecutorError> + Send + Sync + 'static
{
    let calls = Arc::clone(calls);
    let label = label.to_string();
    move |_, values| {
        calls
            .lock()
            .unwrap()
            .push((label.clone(), values.to_vec()));
        Ok(())
    }
}

/// Caller of type `kind` holding `grants`.
#[allow(dead_code)]
pub fn sender(kind: &str, grants: &[(&str, bool)]) -> MemorySender {
    let store = PermissionStore::from_grants(grants.iter().map(|&(k, v)| (k, v)));
    MemorySender::new(format!("{kind}-1"), kind, Arc::new(store))
}

/// `/num help` and `/num <Integer> <String>`.
#[allow(dead_code)]
pub fn help_or_pair(calls: &Calls) -> Command {
    CommandBuilder::new("num")
        .overload(Signature::new([Param::literal("help")]).executes(recorder(calls, "help")))
        .overload(
            Signature::new([Param::arg("Integer"), Param::arg("String")])
                .executes(recorder(calls, "pair")),
        )
        .build()
        .unwrap()
}

/// `/point <x> <y> <z>` folded into one [`Point`].
#[allow(dead_code)]
pub fn point(calls: &Calls) -> Command {
    CommandBuilder::new("point")
        .overload(
            Signature::new([Param::aggregate(
                "position",
                [
                    Param::arg("Integer").tip("x"),
                    Param::arg("Integer").tip("y"),
                    Param::arg("Integer").tip("z"),
                ],
                fold_point,
            )])
            .executes(recorder(calls, "point")),
        )
        .build()
        .unwrap()
}

/// Combinator for [`Point`].
#[allow(dead_code)]
pub fn fold_point(values: &[Value]) -> Option<Value> {
    let [x, y, z] = values else {
        return None;
    };
    let coord = |v: &Value| v.as_i64().and_then(|n| i32::try_from(n).ok());
    Some(Value::object(Point(coord(x)?, coord(y)?, coord(z)?)))
}

/// `/ban <String>` gated to `admin` callers, permission `mod.ban`.
#[allow(dead_code)]
pub fn admin_only(calls: &Calls) -> Command {
    CommandBuilder::new("ban")
        .overload(
            Signature::new([Param::sender(["admin"]), Param::arg("String").tip("target")])
                .permission("mod.ban")
                .executes(recorder(calls, "ban")),
        )
        .build()
        .unwrap()
}

/// `/tip <x> <y> <z>`.
#[allow(dead_code)]
pub fn tip_command(calls: &Calls) -> Command {
    CommandBuilder::new("tip")
        .overload(
            Signature::new([
                Param::arg("Integer").tip("x"),
                Param::arg("Integer").tip("y"),
                Param::arg("Integer").tip("z"),
            ])
            .executes(recorder(calls, "xyz")),
        )
        .build()
        .unwrap()
}

/// Registry holding every fixture command.
#[allow(dead_code)]
pub fn registry(calls: &Calls) -> CommandRegistry {
    let mut r = CommandRegistry::new();
    for cmd in [
        help_or_pair(calls),
        point(calls),
        admin_only(calls),
        tip_command(calls),
    ] {
        r.register(cmd).unwrap();
    }
    r
}

/// Fresh call log.
#[allow(dead_code)]
pub fn calls() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}
