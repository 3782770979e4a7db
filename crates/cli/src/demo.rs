//! Demo console commands.
//!
//! A small server-console flavoured command set that exercises every node
//! kind: literals, typed arguments, sender gates, aggregates, permissions and
//! custom suggesters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use cmdtree_core::{
    Command, CommandBuilder, CommandRegistry, CommandSender, DispatchConfig, ExecutorError, Param,
    Signature, Value,
};
use cmdtree_permission::PermissionStore;

/// Players the demo pretends are online, used for completion.
pub(crate) const ONLINE_PLAYERS: &[&str] = &["Alex", "Notch", "Steve"];

/// Grants held by the built-in console sender.
pub(crate) const CONSOLE_GRANTS: &[(&str, bool)] = &[
    ("chat", true),
    ("console", true),
    ("items", true),
    ("server", true),
    ("world", true),
];

/// A world position built from three coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Position {
    x: f64,
    y: f64,
    z: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

fn position(values: &[Value]) -> Option<Value> {
    let [x, y, z] = values else {
        return None;
    };
    Some(Value::object(Position {
        x: x.as_f64()?,
        y: y.as_f64()?,
        z: z.as_f64()?,
    }))
}

fn coordinates() -> Param {
    Param::aggregate(
        "position",
        [
            Param::arg("Double").tip("x"),
            Param::arg("Double").tip("y"),
            Param::arg("Double").tip("z"),
        ],
        position,
    )
}

fn player() -> Param {
    Param::arg("String").tip("player").suggest_with(|ctx| {
        ONLINE_PLAYERS
            .iter()
            .filter(|p| p.to_lowercase().starts_with(&ctx.pending().to_lowercase()))
            .map(ToString::to_string)
            .collect()
    })
}

fn text(values: &[Value], index: usize) -> &str {
    values.get(index).and_then(Value::as_str).unwrap_or_default()
}

// ── Commands ────────────────────────────────────────────────────────────

fn say() -> Result<Command> {
    Ok(CommandBuilder::new("say")
        .description("Broadcast a one-word message")
        .overload(
            Signature::new([Param::arg("String").tip("message")])
                .permission("chat.say")
                .executes(|sender, args| {
                    sender.send_message(&format!("[{}] {}", sender.name(), text(args, 0)));
                    Ok(())
                }),
        )
        .overload(
            Signature::new([Param::literal("loud"), Param::arg("String").tip("message")])
                .permission("chat.say.loud")
                .executes(|sender, args| {
                    let message = text(args, 1).to_uppercase();
                    sender.send_message(&format!("[{}] {message}!", sender.name()));
                    Ok(())
                }),
        )
        .build()?)
}

fn tp() -> Result<Command> {
    Ok(CommandBuilder::new("tp")
        .description("Teleport to a position")
        .help("Players teleport themselves; anyone may teleport a named player.")
        .overload(
            Signature::new([Param::sender(["player"]), coordinates()])
                .permission("world.teleport")
                .executes(|sender, args| {
                    let pos = args.get(1).and_then(Value::downcast_ref::<Position>);
                    let Some(pos) = pos else {
                        return Err("missing position".into());
                    };
                    sender.send_message(&format!("Teleported {} to {pos}", sender.name()));
                    Ok(())
                }),
        )
        .overload(
            Signature::new([player(), coordinates()])
                .permission("world.teleport.others")
                .executes(|sender, args| {
                    let pos = args.get(1).and_then(Value::downcast_ref::<Position>);
                    let Some(pos) = pos else {
                        return Err("missing position".into());
                    };
                    sender.send_message(&format!("Teleported {} to {pos}", text(args, 0)));
                    Ok(())
                }),
        )
        .build()?)
}

fn give() -> Result<Command> {
    let execute = |sender: &dyn CommandSender, args: &[Value]| -> Result<(), ExecutorError> {
        let count = args.get(2).and_then(Value::as_i64).unwrap_or(1);
        if count <= 0 {
            return Err(format!("count must be positive, got {count}").into());
        }
        sender.send_message(&format!(
            "Gave {count} {} to {}",
            text(args, 1),
            text(args, 0)
        ));
        Ok(())
    };
    Ok(CommandBuilder::new("give")
        .description("Give items to a player")
        .overload(
            Signature::new([player(), Param::arg("String").tip("item")])
                .permission("items.give")
                .executes(execute),
        )
        .overload(
            Signature::new([
                player(),
                Param::arg("String").tip("item"),
                Param::arg("Integer").tip("count"),
            ])
                .permission("items.give.bulk")
                .executes(execute),
        )
        .build()?)
}

fn op() -> Result<Command> {
    Ok(CommandBuilder::new("op")
        .description("Grant operator status")
        .overload(
            Signature::new([player()])
                .permission("console.op")
                .executes(|sender, args| {
                    sender.send_message(&format!("Made {} a server operator", text(args, 0)));
                    Ok(())
                }),
        )
        .build()?)
}

fn stop() -> Result<Command> {
    Ok(CommandBuilder::new("stop")
        .description("Stop the server")
        .overload(
            Signature::new([Param::sender(["console"])])
                .permission("server.stop")
                .executes(|sender, _| {
                    sender.send_message("Stopping the server");
                    Ok(())
                }),
        )
        .build()?)
}

fn help(usages: BTreeMap<String, (String, Vec<String>)>) -> Result<Command> {
    let names: Vec<String> = usages.keys().cloned().collect();
    let all = Arc::new(usages);
    let one = Arc::clone(&all);
    Ok(CommandBuilder::new("help")
        .description("List commands or show one command's usage")
        .overload(Signature::new([]).executes(move |sender, _| {
            for (name, (description, _)) in all.iter() {
                sender.send_message(&format!("/{name} - {description}"));
            }
            Ok(())
        }))
        .overload(
            Signature::new([Param::arg("String")
                .tip("command")
                .suggest_with(move |ctx| {
                    names
                        .iter()
                        .filter(|n| n.starts_with(ctx.pending()))
                        .cloned()
                        .collect()
                })])
            .executes(move |sender, args| {
                let name = text(args, 0).trim_start_matches('/').to_lowercase();
                let Some((_, lines)) = one.get(&name) else {
                    return Err(format!("no command named /{name}").into());
                };
                for line in lines {
                    sender.send_message(line);
                }
                Ok(())
            }),
        )
        .build()?)
}

/// Registry holding every demo command.
pub(crate) fn registry(config: DispatchConfig) -> Result<CommandRegistry> {
    let commands = [say()?, tp()?, give()?, op()?, stop()?];
    let mut usages: BTreeMap<String, (String, Vec<String>)> = commands
        .iter()
        .map(|c| {
            (
                c.name().to_string(),
                (c.description().to_string(), c.usages()),
            )
        })
        .collect();
    usages.insert(
        "help".to_string(),
        (
            "List commands or show one command's usage".to_string(),
            vec!["/help".to_string(), "/help <command>".to_string()],
        ),
    );

    let mut registry = CommandRegistry::with_config(config);
    for command in commands {
        registry.register(command)?;
    }
    registry.register(help(usages)?)?;
    tracing::debug!(commands = registry.len(), "demo registry ready");
    Ok(registry)
}

/// Permission store for the built-in console sender.
pub(crate) fn console_permissions() -> Arc<PermissionStore> {
    Arc::new(PermissionStore::from_grants(CONSOLE_GRANTS.iter().copied()))
}
