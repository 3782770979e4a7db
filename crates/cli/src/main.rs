mod demo;
mod render;

use std::fs;
use std::io::{self, BufRead};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cmdtree_core::token::CommandLine;
use cmdtree_core::{
    CommandRegistry, DispatchConfig, MemorySender, PermissionPolicy, TokenCheck, codes,
};
use cmdtree_diagnostics::{self as diag, Diagnostic};
use cmdtree_permission::load_profile_from_str;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::render::{Format, print_json, print_summary, render_failure, render_list, render_success};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cmdtree",
    version,
    about = "Demo command console: run, complete and inspect tree-structured commands"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Permission profile (JSON) describing who is typing. Defaults to the
    /// built-in console sender.
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Which nodes' permissions a caller must hold.
    #[arg(long, global = true, value_enum, default_value_t = PolicyArg::LeafOnly)]
    policy: PolicyArg,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run one command line, e.g. `cmdtree run "/give Alex diamond 3"`.
    Run {
        #[arg(allow_hyphen_values = true)]
        line: String,
    },

    /// Print completion candidates for the last token of a line.
    Complete {
        #[arg(allow_hyphen_values = true)]
        line: String,
    },

    /// Print the tips for the arguments still expected after a line.
    Tips {
        #[arg(allow_hyphen_values = true)]
        line: String,
    },

    /// Check whether the last token of a line is acceptable where it stands.
    Check {
        #[arg(allow_hyphen_values = true)]
        line: String,
    },

    /// Read command lines from stdin and run each one. Blank lines and lines
    /// starting with `#` are skipped.
    Repl,

    /// Explain a diagnostic ID (e.g. CMD1002).
    Explain { id: String },
}

/// Permission policy for the `--policy` flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Only the matched overload's own permissions.
    LeafOnly,
    /// Every permission on the matched path.
    Inherit,
}

impl From<PolicyArg> for PermissionPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::LeafOnly => PermissionPolicy::LeafOnly,
            PolicyArg::Inherit => PermissionPolicy::InheritAncestors,
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Cmd::Explain { id } = &cli.cmd {
        return cmd_explain(id, format);
    }

    let config = DispatchConfig::default().with_permission_policy(cli.policy.into());
    let registry = demo::registry(config)?;
    let sender = load_sender(cli.profile.as_deref(), format)?;

    match cli.cmd {
        Cmd::Run { line } => {
            if !run_line(&registry, &sender, &line, format)? {
                process::exit(1);
            }
        }
        Cmd::Complete { line } => {
            render_list("completions", &registry.complete(&sender, &line), format)?;
        }
        Cmd::Tips { line } => render_list("tips", &registry.tips(&sender, &line), format)?,
        Cmd::Check { line } => cmd_check(&registry, &sender, &line, format)?,
        Cmd::Repl => cmd_repl(&registry, &sender, format)?,
        Cmd::Explain { .. } => {}
    }

    Ok(())
}

/// Stderr logging. `RUST_LOG` overrides the level picked by `-v`/`-q`.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).init();
}

// ── Commands ────────────────────────────────────────────────────────────

/// Run one line and render its outcome. Returns whether it succeeded.
fn run_line(
    registry: &CommandRegistry,
    sender: &MemorySender,
    line: &str,
    format: Format,
) -> Result<bool> {
    match registry.execute(sender, line) {
        Ok(()) => {
            render_success(line, &sender.take_messages(), format)?;
            Ok(true)
        }
        Err(err) => {
            tracing::debug!(line, code = err.code(), "command failed");
            // Messages sent before the failure still belong to this line.
            let sent = sender.take_messages();
            if format == Format::Pretty {
                for m in &sent {
                    println!("{m}");
                }
            }
            let diagnostic = err.to_diagnostic(CommandLine::parse(line).as_ref());
            render_failure(line, &diagnostic, format)?;
            Ok(false)
        }
    }
}

fn cmd_check(
    registry: &CommandRegistry,
    sender: &MemorySender,
    line: &str,
    format: Format,
) -> Result<()> {
    match registry.check_last_token(sender, line) {
        TokenCheck::Accepted => match format {
            Format::Pretty => println!("accepted"),
            Format::Json => print_json(&serde_json::json!({ "ok": true, "line": line }))?,
        },
        TokenCheck::Rejected { message } => {
            let span = CommandLine::parse(line).map(|parsed| match parsed.args().last() {
                Some(last) => last.span(),
                None => parsed.name_span(),
            });
            let diagnostic = Diagnostic::from_code(codes::TOKEN_REJECTED, message, span);
            render_failure(line, &diagnostic, format)?;
            process::exit(1);
        }
    }
    Ok(())
}

fn cmd_repl(registry: &CommandRegistry, sender: &MemorySender, format: Format) -> Result<()> {
    let (mut ok, mut failed) = (0usize, 0usize);
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if run_line(registry, sender, trimmed, format)? {
            ok += 1;
        } else {
            failed += 1;
        }
    }
    if format == Format::Pretty {
        print_summary(ok, failed);
    }
    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(&serde_json::json!({
            "id": id,
            "explanation": diag::explain(id),
            "severity": diag::default_severity(id),
        }))?,
        Format::Pretty => {
            use ariadne::Fmt;
            match diag::explain(id) {
                Some(text) => println!("{}: {}", id.fg(ariadne::Color::Cyan), text),
                None => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// The sender described by `--profile`, or the built-in console.
fn load_sender(profile_path: Option<&str>, format: Format) -> Result<MemorySender> {
    let Some(path) = profile_path else {
        return Ok(MemorySender::new(
            "console",
            "console",
            demo::console_permissions(),
        ));
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read profile {path}"))?;
    match load_profile_from_str(&text) {
        Ok(profile) => {
            tracing::debug!(profile = %profile.id, grants = profile.grants.len(), "profile loaded");
            Ok(MemorySender::new(
                profile.sender.name.clone(),
                profile.sender.kind.clone(),
                Arc::new(profile.to_store()),
            ))
        }
        Err(e) => {
            let diagnostic = Diagnostic::from_code(
                codes::INVALID_PROFILE,
                format!("invalid permission profile {path}: {e}"),
                None,
            )
            .with_context([("path".to_string(), path.to_string())].into());
            render_failure(&text, &diagnostic, format)?;
            process::exit(1);
        }
    }
}
