//! Output rendering for the console.
//!
//! Dispatch failures become [`Diagnostic`]s rendered with ariadne against the
//! command line that produced them. Everything else (executor messages,
//! completions, tips) is printed as plain lines, or as JSON when the output
//! is piped or `--output json` is given.

use std::io::{self, IsTerminal};

use anyhow::Result;
use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use cmdtree_diagnostics::{Diagnostic, Severity};
use serde::Serialize;

/// Name shown in ariadne reports for the command line source.
const SOURCE_NAME: &str = "<command>";

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured terminal output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use `explicit` if given, else pretty for a TTY and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ if io::stdout().is_terminal() => Format::Pretty,
            _ => Format::Json,
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// Render `diag` against `line` on stderr.
fn render_pretty(line: &str, diag: &Diagnostic) {
    let Some(span) = &diag.span else {
        eprintln!("{}", diag);
        if let Some(note) = context_note(diag) {
            eprintln!("  = note: {note}");
        }
        if let Some(help) = diag.explain() {
            eprintln!("  = help: {help}");
        }
        return;
    };

    let start = span.start.min(line.len());
    let end = span.end.min(line.len()).max(start);
    let label = match diag.context.as_ref().and_then(|c| c.get("missing")) {
        Some(missing) => format!("requires {missing}"),
        None => diag.message.clone(),
    };

    let mut report = Report::build(report_kind(&diag.severity), (SOURCE_NAME, start..end))
        .with_code(diag.id.as_ref())
        .with_message(&diag.message)
        .with_config(Config::default().with_compact(false))
        .with_label(
            Label::new((SOURCE_NAME, start..end))
                .with_message(label)
                .with_color(severity_color(&diag.severity)),
        );
    if let Some(note) = context_note(diag) {
        report = report.with_note(note);
    }
    if let Some(help) = diag.explain() {
        report = report.with_help(help);
    }
    report
        .finish()
        .eprint((SOURCE_NAME, Source::from(line)))
        .ok();
}

/// Render one failed line: ariadne on stderr, or a JSON envelope on stdout.
pub(crate) fn render_failure(line: &str, diag: &Diagnostic, format: Format) -> Result<()> {
    match format {
        Format::Pretty => render_pretty(line, diag),
        Format::Json => print_json(&serde_json::json!({
            "ok": false,
            "line": line,
            "diagnostic": diag,
        }))?,
    }
    Ok(())
}

/// Print a one-line `n ok, m failed` summary to stderr.
pub(crate) fn print_summary(ok: usize, failed: usize) {
    if ok + failed == 0 {
        return;
    }
    let failed_part = if failed > 0 {
        format!("{}", format!("{failed} failed").fg(Color::Red))
    } else {
        "0 failed".to_string()
    };
    eprintln!("{}, {failed_part}", format!("{ok} ok").fg(Color::Green));
}

// ── Results ─────────────────────────────────────────────────────────────

/// Print messages an executor sent back.
pub(crate) fn render_success(line: &str, messages: &[String], format: Format) -> Result<()> {
    match format {
        Format::Pretty => {
            for m in messages {
                println!("{m}");
            }
        }
        Format::Json => print_json(&serde_json::json!({
            "ok": true,
            "line": line,
            "messages": messages,
        }))?,
    }
    Ok(())
}

/// Print a list of strings (completions, tips) one per line, or as a JSON
/// object `{ "<key>": [...] }`.
pub(crate) fn render_list(key: &str, items: &[String], format: Format) -> Result<()> {
    match format {
        Format::Pretty => {
            for item in items {
                println!("{item}");
            }
        }
        Format::Json => {
            let mut obj = serde_json::Map::new();
            obj.insert(key.to_string(), serde_json::json!(items));
            print_json(&obj)?;
        }
    }
    Ok(())
}

/// Serialize `value` to stdout as one compact JSON line.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
