//! Diagnostics for command resolution.
//!
//! Provides [`Diagnostic`], [`Severity`] and [`Span`] types used to report
//! dispatch failures, registration problems and completion hints back to a
//! console. Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from `spec/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the command was refused.
    Error,
    /// Warning: the line is not (yet) usable as typed.
    Warn,
    /// Informational note.
    Info,
}

/// Byte span in the raw command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic message produced while registering, resolving or running a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"CMD1002"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional byte span in the raw command line that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    /// Absent when no context is applicable. Serialized only when present.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Create a diagnostic whose severity is the code's default severity.
    ///
    /// Unknown codes fall back to [`Severity::Error`].
    pub fn from_code(
        id: &'static str,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        let severity = default_severity(id).unwrap_or(Severity::Error);
        Self::new(id, severity, message, span)
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"command"`, `"sender"`, `"missing"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }

    /// Whether this diagnostic has error severity.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the default severity declared for a diagnostic code, if known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [&str; 9] = [
        codes::COMMAND_NOT_FOUND,
        codes::WRONG_USAGE,
        codes::UNAUTHORIZED,
        codes::WRONG_SENDER,
        codes::EXECUTOR_FAILED,
        codes::TOKEN_REJECTED,
        codes::DUPLICATE_COMMAND,
        codes::INVALID_GRAMMAR,
        codes::INVALID_PROFILE,
    ];

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_new_valid() {
        let s = Span::new(5, 10);
        assert_eq!(s.start, 5);
        assert_eq!(s.end, 10);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn span_empty() {
        let s = Span::empty(7);
        assert_eq!(s.start, 7);
        assert!(s.is_empty());
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    #[test]
    fn span_cover_is_order_independent() {
        let a = Span::new(4, 6);
        let b = Span::new(10, 12);
        assert_eq!(a.cover(b), Span::new(4, 12));
        assert_eq!(b.cover(a), Span::new(4, 12));
    }

    // ── Severity ────────────────────────────────────────────────────────

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Severity::Warn), "warn");
        assert_eq!(format!("{}", Severity::Info), "info");
    }

    #[test]
    fn default_severity_follows_table() {
        assert_eq!(default_severity(codes::WRONG_USAGE), Some(Severity::Error));
        assert_eq!(default_severity(codes::TOKEN_REJECTED), Some(Severity::Warn));
        assert_eq!(default_severity("CMD9999"), None);
    }

    // ── Diagnostic ──────────────────────────────────────────────────────

    #[test]
    fn diagnostic_from_code_uses_default_severity() {
        let d = Diagnostic::from_code(codes::TOKEN_REJECTED, "nope", None);
        assert_eq!(d.severity, Severity::Warn);
        assert!(!d.is_error());

        let d = Diagnostic::from_code(codes::UNAUTHORIZED, "denied", Some(Span::new(0, 2)));
        assert_eq!(d.id, "CMD1003");
        assert!(d.is_error());
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::WRONG_USAGE, "/tp was used incorrectly", None);
        assert_eq!(
            format!("{}", d),
            "error[CMD1002]: /tp was used incorrectly"
        );
    }

    #[test]
    fn diagnostic_explain_known_and_unknown() {
        let d = Diagnostic::error(codes::UNAUTHORIZED, "test", None);
        assert!(d.explain().unwrap().contains("permission"));
        let d = Diagnostic::error("UNKNOWN_CODE", "test", None);
        assert!(d.explain().is_none());
    }

    #[test]
    fn all_codes_have_explanations_and_severities() {
        for code in &ALL {
            assert!(explain(code).is_some(), "{code} has no explain() entry");
            assert!(default_severity(code).is_some(), "{code} has no severity");
        }
    }

    #[test]
    fn diagnostic_serde_omits_absent_fields() {
        let d = Diagnostic::error(codes::WRONG_USAGE, "test", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "None span should be omitted: {json}");
        assert!(
            !json.contains("context"),
            "None context should be omitted: {json}"
        );
    }

    #[test]
    fn diagnostic_context_serializes_in_key_order() {
        let d = Diagnostic::error(codes::UNAUTHORIZED, "denied", Some(Span::new(0, 3)))
            .with_context(BTreeMap::from([
                ("missing".into(), "world.edit".into()),
                ("command".into(), "fill".into()),
            ]));
        let json = serde_json::to_string(&d).unwrap();
        let c = json.find("\"command\"").unwrap();
        let m = json.find("\"missing\"").unwrap();
        assert!(c < m, "context keys should be sorted: {json}");
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
