//! RI diagnostic taxonomy and the `ErrorReporter` boundary.
//!
//! Diagnostics reported through this crate are a distinct channel from
//! ordinary `Result` propagation: a validator that finds a bad argument
//! *reports and degrades* (drops the argument or the whole request) rather
//! than returning an `Err` up the call stack. `CoreError` (the `thiserror`
//! enum below) is reserved for the handful of places that genuinely need
//! `?`-propagation — resource failures reading an archive, mostly.

use std::fmt;

/// Severity ladder for RI diagnostics. Ordered so `severity >= Severity::Error`
/// reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Severe => "severe",
        };
        f.write_str(s)
    }
}

/// The RI error-code enumeration (spec §6.4). Grouped by the taxonomy in
/// spec §7: syntactic, semantic, resource, internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Syntactic
    BadToken,
    BadArray,
    BadParameterList,
    EofInString,
    UnbalancedBracket,
    // Semantic
    WrongArity,
    TypeMismatch,
    WrongColorSize,
    UnknownHandle,
    InvalidNesting,
    MotionSignatureMismatch,
    UnknownDeclaration,
    // Resource
    MissingFile,
    ProtocolBotch,
    // Internal
    Internal,
}

impl ErrorCode {
    /// Stable short mnemonic, useful in test assertions and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadToken => "bad-token",
            ErrorCode::BadArray => "bad-array",
            ErrorCode::BadParameterList => "bad-parameter-list",
            ErrorCode::EofInString => "eof-in-string",
            ErrorCode::UnbalancedBracket => "unbalanced-bracket",
            ErrorCode::WrongArity => "wrong-arity",
            ErrorCode::TypeMismatch => "type-mismatch",
            ErrorCode::WrongColorSize => "wrong-color-size",
            ErrorCode::UnknownHandle => "unknown-handle",
            ErrorCode::InvalidNesting => "invalid-nesting",
            ErrorCode::MotionSignatureMismatch => "motion-signature-mismatch",
            ErrorCode::UnknownDeclaration => "unknown-declaration",
            ErrorCode::MissingFile => "missing-file",
            ErrorCode::ProtocolBotch => "protocol-botch",
            ErrorCode::Internal => "internal",
        }
    }
}

/// One diagnostic record: code, severity, source location, and a concrete
/// message. Request handlers build these with enough detail to satisfy
/// spec §7's "expected-vs-actual phrase" requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub line: u32,
    pub source_name: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        code: ErrorCode,
        severity: Severity,
        line: u32,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            line,
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Severe
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}]: {}",
            self.source_name,
            self.line,
            self.severity,
            self.code.as_str(),
            self.message
        )
    }
}

/// Sink for diagnostics (spec §6.4). `report` must not return control to the
/// caller for `Severity::Severe` — implementations achieve this either by
/// aborting the process or by unwinding via `EscapeSevere` (see below).
pub trait ErrorReporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Raised by an `ErrorReporter` that wants "abort on severe" semantics
/// without calling `std::process::exit` — callers unwind to the context
/// boundary and treat this as a fatal outcome. This is the "single
/// severity-gated escape path" spec §9 calls for.
#[derive(Debug, thiserror::Error)]
#[error("severe RI error: {0}")]
pub struct EscapeSevere(pub Diagnostic);

/// Reporter that prints every diagnostic via `tracing` and unwinds
/// (panics, caught at the context boundary by the host) on `Severe`.
#[derive(Debug, Default)]
pub struct AbortOnSevereReporter;

impl ErrorReporter for AbortOnSevereReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
        if diagnostic.is_fatal() {
            panic!("{}", EscapeSevere(diagnostic));
        }
    }
}

/// Reporter that only logs; never aborts. Used by hosts that want to
/// continue rendering best-effort even after a severe error (spec §7
/// mentions "print or ignore handler continues").
#[derive(Debug, Default)]
pub struct PrintReporter;

impl ErrorReporter for PrintReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
    }
}

/// Reporter that discards everything. Useful in tests asserting on backend
/// call shape only.
#[derive(Debug, Default)]
pub struct IgnoreReporter;

impl ErrorReporter for IgnoreReporter {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Reporter that accumulates every diagnostic it sees, for assertions in
/// tests that need to inspect what was reported.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl ErrorReporter for CollectingReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

impl CollectingReporter {
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity == severity)
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Info => tracing::info!(target: "rib.diagnostic", %diagnostic),
        Severity::Warning => tracing::warn!(target: "rib.diagnostic", %diagnostic),
        Severity::Error | Severity::Severe => {
            tracing::error!(target: "rib.diagnostic", %diagnostic)
        }
    }
}

/// Internal resource/bug errors that do propagate with `?` (spec §9: a
/// `throw`-based hierarchy maps onto explicit `Result` at validator
/// boundaries; this is that boundary's error type for non-diagnostic
/// failures).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("could not resolve input source {uri}: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Config(String),
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_has_expected_shape() {
        let d = Diagnostic::new(
            ErrorCode::WrongArity,
            Severity::Error,
            12,
            "scene.rib",
            "Format expects 3 arguments, got 2",
        );
        let text = d.to_string();
        assert!(text.contains("scene.rib:12"));
        assert!(text.contains("wrong-arity"));
        assert!(text.contains("error"));
    }

    #[test]
    fn collecting_reporter_tracks_severities() {
        let mut r = CollectingReporter::default();
        r.report(Diagnostic::new(
            ErrorCode::BadToken,
            Severity::Warning,
            1,
            "a.rib",
            "bad",
        ));
        assert!(r.has_severity(Severity::Warning));
        assert!(!r.has_severity(Severity::Severe));
    }

    #[test]
    #[should_panic]
    fn abort_reporter_panics_on_severe() {
        let mut r = AbortOnSevereReporter;
        r.report(Diagnostic::new(
            ErrorCode::Internal,
            Severity::Severe,
            0,
            "a.rib",
            "boom",
        ));
    }

    #[test]
    fn severity_orders_info_below_severe() {
        assert!(Severity::Info < Severity::Severe);
        assert!(Severity::Warning < Severity::Error);
    }
}
