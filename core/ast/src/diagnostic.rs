use std::fmt;

use crate::location::Location;

/// The closed set of error kinds a compilation phase can report about the *input
/// program*, as opposed to ordinary plumbing failures (see `AstError` in `errors.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticKind {
    SyntaxError,
    ParseError,
    LinkageError,
    TypeError,
    IllegalReassignmentError,
    ReferenceError,
    IntegrityError,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::SyntaxError => "SyntaxError",
            DiagnosticKind::ParseError => "ParseError",
            DiagnosticKind::LinkageError => "LinkageError",
            DiagnosticKind::TypeError => "TypeError",
            DiagnosticKind::IllegalReassignmentError => "IllegalReassignmentError",
            DiagnosticKind::ReferenceError => "ReferenceError",
            DiagnosticKind::IntegrityError => "IntegrityError",
        };
        write!(f, "{s}")
    }
}

/// A single user-facing fact about the input program, as opposed to an internal/plumbing
/// error. Diagnostics accumulate in a `DiagnosticSink` as phases run; they are never
/// unwound via `Result`/`?`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}: {} (at {loc})", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Accumulates diagnostics produced by a compilation phase.
///
/// The source models this as a process-wide singleton; this implementation has the
/// sink owned by the `Compilation` value and threaded through every phase explicitly
/// (see `theta-compiler`'s `Compilation` type).
#[derive(Debug, Default, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.push(Diagnostic::new(kind, message, location));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains all accumulated diagnostics, leaving the sink empty.
    ///
    /// Used both between pipeline phases (to decide whether to abort) and between REPL
    /// evaluations (`Compilation::clear_diagnostics`).
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    #[must_use]
    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }
}
