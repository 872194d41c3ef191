//! Diagnostics collected during a conversion.
//!
//! Recoverable problems never abort an import. Each one is recorded here with
//! the line it came from and mirrored to the `log` facade. The collector is
//! owned by the conversion and handed back to the caller with the result.

use std::fmt;

use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Informational only; does not make the result partial.
    Info,
    /// Something was skipped or could not be honoured.
    Warning,
}

/// What went wrong, for callers that want to match on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Fewer tokens than the directive requires.
    MissingArgument,
    /// A token could not be read as the expected number.
    InvalidNumber,
    /// A value parsed but lies outside its allowed domain.
    OutOfRange,
    /// Keyword is not in the directive table.
    UnknownDirective,
    /// Directive is recognised but not supported yet.
    Unsupported,
    /// A referenced texture file was not found.
    MissingTexture,
    /// Directive appeared where the current nesting does not allow it.
    Misplaced,
    /// Declared counts disagree with what was actually read.
    CountMismatch,
}

/// One recorded diagnostic.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 1-based line in the source file (0 when not tied to a line).
    pub line: usize,
    /// Directive keyword the diagnostic refers to, if any.
    pub directive: Option<String>,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.directive {
            Some(directive) => write!(f, "line {}: {}: {}", self.line, directive, self.message),
            None => write!(f, "line {}: {}", self.line, self.message),
        }
    }
}

/// Collector passed through an import.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn warn(
        &mut self,
        line: usize,
        directive: Option<&str>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            line,
            directive: directive.map(str::to_string),
            severity: Severity::Warning,
            kind,
            message: message.into(),
        };
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Record an informational note and log it.
    pub fn info(
        &mut self,
        line: usize,
        directive: Option<&str>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            line,
            directive: directive.map(str::to_string),
            severity: Severity::Info,
            kind,
            message: message.into(),
        };
        log::info!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// All diagnostics in the order they were recorded.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Only the warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Warnings of a particular kind.
    pub fn count_kind(&self, kind: &DiagnosticKind) -> usize {
        self.warnings().filter(|d| &d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_is_not_a_warning() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info(4, Some("POINT_COUNTS"), DiagnosticKind::CountMismatch, "3 != 4");
        assert!(!diagnostics.has_warnings());
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn test_warning_display_has_line_and_directive() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(
            12,
            Some("FOO_BAR"),
            DiagnosticKind::UnknownDirective,
            "directive is not recognised",
        );
        let text = diagnostics.entries()[0].to_string();
        assert_eq!(text, "line 12: FOO_BAR: directive is not recognised");
        assert_eq!(diagnostics.count_kind(&DiagnosticKind::UnknownDirective), 1);
    }
}
