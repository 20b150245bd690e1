//! Harness diagnostics
//!
//! The generated harness reports its own failures as single stderr lines
//! starting with [`MARKER`], followed by a kind and a message:
//!
//! ```text
//! __JUDGE_DIAG__ FunctionNotFound: Function 'solution' not found
//! ```
//!
//! Anything else on stderr is incidental noise from the submission.

/// Sentinel prefix of harness diagnostic lines
pub const MARKER: &str = "__JUDGE_DIAG__";

/// Fallback error text when a failed process left nothing on stderr
pub const GENERIC_RUNTIME_ERROR: &str = "Runtime error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    SyntaxError,
    FunctionNotFound,
    ArityMismatch,
    InputError,
    MemoryError,
    RuntimeError,
}

impl DiagnosticKind {
    fn parse(s: &str) -> Self {
        match s {
            "SyntaxError" => DiagnosticKind::SyntaxError,
            "FunctionNotFound" => DiagnosticKind::FunctionNotFound,
            "ArityMismatch" => DiagnosticKind::ArityMismatch,
            "InputError" => DiagnosticKind::InputError,
            "MemoryError" => DiagnosticKind::MemoryError,
            _ => DiagnosticKind::RuntimeError,
        }
    }

    /// Whether the failure lies in how the harness was set up rather than in
    /// the submitted code's behaviour
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::FunctionNotFound
                | DiagnosticKind::ArityMismatch
                | DiagnosticKind::InputError
        )
    }
}

/// A parsed harness diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Diagnostic text with the marker stripped, e.g. `SyntaxError: ...`
    pub message: String,
}

/// Extract the first harness diagnostic from stderr
pub fn parse_diagnostic(stderr: &str) -> Option<Diagnostic> {
    stderr.lines().find_map(|line| {
        let rest = line.trim().strip_prefix(MARKER)?.trim();
        let kind = rest
            .split_once(':')
            .map(|(kind, _)| kind.trim())
            .unwrap_or(rest);
        Some(Diagnostic {
            kind: DiagnosticKind::parse(kind),
            message: rest.to_string(),
        })
    })
}

/// Build the user-visible error text for a failed run.
///
/// Sentinel lines win over incidental stderr output; the markers themselves
/// are never part of the result.
pub fn error_message(stderr: &str) -> String {
    let sentinel_lines: Vec<&str> = stderr
        .lines()
        .filter_map(|line| line.trim().strip_prefix(MARKER))
        .map(str::trim)
        .collect();

    if !sentinel_lines.is_empty() {
        return sentinel_lines.join("\n");
    }

    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        GENERIC_RUNTIME_ERROR.to_string()
    } else {
        trimmed.replace(MARKER, "").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnostic() {
        let stderr = "warning: something\n__JUDGE_DIAG__ ArityMismatch: solution() cannot take 3 argument(s)\n";
        let diag = parse_diagnostic(stderr).unwrap();
        assert_eq!(diag.kind, DiagnosticKind::ArityMismatch);
        assert_eq!(
            diag.message,
            "ArityMismatch: solution() cannot take 3 argument(s)"
        );
        assert!(diag.kind.is_configuration());
    }

    #[test]
    fn test_parse_diagnostic_unknown_kind() {
        let diag = parse_diagnostic("__JUDGE_DIAG__ Weird: x").unwrap();
        assert_eq!(diag.kind, DiagnosticKind::RuntimeError);
        assert!(parse_diagnostic("Traceback (most recent call last):").is_none());
    }

    #[test]
    fn test_error_message_strips_marker() {
        let stderr = "noise\n__JUDGE_DIAG__ RuntimeError: ZeroDivisionError: division by zero\n";
        assert_eq!(
            error_message(stderr),
            "RuntimeError: ZeroDivisionError: division by zero"
        );
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(""), GENERIC_RUNTIME_ERROR);
        assert_eq!(error_message("  \n "), GENERIC_RUNTIME_ERROR);
        assert_eq!(
            error_message("  File \"x.py\", line 2\nSyntaxError: invalid syntax\n"),
            "File \"x.py\", line 2\nSyntaxError: invalid syntax"
        );
    }
}
