//! Harness module - Driver generation for submitted solutions
//!
//! Wraps user code in a Python driver (`files/harness.py`) that:
//! - reads the argument list as a JSON array from stdin, then hands the
//!   submission an empty stdin
//! - compiles the submission into its own namespace
//! - resolves exactly one named callable (`_resolve`), nothing is scanned
//! - checks arity against the argument list
//! - prints the serialized return value
//!
//! Failures are reported as sentinel-prefixed stderr lines, see
//! [`crate::core::diagnostics`].
//!
//! The harness module does NOT:
//! - Decode test case text (that is [`crate::input`])
//! - Run anything

use crate::core::diagnostics::MARKER;

/// Python driver template
const TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/harness.py"));

pub const DEFAULT_FUNCTION_NAME: &str = "solution";

/// Generates harness programs for one target function
#[derive(Debug, Clone)]
pub struct HarnessGenerator {
    function_name: String,
}

impl HarnessGenerator {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Produce the driver source for `source_code`.
    ///
    /// The submission and the function name are embedded as string literals,
    /// so no character of the submission can break out of the template.
    pub fn generate(&self, source_code: &str) -> String {
        TEMPLATE
            .replace("{{MARKER}}", &py_str_literal(MARKER))
            .replace("{{FUNCTION_NAME}}", &py_str_literal(&self.function_name))
            .replace("{{SOURCE}}", &py_str_literal(source_code))
    }
}

impl Default for HarnessGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FUNCTION_NAME)
    }
}

/// Whether `name` is usable as a Python function name
pub fn is_valid_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Encode `s` as a Python string literal.
///
/// JSON string syntax is a subset of Python's (`\uXXXX`, `\n`, `\"`, `\\`).
fn py_str_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_embeds_source_as_literal() {
        let source = "def solution(a, b):\n    return a + b  # \"quoted\" \\ \n";
        let harness = HarnessGenerator::default().generate(source);

        assert!(harness.contains(&py_str_literal(source)));
        assert!(harness.contains("_FUNCTION_NAME = \"solution\""));
        assert!(harness.contains(&format!("_MARKER = \"{}\"", MARKER)));
        assert!(!harness.contains("{{"));
    }

    #[test]
    fn test_generate_custom_function_name() {
        let harness = HarnessGenerator::new("twoSum").generate("def twoSum(): pass");
        assert!(harness.contains("_FUNCTION_NAME = \"twoSum\""));
    }

    #[test]
    fn test_template_placeholders_in_source_are_inert() {
        // Placeholders are substituted before the submission is inserted
        let harness = HarnessGenerator::default().generate("x = '{{SOURCE}} {{MARKER}}'");
        assert!(harness.contains("{{SOURCE}} {{MARKER}}"));
        assert_eq!(harness.matches("_SOURCE = ").count(), 1);
    }

    #[test]
    fn test_harness_reports_every_diagnostic_kind() {
        let harness = HarnessGenerator::default().generate("");
        for kind in [
            "SyntaxError",
            "FunctionNotFound",
            "ArityMismatch",
            "InputError",
            "MemoryError",
            "RuntimeError",
        ] {
            assert!(harness.contains(&format!("\"{}\"", kind)), "missing {}", kind);
        }
    }

    #[test]
    fn test_is_valid_function_name() {
        assert!(is_valid_function_name("solution"));
        assert!(is_valid_function_name("_helper2"));
        assert!(is_valid_function_name("twoSum"));
        assert!(!is_valid_function_name(""));
        assert!(!is_valid_function_name("2fast"));
        assert!(!is_valid_function_name("os.system"));
        assert!(!is_valid_function_name("a b"));
    }
}
