//! Checker module - Output comparison
//!
//! Decides whether a program's output is equivalent to the expected answer.
//! Comparison is type-aware: the same value may be printed in several ways
//! (`1` vs `1.0`, `True` vs `true`, `[1,2]` vs `[1, 2]`) and all of them are
//! accepted.
//!
//! Whole-output rules, first match wins:
//! 1. Exact match after trimming
//! 2. Same number of non-blank lines: every line pair matches
//! 3. Different number of lines: the final lines match
//! 4. The whole trimmed strings match as single values
//!
//! The checker module does NOT:
//! - Run anything or look at exit statuses
//! - Produce user-facing messages

use serde_json::{Number, Value};
use std::fmt;

use crate::input::parse_integer;

/// Absolute tolerance for numeric comparison
const FLOAT_TOLERANCE: f64 = 1e-9;

/// The rule that accepted an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    /// Every line matched its counterpart
    LineByLine,
    /// Only the final lines were compared
    FinalLine,
    Json,
    Numeric,
    Boolean,
    BracketStripped,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchRule::Exact => "exact",
            MatchRule::LineByLine => "line_by_line",
            MatchRule::FinalLine => "final_line",
            MatchRule::Json => "json",
            MatchRule::Numeric => "numeric",
            MatchRule::Boolean => "boolean",
            MatchRule::BracketStripped => "bracket_stripped",
        };
        write!(f, "{}", s)
    }
}

/// Check whether `actual` is an acceptable answer for `expected`
pub fn validate_output(actual: &str, expected: &str) -> bool {
    check_output(actual, expected).is_some()
}

/// Like [`validate_output`], but report which rule matched
pub fn check_output(actual: &str, expected: &str) -> Option<MatchRule> {
    let actual = actual.trim();
    let expected = expected.trim();

    if actual == expected {
        return Some(MatchRule::Exact);
    }

    let actual_lines = non_blank_lines(actual);
    let expected_lines = non_blank_lines(expected);

    if actual_lines.len() == expected_lines.len() {
        // A single line on both sides is the whole-string comparison below
        if actual_lines.len() > 1
            && actual_lines
                .iter()
                .zip(&expected_lines)
                .all(|(a, e)| match_single_value(a, e).is_some())
        {
            return Some(MatchRule::LineByLine);
        }
    } else if let (Some(a), Some(e)) = (actual_lines.last(), expected_lines.last()) {
        // Programs that print progress before the answer
        if match_single_value(a, e).is_some() {
            return Some(MatchRule::FinalLine);
        }
    }

    match_single_value(actual, expected)
}

/// Compare two single values, first matching rule wins
pub fn match_single_value(actual: &str, expected: &str) -> Option<MatchRule> {
    let actual = actual.trim();
    let expected = expected.trim();

    if actual == expected {
        return Some(MatchRule::Exact);
    }

    if let (Ok(a), Ok(e)) = (
        serde_json::from_str::<Value>(actual),
        serde_json::from_str::<Value>(expected),
    ) {
        if json_equal(&a, &e) {
            return Some(MatchRule::Json);
        }
    }

    if let (Ok(a), Ok(e)) = (actual.parse::<f64>(), expected.parse::<f64>()) {
        if (a - e).abs() < FLOAT_TOLERANCE {
            return Some(MatchRule::Numeric);
        }
    }

    if let (Some(a), Some(e)) = (parse_bool(actual), parse_bool(expected)) {
        if a == e {
            return Some(MatchRule::Boolean);
        }
    }

    if (has_bracket(actual) || has_bracket(expected))
        && strip_brackets(actual) == strip_brackets(expected)
    {
        return Some(MatchRule::BracketStripped);
    }

    None
}

fn non_blank_lines(s: &str) -> Vec<&str> {
    s.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Structural equality where numbers compare by value and booleans equal
/// 1 and 0
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Bool(flag), Value::Number(n)) | (Value::Number(n), Value::Bool(flag)) => {
            n.as_f64() == Some(if *flag { 1.0 } else { 0.0 })
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Integers compare exactly at any size, anything else as floats
fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (parse_integer(&x.to_string()), parse_integer(&y.to_string())) {
        (Some(x), Some(y)) => x == y,
        _ => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

fn has_bracket(s: &str) -> bool {
    s.contains(['[', ']', '(', ')'])
}

fn strip_brackets(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')') && !c.is_whitespace())
        .collect()
}
