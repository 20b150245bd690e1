//! Input module - Test case input decoding
//!
//! Turns the raw text of a test case input into the positional argument list
//! handed to the solution function. Two strategies:
//! - `normalize_input`: heuristic, for problems without a declared schema
//! - `decode_with_schema`: deterministic, one line per declared parameter
//!
//! Arguments are JSON values; the harness receives them as a JSON array on
//! stdin.

pub mod schema;

use serde_json::{Number, Value};

pub use schema::{decode_with_schema, InputError, ParamType, Parameter, ParameterSchema};

/// Infer call arguments from a raw input string.
///
/// 1. A JSON list is passed as the single first argument.
/// 2. A single line with one token is one coerced scalar; several
///    whitespace-separated tokens form one list argument.
/// 3. Several lines give one argument per line.
///
/// `"1 2"` (one list) and `"1\n2"` (two scalars) are deliberately different.
pub fn normalize_input(raw: &str) -> Vec<Value> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw.trim()) {
        return vec![Value::Array(items)];
    }

    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    match lines.as_slice() {
        [] => Vec::new(),
        [line] => {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() == 1 {
                vec![coerce_token(tokens[0])]
            } else {
                vec![Value::Array(tokens.into_iter().map(coerce_token).collect())]
            }
        }
        lines => lines.iter().map(|line| coerce_line(line)).collect(),
    }
}

/// Coerce a token to int, then float, then string
pub fn coerce_token(token: &str) -> Value {
    if let Some(n) = parse_integer(token) {
        return Value::Number(n);
    }
    if let Ok(f) = token.parse::<f64>() {
        // NaN and infinities have no JSON representation
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(token.to_string())
}

/// Parse an optionally signed run of ASCII digits as an exact integer of
/// any size.
pub(crate) fn parse_integer(token: &str) -> Option<Number> {
    if let Ok(i) = token.parse::<i64>() {
        return Some(Number::from(i));
    }

    let (negative, digits) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // JSON forbids leading zeros
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    let text = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    text.parse().ok()
}

/// Coerce one line of a multi-line input. JSON containers are decoded as
/// structures, everything else goes through [`coerce_token`].
fn coerce_line(line: &str) -> Value {
    if line.starts_with('[') || line.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(line) {
            return value;
        }
    }
    coerce_token(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_list_is_single_argument() {
        assert_eq!(normalize_input("[1, 2, 3]"), vec![json!([1, 2, 3])]);
        assert_eq!(normalize_input("  [[1], []]\n"), vec![json!([[1], []])]);
    }

    #[test]
    fn test_single_scalar() {
        assert_eq!(normalize_input("42"), vec![json!(42)]);
        assert_eq!(normalize_input("-7\n"), vec![json!(-7)]);
        assert_eq!(normalize_input("3.5"), vec![json!(3.5)]);
        assert_eq!(normalize_input("hello"), vec![json!("hello")]);
    }

    #[test]
    fn test_space_separated_line_is_one_list() {
        assert_eq!(normalize_input("1 2 3"), vec![json!([1, 2, 3])]);
        assert_eq!(normalize_input("1 2.5 x"), vec![json!([1, 2.5, "x"])]);
    }

    #[test]
    fn test_multiple_lines_are_positional() {
        assert_eq!(normalize_input("2\n3"), vec![json!(2), json!(3)]);
        assert_eq!(
            normalize_input("abc\n\n  4.0  \n"),
            vec![json!("abc"), json!(4.0)]
        );
    }

    #[test]
    fn test_multi_line_json_containers() {
        assert_eq!(
            normalize_input("[2, 7, 11, 15]\n9"),
            vec![json!([2, 7, 11, 15]), json!(9)]
        );
        assert_eq!(
            normalize_input("{\"a\": 1}\nkey"),
            vec![json!({"a": 1}), json!("key")]
        );
        // Not valid JSON: stays a string
        assert_eq!(normalize_input("[1, 2\nx"), vec![json!("[1, 2"), json!("x")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_input("").is_empty());
        assert!(normalize_input(" \n\n ").is_empty());
    }

    #[test]
    fn test_non_list_json_falls_through() {
        // A JSON object on a single line is not a list: coerced as text
        assert_eq!(normalize_input("{\"a\":1}"), vec![json!("{\"a\":1}")]);
        assert_eq!(normalize_input("\"quoted\""), vec![json!("\"quoted\"")]);
    }

    #[test]
    fn test_big_integers_keep_every_digit() {
        let big = coerce_token("100000000000000000001");
        assert!(big.is_number());
        assert_eq!(big.to_string(), "100000000000000000001");
        assert_eq!(coerce_token("-000123456789012345678901").to_string(), "-123456789012345678901");
        assert_eq!(coerce_token("+18446744073709551616").to_string(), "18446744073709551616");

        // Serialized for the harness exactly as written
        let args = normalize_input("[100000000000000000001, 2]");
        assert_eq!(
            serde_json::to_string(&args).unwrap(),
            "[[100000000000000000001,2]]"
        );
    }

    #[test]
    fn test_parse_integer_rejects_non_integers() {
        assert_eq!(parse_integer("+5"), Some(Number::from(5)));
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer("1.0"), None);
        assert_eq!(parse_integer("12a"), None);
        assert_eq!(parse_integer("1e30"), None);
    }

    #[test]
    fn test_non_finite_floats_stay_strings() {
        assert_eq!(coerce_token("nan"), json!("nan"));
        assert_eq!(coerce_token("inf"), json!("inf"));
        assert_eq!(coerce_token("1e3"), json!(1000.0));
    }
}
