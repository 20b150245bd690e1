//! Explicit parameter schemas
//!
//! A problem that declares its parameters gets deterministic decoding: one
//! non-empty input line per parameter, each decoded by its declared type.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use super::{coerce_token, parse_integer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Int,
    Float,
    #[serde(alias = "string")]
    Str,
    Bool,
    List,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered parameter declarations of a solution function
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    pub params: Vec<Parameter>,
}

impl ParameterSchema {
    pub fn new(params: Vec<Parameter>) -> Self {
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("expected {expected} input line(s), found {found}")]
    LineCount { expected: usize, found: usize },

    #[error("cannot decode `{value}` as {ty:?} for parameter `{name}`")]
    Value {
        name: String,
        ty: ParamType,
        value: String,
    },
}

/// Decode a raw input according to a declared schema.
///
/// A single line holding a JSON array with exactly one element per parameter
/// is accepted as well, so `[[1, 2], 3]` works for `(list, int)`.
pub fn decode_with_schema(raw: &str, schema: &ParameterSchema) -> Result<Vec<Value>, InputError> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if schema.len() != 1 && lines.len() == 1 {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(lines[0]) {
            if items.len() == schema.len() {
                return schema
                    .params
                    .iter()
                    .zip(items)
                    .map(|(param, value)| check_value(param, value))
                    .collect();
            }
        }
    }

    if lines.len() != schema.len() {
        return Err(InputError::LineCount {
            expected: schema.len(),
            found: lines.len(),
        });
    }

    schema
        .params
        .iter()
        .zip(lines)
        .map(|(param, line)| decode_text(param, line))
        .collect()
}

fn decode_text(param: &Parameter, text: &str) -> Result<Value, InputError> {
    let invalid = || InputError::Value {
        name: param.name.clone(),
        ty: param.ty,
        value: text.to_string(),
    };

    match param.ty {
        ParamType::Int => parse_integer(text).map(Value::Number).ok_or_else(invalid),
        ParamType::Float => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        ParamType::Str => match serde_json::from_str::<Value>(text) {
            Ok(Value::String(s)) => Ok(Value::String(s)),
            _ => Ok(Value::String(text.to_string())),
        },
        ParamType::Bool => match text {
            "true" | "True" | "1" => Ok(Value::Bool(true)),
            "false" | "False" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        ParamType::List => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => Ok(Value::Array(items)),
            Ok(_) | Err(_) if text.starts_with('[') => Err(invalid()),
            _ => Ok(Value::Array(
                text.split_whitespace().map(coerce_token).collect(),
            )),
        },
        ParamType::Json => serde_json::from_str(text).map_err(|_| invalid()),
    }
}

fn check_value(param: &Parameter, value: Value) -> Result<Value, InputError> {
    let ok = match param.ty {
        ParamType::Int => value
            .as_number()
            .is_some_and(|n| parse_integer(&n.to_string()).is_some()),
        ParamType::Float => value.is_number(),
        ParamType::Str => value.is_string(),
        ParamType::Bool => value.is_boolean(),
        ParamType::List => value.is_array(),
        ParamType::Json => true,
    };

    if ok {
        Ok(value)
    } else {
        Err(InputError::Value {
            name: param.name.clone(),
            ty: param.ty,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(params: &[(&str, ParamType)]) -> ParameterSchema {
        ParameterSchema::new(
            params
                .iter()
                .map(|(name, ty)| Parameter::new(*name, *ty))
                .collect(),
        )
    }

    #[test]
    fn test_distinguishes_list_from_scalars() {
        let one_list = schema(&[("nums", ParamType::List)]);
        let two_ints = schema(&[("a", ParamType::Int), ("b", ParamType::Int)]);

        assert_eq!(
            decode_with_schema("1 2", &one_list).unwrap(),
            vec![json!([1, 2])]
        );
        assert_eq!(
            decode_with_schema("1\n2", &two_ints).unwrap(),
            vec![json!(1), json!(2)]
        );
        assert_eq!(
            decode_with_schema("[1, 2]", &two_ints).unwrap(),
            vec![json!(1), json!(2)]
        );
    }

    #[test]
    fn test_typed_lines() {
        let s = schema(&[
            ("nums", ParamType::List),
            ("target", ParamType::Float),
            ("name", ParamType::Str),
            ("flag", ParamType::Bool),
            ("extra", ParamType::Json),
        ]);
        let args = decode_with_schema("[2,7,11]\n9\n\"bob\"\nTrue\n{\"k\": null}", &s).unwrap();
        assert_eq!(
            args,
            vec![
                json!([2, 7, 11]),
                json!(9.0),
                json!("bob"),
                json!(true),
                json!({"k": null})
            ]
        );
    }

    #[test]
    fn test_big_int_parameters() {
        let s = schema(&[("n", ParamType::Int), ("xs", ParamType::List)]);
        let args = decode_with_schema("123456789012345678901234\n[99999999999999999999]", &s).unwrap();
        assert_eq!(
            serde_json::to_string(&args).unwrap(),
            "[123456789012345678901234,[99999999999999999999]]"
        );

        let s = schema(&[("a", ParamType::Int), ("b", ParamType::Int)]);
        let args = decode_with_schema("[18446744073709551616, -5]", &s).unwrap();
        assert_eq!(args[0].to_string(), "18446744073709551616");
        assert!(decode_with_schema("[1.5, 2]", &s).is_err());
    }

    #[test]
    fn test_line_count_mismatch() {
        let s = schema(&[("a", ParamType::Int), ("b", ParamType::Int)]);
        assert_eq!(
            decode_with_schema("1\n2\n3", &s),
            Err(InputError::LineCount {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_value_mismatch() {
        let s = schema(&[("a", ParamType::Int)]);
        let err = decode_with_schema("abc", &s).unwrap_err();
        assert!(matches!(err, InputError::Value { ref name, .. } if name == "a"));

        let s = schema(&[("a", ParamType::Str), ("b", ParamType::Bool)]);
        assert!(decode_with_schema("[\"x\", 3]", &s).is_err());

        let s = schema(&[("xs", ParamType::List)]);
        assert!(decode_with_schema("[1, 2", &s).is_err());
    }

    #[test]
    fn test_schema_deserializes_from_job_json() {
        let s: ParameterSchema =
            serde_json::from_str(r#"[{"name": "a", "type": "int"}, {"name": "s", "type": "string"}]"#)
                .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.params[1].ty, ParamType::Str);
    }

    #[test]
    fn test_empty_schema() {
        assert_eq!(
            decode_with_schema("", &ParameterSchema::default()).unwrap(),
            Vec::<Value>::new()
        );
    }
}
