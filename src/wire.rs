use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Number, Value as JsonValue};

use crate::{Params, RqliteError, Statement, Value};

/// Encodes statements into the request body array.
///
/// Each statement becomes `[sql, p1, p2, ...]` for positional parameters or
/// `[sql, {"name": value}]` for named ones.
pub(crate) fn encode_statements(statements: &[Statement]) -> Result<JsonValue, RqliteError> {
    statements
        .iter()
        .map(encode_statement)
        .collect::<Result<Vec<_>, _>>()
        .map(JsonValue::Array)
}

pub(crate) fn encode_statement(statement: &Statement) -> Result<JsonValue, RqliteError> {
    if statement.sql.trim().is_empty() {
        return Err(RqliteError::Usage("SQL text cannot be empty".to_owned()));
    }

    let mut parts = vec![JsonValue::String(statement.sql.clone())];
    match &statement.params {
        Params::Positional(values) => {
            for value in values {
                parts.push(encode_value(value)?);
            }
        }
        Params::Named(values) => {
            if !values.is_empty() {
                let mut object = Map::with_capacity(values.len());
                for (name, value) in values {
                    object.insert(normalize_named_parameter_name(name)?, encode_value(value)?);
                }
                parts.push(JsonValue::Object(object));
            }
        }
    }
    Ok(JsonValue::Array(parts))
}

fn encode_value(value: &Value) -> Result<JsonValue, RqliteError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(value) => Ok(JsonValue::Bool(*value)),
        Value::Integer(value) => Ok(JsonValue::from(*value)),
        Value::Float(value) => Number::from_f64(*value).map(JsonValue::Number).ok_or_else(|| {
            RqliteError::Usage(format!("non-finite float value '{value}' is unsupported"))
        }),
        Value::Text(value) => Ok(JsonValue::String(value.clone())),
        Value::Blob(bytes) => Ok(JsonValue::String(general_purpose::STANDARD.encode(bytes))),
    }
}

fn normalize_named_parameter_name(name: &str) -> Result<String, RqliteError> {
    let normalized = name.trim_start_matches([':', '@', '$']);
    if normalized.is_empty() {
        return Err(RqliteError::Usage(
            "named parameter name cannot be empty".to_owned(),
        ));
    }
    Ok(normalized.to_owned())
}

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub results: Option<Vec<WireResult>>,
    #[serde(default)]
    pub time: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireResult {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<Vec<JsonValue>>>,
    #[serde(default)]
    pub last_insert_id: Option<i64>,
    #[serde(default)]
    pub rows_affected: Option<u64>,
    #[serde(default)]
    pub time: Option<f64>,
}
