use base64::{engine::general_purpose, Engine as _};
use serde_json::Value as JsonValue;

use crate::{
    transport::RawResponse,
    wire::{Envelope, WireResult},
    CompletedResponse, ExecResult, QueryResult, RqliteError, StatementOutcome, Value,
};

/// Promotes any non-success status to [`RqliteError::Http`].
pub(crate) fn check_status(raw: RawResponse) -> Result<RawResponse, RqliteError> {
    if (200..300).contains(&raw.status) {
        Ok(raw)
    } else {
        Err(RqliteError::Http {
            status: raw.status,
            body: raw.body,
        })
    }
}

/// Decodes an execute or query response.
///
/// The HTTP status is checked before the body is parsed. Statement errors
/// are kept per outcome and never abort decoding of sibling results.
pub(crate) fn decode_response(raw: RawResponse) -> Result<CompletedResponse, RqliteError> {
    let raw = check_status(raw)?;
    let envelope = serde_json::from_str::<Envelope>(&raw.body).map_err(|err| {
        RqliteError::Decode(format!("invalid response JSON: {err}; body: {}", raw.body))
    })?;

    let results = envelope
        .results
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, result)| decode_outcome(result, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompletedResponse {
        status_code: raw.status,
        time: envelope.time,
        results,
    })
}

pub(crate) fn decode_outcome(
    result: WireResult,
    index: usize,
) -> Result<StatementOutcome, RqliteError> {
    if let Some(message) = result.error {
        return Ok(StatementOutcome::SqlError { index, message });
    }

    let Some(columns) = result.columns else {
        return Ok(StatementOutcome::Exec(ExecResult {
            last_insert_id: result.last_insert_id,
            rows_affected: result.rows_affected.unwrap_or_default(),
            time: result.time,
        }));
    };

    let types = result.types.unwrap_or_default();
    let values = result
        .values
        .unwrap_or_default()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(col, value)| decode_value(value, types.get(col).map(String::as_str)))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| match err {
            RqliteError::Decode(message) => {
                RqliteError::Decode(format!("{message} in result {index}"))
            }
            other => other,
        })?;

    Ok(StatementOutcome::Query(QueryResult {
        columns,
        types,
        values,
        time: result.time,
    }))
}

pub(crate) fn decode_value(value: JsonValue, decltype: Option<&str>) -> Result<Value, RqliteError> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(value) => Ok(Value::Bool(value)),
        JsonValue::Number(number) => number
            .as_i64()
            .map(Value::Integer)
            .or_else(|| number.as_f64().map(Value::Float))
            .ok_or_else(|| RqliteError::Decode(format!("unsupported number '{number}'"))),
        JsonValue::String(text) => {
            if decltype.is_some_and(|name| name.eq_ignore_ascii_case("blob")) {
                if let Ok(bytes) = general_purpose::STANDARD.decode(&text) {
                    return Ok(Value::Blob(bytes));
                }
            }
            Ok(Value::Text(text))
        }
        other => Err(RqliteError::Decode(format!(
            "unsupported row value '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{decode, transport::RawResponse, RqliteError, StatementOutcome, Value};

    fn raw(status: u16, body: serde_json::Value) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn missing_results_is_empty_list() {
        let decoded = decode::decode_response(raw(200, json!({}))).expect("must decode");
        assert!(decoded.results.is_empty());
        assert_eq!(decoded.time, None);
        assert_eq!(decoded.status_code, 200);
    }

    #[test]
    fn zero_time_is_preserved() {
        let decoded =
            decode::decode_response(raw(200, json!({"results": [], "time": 0.0})))
                .expect("must decode");
        assert_eq!(decoded.time, Some(0.0));
    }

    #[test]
    fn statement_error_does_not_abort_siblings() {
        let body = json!({
            "results": [
                {"last_insert_id": 1, "rows_affected": 1},
                {"error": "UNIQUE constraint failed: users.email"},
                {"columns": ["id"], "types": ["integer"], "values": [[1]]}
            ],
            "time": 0.0012
        });
        let decoded = decode::decode_response(raw(200, body)).expect("must decode");

        assert_eq!(decoded.results.len(), 3);
        assert!(matches!(decoded.results[0], StatementOutcome::Exec(_)));
        assert!(matches!(
            decoded.results[1],
            StatementOutcome::SqlError { index: 1, .. }
        ));
        let query = decoded.results[2].as_query().expect("must be rows");
        assert_eq!(query.values, vec![vec![Value::Integer(1)]]);
    }

    #[test]
    fn http_error_short_circuits_before_parsing() {
        let err = decode::decode_response(RawResponse {
            status: 500,
            body: "{\"error\":\"leader not found\"}".to_owned(),
        })
        .expect_err("must fail");

        match err {
            RqliteError::Http { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("leader not found"));
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = decode::decode_response(RawResponse {
            status: 200,
            body: "not json".to_owned(),
        })
        .expect_err("must fail");
        assert!(matches!(err, RqliteError::Decode(_)));
    }

    #[test]
    fn query_without_values_has_no_rows() {
        let body = json!({"results": [{"columns": ["id", "name"], "types": ["integer", "text"]}]});
        let decoded = decode::decode_response(raw(200, body)).expect("must decode");
        let query = decoded.results[0].as_query().expect("must be rows");
        assert_eq!(query.columns, vec!["id".to_owned(), "name".to_owned()]);
        assert!(query.values.is_empty());
    }

    #[test]
    fn row_values_follow_column_types() {
        let body = json!({
            "results": [{
                "columns": ["n", "f", "t", "b", "x"],
                "types": ["integer", "real", "text", "blob", ""],
                "values": [[3, 1.5, "hi", "3q2+7w==", null]]
            }]
        });
        let decoded = decode::decode_response(raw(200, body)).expect("must decode");
        let query = decoded.results[0].as_query().expect("must be rows");
        assert_eq!(
            query.values[0],
            vec![
                Value::Integer(3),
                Value::Float(1.5),
                Value::Text("hi".to_owned()),
                Value::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]),
                Value::Null,
            ]
        );
    }

    #[test]
    fn nested_row_value_is_decode_error() {
        let body = json!({"results": [{"columns": ["x"], "types": [""], "values": [[[1, 2]]]}]});
        let err = decode::decode_response(raw(200, body)).expect_err("must fail");
        assert!(matches!(err, RqliteError::Decode(_)));
    }

    #[test]
    fn empty_result_object_is_exec_without_rows() {
        let decoded =
            decode::decode_response(raw(200, json!({"results": [{}]}))).expect("must decode");
        let exec = decoded.results[0].as_exec().expect("must be exec");
        assert_eq!(exec.rows_affected, 0);
        assert_eq!(exec.last_insert_id, None);
    }
}
