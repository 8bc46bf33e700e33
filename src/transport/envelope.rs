use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::domain::ApiStatus;

/// Reasons a reply body cannot be turned into a payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{status}: {message}")]
    Rejected {
        status: ApiStatus,
        code: Option<String>,
        message: String,
    },
}

#[derive(Debug)]
pub enum Classified {
    /// The reply had no body at all.
    Empty,
    Success(SuccessEnvelope),
}

/// An envelope whose `status` was confirmed to be `success`.
///
/// This is the only way to reach the envelope's `data`.
#[derive(Debug)]
pub struct SuccessEnvelope {
    time: Option<f64>,
    flags: Map<String, Value>,
    data: Option<Box<RawValue>>,
}

impl SuccessEnvelope {
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    pub fn flags(&self) -> &Map<String, Value> {
        &self.flags
    }

    /// Decode `data` into the caller's target. A missing `data` decodes as JSON `null`.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let raw = self.data.as_deref().map_or("null", RawValue::get);
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Deserialize)]
struct JsonEnvelope {
    status: String,
    #[serde(default)]
    time: Option<f64>,
    #[serde(default)]
    flags: Option<Map<String, Value>>,
    #[serde(default)]
    data: Option<Box<RawValue>>,
}

/// Decide whether a reply body is usable, independently of the HTTP status code.
pub fn classify(body: &[u8]) -> Result<Classified, ClassifyError> {
    if body.is_empty() {
        return Ok(Classified::Empty);
    }

    let envelope: JsonEnvelope =
        serde_json::from_slice(body).map_err(|err| ClassifyError::Malformed(err.to_string()))?;

    let status = ApiStatus::from_wire(&envelope.status);
    if !status.is_success() {
        let (code, message) = error_details(envelope.data.as_deref())?;
        return Err(ClassifyError::Rejected {
            status,
            code,
            message,
        });
    }

    Ok(Classified::Success(SuccessEnvelope {
        time: envelope.time,
        flags: envelope.flags.unwrap_or_default(),
        data: envelope.data,
    }))
}

/// Pull `code` and `message` out of an error envelope's `data`.
///
/// `data` must be an object carrying a non-null `message`.
fn error_details(data: Option<&RawValue>) -> Result<(Option<String>, String), ClassifyError> {
    let value = match data {
        Some(raw) => serde_json::from_str::<Value>(raw.get())
            .map_err(|err| ClassifyError::Malformed(err.to_string()))?,
        None => Value::Null,
    };

    let Value::Object(map) = value else {
        return Err(ClassifyError::Malformed(format!(
            "error response data is {}, expected an object",
            json_kind(&value)
        )));
    };

    let message = match map.get("message") {
        Some(Value::String(text)) => text.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => {
            return Err(ClassifyError::Malformed(
                "error response data has no message".to_owned(),
            ));
        }
    };
    let code = map.get("code").and_then(Value::as_str).map(str::to_owned);

    Ok((code, message))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_success(body: &str) -> SuccessEnvelope {
        match classify(body.as_bytes()) {
            Ok(Classified::Success(envelope)) => envelope,
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn empty_body_is_success_without_payload() {
        assert!(matches!(classify(b""), Ok(Classified::Empty)));
    }

    #[test]
    fn success_envelope_exposes_time_flags_and_data() {
        let envelope = expect_success(
            r#"{"status":"success","time":0.05,"flags":{"beta":true},"data":{"n":1}}"#,
        );
        assert_eq!(envelope.time(), Some(0.05));
        assert_eq!(envelope.flags().get("beta"), Some(&Value::Bool(true)));

        let data: Value = envelope.decode_data().unwrap();
        assert_eq!(data, serde_json::json!({ "n": 1 }));
    }

    #[test]
    fn success_without_data_decodes_as_null() {
        let envelope = expect_success(r#"{"status":"success"}"#);
        assert!(envelope.flags().is_empty());
        let data: Option<Value> = envelope.decode_data().unwrap();
        assert_eq!(data, None);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = classify(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed(_)));
    }

    #[test]
    fn envelope_without_status_is_malformed() {
        let err = classify(br#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed(_)));
    }

    #[test]
    fn error_status_is_rejected_with_code_and_message() {
        let err = classify(
            br#"{"status":"parameter-error","time":0.01,"flags":{},"data":{"code":"ValidationError","message":"To is required"}}"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ClassifyError::Rejected {
                status: ApiStatus::ParameterError,
                code: Some("ValidationError".to_owned()),
                message: "To is required".to_owned(),
            }
        );
    }

    #[test]
    fn unknown_status_is_not_success() {
        let err = classify(br#"{"status":"pending","data":{"message":"later"}}"#).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Rejected {
                status: ApiStatus::Other(_),
                ..
            }
        ));
    }

    #[test]
    fn non_string_message_is_rendered_as_json() {
        let err = classify(br#"{"status":"error","data":{"message":["a","b"]}}"#).unwrap_err();
        match err {
            ClassifyError::Rejected { message, code, .. } => {
                assert_eq!(message, r#"["a","b"]"#);
                assert_eq!(code, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_with_string_data_is_malformed_not_a_panic() {
        let err = classify(br#"{"status":"error","data":"something broke"}"#).unwrap_err();
        match err {
            ClassifyError::Malformed(reason) => assert!(reason.contains("a string")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_without_message_is_malformed() {
        let err = classify(br#"{"status":"error","data":{"code":"Oops"}}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed(_)));

        let err = classify(br#"{"status":"error"}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed(_)));
    }
}
