use crate::error::{ApiError, HttpError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const SUCCESS_CODE: i64 = 200;

/// Body shape returned by the admin backend: `{"code": 200, "msg": "OK", "data": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Decodes `data` when `code` is 200. A missing `code` is rejected under
    /// `fallback_code`, normally the HTTP status.
    pub fn into_data<T: DeserializeOwned>(self, fallback_code: i64) -> Result<T, HttpError> {
        if self.code != Some(SUCCESS_CODE) {
            let code = self.code.unwrap_or(fallback_code);
            let message = resolve_error_message(code, self.msg.as_deref());
            return Err(HttpError::Api(ApiError::new(code, message)));
        }

        Ok(serde_json::from_value(self.data)?)
    }
}

/// Error body sent alongside non-2xx statuses. Both fields are optional since
/// proxies and frameworks often answer with something else entirely.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
}

pub fn resolve_error_message(code: i64, message: Option<&str>) -> String {
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        return message.to_string();
    }

    match code {
        400 => "Invalid request parameters".to_string(),
        401 => "Login has expired".to_string(),
        403 => "Permission denied".to_string(),
        404 => "Resource or endpoint not found".to_string(),
        500 => "Internal server error".to_string(),
        _ => format!("[{}]: Unknown error", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Case {
        ajbh: String,
    }

    #[test]
    fn test_envelope_success_data() {
        let envelope: Envelope =
            serde_json::from_value(json!({"code": 200, "msg": "OK", "data": {"ajbh": "A001"}}))
                .unwrap();

        let case: Case = envelope.into_data(200).unwrap();
        assert_eq!(case.ajbh, "A001");
    }

    #[test]
    fn test_envelope_missing_data_is_null() {
        let envelope: Envelope = serde_json::from_str(r#"{"code": 200}"#).unwrap();
        let data: Option<Case> = envelope.into_data(200).unwrap();
        assert!(data.is_none());
    }

    #[test]
    fn test_envelope_failure_code() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 400, "msg": "case not found"}"#).unwrap();

        match envelope.into_data::<serde_json::Value>(200) {
            Err(HttpError::Api(api)) => {
                assert_eq!(api.code, 400);
                assert_eq!(api.message, "case not found");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_data_type_mismatch() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 200, "data": [1, 2]}"#).unwrap();
        let result = envelope.into_data::<Case>(200);
        assert!(matches!(result, Err(HttpError::Decode(_))));
    }

    #[test]
    fn test_envelope_missing_code_uses_fallback() {
        let envelope: Envelope = serde_json::from_str(r#"{"data": 1}"#).unwrap();
        assert!(envelope.code.is_none());

        match envelope.into_data::<u32>(200) {
            Err(HttpError::Api(api)) => {
                assert_eq!(api.code, 200);
                assert_eq!(api.message, "[200]: Unknown error");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_error_message_prefers_server_message() {
        assert_eq!(resolve_error_message(401, Some("token invalid")), "token invalid");
        assert_eq!(resolve_error_message(401, Some("")), "Login has expired");
    }

    #[test]
    fn test_resolve_error_message_defaults() {
        assert_eq!(resolve_error_message(400, None), "Invalid request parameters");
        assert_eq!(resolve_error_message(403, None), "Permission denied");
        assert_eq!(resolve_error_message(404, None), "Resource or endpoint not found");
        assert_eq!(resolve_error_message(500, None), "Internal server error");
        assert_eq!(resolve_error_message(418, None), "[418]: Unknown error");
    }

    #[test]
    fn test_error_body_partial() {
        let body: ErrorBody = serde_json::from_str(r#"{"msg": "boom"}"#).unwrap();
        assert!(body.code.is_none());
        assert_eq!(body.msg.as_deref(), Some("boom"));
    }
}
