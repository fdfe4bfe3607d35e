//! Validated-patch helper: given a submitted JSON object and an allow-list of
//! field names, either accept the whole patch or reject the whole request.
//! There is deliberately no partial-apply path.

use serde_json::{Map, Value};

use crate::error::AppError;

/// Checks that every key in `body` is named in `allowed`.
///
/// An empty body is allowed; the patch simply changes nothing.
pub fn ensure_allowed(body: &Map<String, Value>, allowed: &[&str]) -> Result<(), AppError> {
    if body.keys().any(|key| !allowed.contains(&key.as_str())) {
        return Err(AppError::BadRequest("Invalid updates".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_allowed_fields_pass() {
        let body = body(json!({ "name": "Ada", "age": 36 }));
        assert!(ensure_allowed(&body, &["name", "email", "password", "age"]).is_ok());
    }

    #[test]
    fn test_single_disallowed_field_rejects_everything() {
        let body = body(json!({ "name": "Ada", "location": "London" }));
        let err = ensure_allowed(&body, &["name", "email", "password", "age"]).unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, "Invalid updates"),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let body = Map::new();
        assert!(ensure_allowed(&body, &["description", "completed"]).is_ok());
    }
}
