//! Response envelope shared by every endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ ok: boolean, data?: T, errors?: [string] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: Option<bool>,
    pub data: Option<T>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiEnvelope<T> {
    /// The service explicitly reported failure
    pub fn is_failure(&self) -> bool {
        self.ok == Some(false)
    }

    /// Non-empty error messages carried by the envelope
    pub fn error_list(&self) -> Vec<String> {
        self.errors
            .as_ref()
            .map(|errors| errors.iter().filter(|e| !e.trim().is_empty()).cloned().collect())
            .unwrap_or_default()
    }
}

/// Film plan answers with either an envelope or the bare plan
#[derive(Debug, Clone, PartialEq)]
pub struct FilmPlanBody(Value);

impl FilmPlanBody {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Resolve the plan payload.
    ///
    /// `ok: false` yields the error list; otherwise `data` when present, else the whole body.
    /// A null body yields `Ok(None)`.
    pub fn into_plan(self) -> Result<Option<Value>, Vec<String>> {
        match self.0 {
            Value::Null => Ok(None),
            Value::Object(mut map) => {
                if map.get("ok") == Some(&Value::Bool(false)) {
                    let errors = map
                        .get("errors")
                        .and_then(Value::as_array)
                        .map(|list| {
                            list.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    return Err(errors);
                }
                match map.remove("data") {
                    Some(data) if !data.is_null() => Ok(Some(data)),
                    _ => Ok(Some(Value::Object(map))),
                }
            }
            other => Ok(Some(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_error_list_skips_blank_entries() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({"ok": false, "errors": ["frame missing", " "]})).unwrap();
        assert!(envelope.is_failure());
        assert_eq!(envelope.error_list(), vec!["frame missing".to_string()]);
    }

    #[test]
    fn test_envelope_without_errors() {
        let envelope: ApiEnvelope<Value> = serde_json::from_value(json!({"ok": true, "data": {"x": 1}})).unwrap();
        assert!(!envelope.is_failure());
        assert!(envelope.error_list().is_empty());
        assert_eq!(envelope.data, Some(json!({"x": 1})));
    }

    #[test]
    fn test_film_plan_envelope_data() {
        let body = FilmPlanBody::new(json!({"ok": true, "data": {"sequences": []}}));
        assert_eq!(body.into_plan(), Ok(Some(json!({"sequences": []}))));
    }

    #[test]
    fn test_film_plan_bare_payload() {
        let body = FilmPlanBody::new(json!({"sequences": [], "scene_length_sec": 10}));
        assert_eq!(
            body.into_plan(),
            Ok(Some(json!({"sequences": [], "scene_length_sec": 10})))
        );
    }

    #[test]
    fn test_film_plan_failure() {
        let body = FilmPlanBody::new(json!({"ok": false, "errors": ["bad aspect ratio"]}));
        assert_eq!(body.into_plan(), Err(vec!["bad aspect ratio".to_string()]));
    }
}
