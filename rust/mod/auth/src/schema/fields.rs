use serde_json::{Map, Value};

use tollgate_core::{FieldErrors, NON_FIELD_ERRORS};

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const NOT_A_STRING: &str = "Not a valid string.";

/// Borrow the payload as a JSON object, or fail with a non-field error.
pub(crate) fn object(payload: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    payload.as_object().ok_or_else(|| {
        FieldErrors::single(NON_FIELD_ERRORS, "Invalid data. Expected an object.")
    })
}

/// A string field that must be present and non-empty.
pub(crate) fn required_str(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

/// A string field that may be absent or null.
pub(crate) fn optional_str(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

/// Record an error when `value` is longer than `max` characters.
pub(crate) fn max_length(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let payload = json!({"a": "x", "b": "", "c": 3, "d": null});
        let obj = object(&payload).unwrap();
        let mut errors = FieldErrors::new();

        assert_eq!(required_str(obj, "a", &mut errors), Some("x".into()));
        assert_eq!(required_str(obj, "b", &mut errors), None);
        assert_eq!(required_str(obj, "c", &mut errors), None);
        assert_eq!(required_str(obj, "d", &mut errors), None);
        assert_eq!(required_str(obj, "e", &mut errors), None);

        assert_eq!(errors.get("b"), [REQUIRED]);
        assert_eq!(errors.get("c"), [NOT_A_STRING]);
        assert_eq!(errors.get("d"), [REQUIRED]);
        assert_eq!(errors.get("e"), [REQUIRED]);
    }

    #[test]
    fn test_optional_str() {
        let payload = json!({"a": "", "b": false});
        let obj = object(&payload).unwrap();
        let mut errors = FieldErrors::new();

        assert_eq!(optional_str(obj, "a", &mut errors), Some(String::new()));
        assert_eq!(optional_str(obj, "b", &mut errors), None);
        assert_eq!(optional_str(obj, "missing", &mut errors), None);
        assert!(errors.contains("b"));
        assert!(!errors.contains("missing"));
    }

    #[test]
    fn test_non_object_payload() {
        let err = object(&json!(["x"])).unwrap_err();
        assert!(err.contains(NON_FIELD_ERRORS));
    }

    #[test]
    fn test_max_length_counts_chars() {
        let mut errors = FieldErrors::new();
        max_length("name", "ééé", 3, &mut errors);
        assert!(errors.is_empty());
        max_length("name", "éééé", 3, &mut errors);
        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 3 characters (it has 4)."]
        );
    }
}
