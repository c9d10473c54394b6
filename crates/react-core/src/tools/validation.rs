//! Argument validation against a tool's declared JSON schema.
//!
//! Covers the subset tools in this workspace declare: an object with typed
//! `properties` and a `required` list. Unknown properties are accepted.

use serde_json::Value;

use crate::tools::ToolError;

pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), ToolError> {
    let Some(object) = args.as_object() else {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".to_string(),
        ));
    };

    if let Some(required) = schema["required"].as_array() {
        for name in required.iter().filter_map(Value::as_str) {
            if object.get(name).map_or(true, Value::is_null) {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required parameter '{name}'"
                )));
            }
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            let Some(expected) = properties.get(name).and_then(|p| p["type"].as_str()) else {
                continue;
            };
            if !matches_type(expected, value) {
                return Err(ToolError::InvalidArguments(format!(
                    "parameter '{name}' must be of type {expected}"
                )));
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "file": { "type": "string" },
                "start_line": { "type": "integer" }
            },
            "required": ["file"]
        })
    }

    #[test]
    fn accepts_valid_arguments() {
        assert!(validate_arguments(&schema(), &json!({"file": "a.txt", "start_line": 3})).is_ok());
    }

    #[test]
    fn rejects_missing_required_parameter() {
        let error = validate_arguments(&schema(), &json!({"start_line": 3})).unwrap_err();
        assert_eq!(
            error,
            ToolError::InvalidArguments("missing required parameter 'file'".to_string())
        );
    }

    #[test]
    fn rejects_wrong_type() {
        let error = validate_arguments(&schema(), &json!({"file": "a", "start_line": 1.5})).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid arguments: parameter 'start_line' must be of type integer"
        );
    }

    #[test]
    fn negative_integers_are_integers() {
        assert!(validate_arguments(&schema(), &json!({"file": "a", "start_line": -2})).is_ok());
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let error =
            validate_arguments(&schema(), &json!({"file": "a", "start_line": u64::MAX})).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid arguments: parameter 'start_line' must be of type integer"
        );
    }

    #[test]
    fn rejects_non_object_arguments() {
        assert!(validate_arguments(&schema(), &json!(["a.txt"])).is_err());
    }
}
