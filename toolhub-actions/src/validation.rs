//! Argument validation against an action's declared schema.

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

/// Reasons arguments are rejected before an action runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Arguments were not a JSON object.
    #[error("arguments must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was supplied instead.
        found: &'static str,
    },

    /// The declared schema could not be compiled.
    #[error("action schema is invalid: {reason}")]
    InvalidSchema {
        /// Compiler error message.
        reason: String,
    },

    /// One or more arguments violated the schema.
    #[error("invalid arguments: {}", .violations.join("; "))]
    Violations {
        /// One message per violated constraint.
        violations: Vec<String>,
    },
}

/// Checks `args` against `schema` without coercing or defaulting anything.
///
/// # Errors
///
/// Returns [`ValidationError`] describing every violation found.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), ValidationError> {
    if !args.is_object() {
        return Err(ValidationError::NotAnObject {
            found: json_type_name(args),
        });
    }

    let compiled = JSONSchema::options()
        .compile(schema)
        .map_err(|err| ValidationError::InvalidSchema {
            reason: err.to_string(),
        })?;

    if let Err(errors) = compiled.validate(args) {
        let violations = errors
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{path}: {err}")
                }
            })
            .collect();
        return Err(ValidationError::Violations { violations });
    }

    Ok(())
}

/// Fills top-level properties missing from `args` with the schema's declared
/// `default`. Supplied values, including `null`, are left as they are, and
/// non-object arguments come back unchanged.
#[must_use]
pub fn apply_defaults(schema: &Value, args: Value) -> Value {
    let Value::Object(mut supplied) = args else {
        return args;
    };
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Value::Object(supplied);
    };
    for (name, field) in properties {
        if supplied.contains_key(name) {
            continue;
        }
        if let Some(default) = field.get("default") {
            supplied.insert(name.clone(), default.clone());
        }
    }
    Value::Object(supplied)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
