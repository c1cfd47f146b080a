//! Parameter extraction from declared JSON Schemas.
//!
//! The extractor never fails: constructs it does not understand degrade to an
//! [`ParameterType::Any`] record marked as required, so a provider with an
//! exotic schema still lands in the catalog.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Normalised parameter type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// UTF-8 string.
    String,
    /// Integer or floating point number.
    Number,
    /// Boolean flag.
    Boolean,
    /// Closed set of values, see [`ActionParameter::enum_values`].
    Enum,
    /// Nested object.
    Object,
    /// List of values.
    Array,
    /// Unrecognised construct.
    Any,
}

impl ParameterType {
    /// Returns the lower-case type tag used in rendered parameter strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Array => "array",
            Self::Any => "any",
        }
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised description of a single action argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameter {
    /// Argument name.
    pub name: String,
    /// Normalised type.
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Whether callers must supply the argument.
    pub required: bool,
    /// Declared default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values for closed-value parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Declared description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionParameter {
    /// Generic record used when a field's schema cannot be interpreted.
    #[must_use]
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Any,
            required: true,
            default: None,
            enum_values: None,
            description: None,
        }
    }

    /// Renders the parameter as `name: type[ (optional)][ (default: X)][ (v1|v2)]`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut rendered = format!("{}: {}", self.name, self.param_type);
        if !self.required {
            rendered.push_str(" (optional)");
        }
        if let Some(default) = &self.default {
            rendered.push_str(" (default: ");
            rendered.push_str(&render_value(default));
            rendered.push(')');
        }
        if let Some(values) = &self.enum_values {
            rendered.push_str(" (");
            rendered.push_str(&values.join("|"));
            rendered.push(')');
        }
        rendered
    }
}

/// Extracts the ordered parameter list from an object schema.
///
/// Order follows the schema's `properties` declaration order. A root schema
/// without `properties` yields an empty list.
#[must_use]
pub fn extract_parameters(schema: &Value) -> Vec<ActionParameter> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        debug!("schema declares no properties");
        return Vec::new();
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, field)| {
            extract_field(name, field, required.contains(&name.as_str()))
                .unwrap_or_else(|| ActionParameter::generic(name.clone()))
        })
        .collect()
}

fn extract_field(name: &str, field: &Value, listed_required: bool) -> Option<ActionParameter> {
    let field = field.as_object()?;
    let default = field.get("default").cloned();

    let (param_type, enum_values) = match field.get("enum") {
        Some(values) => (ParameterType::Enum, Some(enum_labels(values)?)),
        None => (field_type(field)?, None),
    };

    Some(ActionParameter {
        name: name.to_owned(),
        param_type,
        required: listed_required && default.is_none(),
        default,
        enum_values,
        description: field
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned),
    })
}

fn field_type(field: &Map<String, Value>) -> Option<ParameterType> {
    let declared = match field.get("type")? {
        Value::String(single) => single.as_str(),
        // `["string", "null"]` style nullable declarations.
        Value::Array(options) => {
            let mut concrete = options
                .iter()
                .filter_map(Value::as_str)
                .filter(|kind| *kind != "null");
            let kind = concrete.next()?;
            if concrete.next().is_some() {
                return None;
            }
            kind
        }
        _ => return None,
    };

    match declared {
        "string" => Some(ParameterType::String),
        "number" | "integer" => Some(ParameterType::Number),
        "boolean" => Some(ParameterType::Boolean),
        "object" => Some(ParameterType::Object),
        "array" => Some(ParameterType::Array),
        _ => None,
    }
}

fn enum_labels(values: &Value) -> Option<Vec<String>> {
    values
        .as_array()?
        .iter()
        .map(|value| match value {
            Value::String(label) => Some(label.clone()),
            Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
            _ => None,
        })
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn swap_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "inputMint": { "type": "string", "description": "Mint to sell" },
                "outputMint": { "type": "string" },
                "amount": { "type": "number" },
                "slippageBps": { "type": "integer", "default": 50 }
            },
            "required": ["inputMint", "outputMint", "amount", "slippageBps"]
        })
    }

    #[test]
    fn extracts_required_optional_and_defaults() {
        let params = extract_parameters(&swap_schema());
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["inputMint", "outputMint", "amount", "slippageBps"]);

        assert!(params[0].required);
        assert_eq!(params[0].description.as_deref(), Some("Mint to sell"));
        assert_eq!(params[2].param_type, ParameterType::Number);

        let slippage = &params[3];
        assert_eq!(slippage.param_type, ParameterType::Number);
        assert!(!slippage.required);
        assert_eq!(slippage.default, Some(json!(50)));
        assert_eq!(
            slippage.render(),
            "slippageBps: number (optional) (default: 50)"
        );
    }

    #[test]
    fn enumerated_fields_keep_their_values() {
        let params = extract_parameters(&json!({
            "type": "object",
            "properties": { "mode": { "type": "string", "enum": ["mainnet", "testnet"] } }
        }));
        assert_eq!(params[0].param_type, ParameterType::Enum);
        assert_eq!(
            params[0].enum_values.as_deref(),
            Some(&["mainnet".to_owned(), "testnet".to_owned()][..])
        );
        assert_eq!(params[0].render(), "mode: enum (optional) (mainnet|testnet)");
    }

    #[test]
    fn unsupported_constructs_degrade_to_any() {
        let params = extract_parameters(&json!({
            "type": "object",
            "properties": {
                "target": { "oneOf": [{ "type": "string" }, { "type": "number" }] },
                "weird": true,
                "nullable": { "type": ["string", "null"] }
            }
        }));
        assert_eq!(params[0], ActionParameter::generic("target"));
        assert_eq!(params[1], ActionParameter::generic("weird"));
        assert_eq!(params[2].param_type, ParameterType::String);
        assert!(!params[2].required);
    }

    #[test]
    fn schema_without_properties_is_empty() {
        assert!(extract_parameters(&json!({ "type": "object" })).is_empty());
        assert!(extract_parameters(&Value::Null).is_empty());
    }

    #[test]
    fn string_defaults_render_unquoted() {
        let params = extract_parameters(&json!({
            "type": "object",
            "properties": { "token": { "type": "string", "default": "native" } }
        }));
        assert_eq!(params[0].render(), "token: string (optional) (default: native)");
    }
}
