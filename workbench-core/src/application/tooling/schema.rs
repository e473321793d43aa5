//! Parameter schemas and argument validation.
//!
//! Each tool declares an ordered list of [`ParamSpec`]s. Incoming arguments
//! are checked against it before a handler runs: required parameters must be
//! present, provided values must convert to the declared type, and optional
//! parameters fall back to their defaults.

use super::result::ToolFailure;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    String,
    Boolean,
}

impl ParamType {
    pub fn json_type(self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
        }
    }

    /// Converts `value` to this type, accepting the lax forms a model tends
    /// to produce (`"3"` for 3, `4.0` for 4). Returns `None` when no
    /// conversion exists.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ParamType::Integer, Value::Number(number)) => {
                if let Some(int) = number.as_i64() {
                    Some(Value::from(int))
                } else {
                    number
                        .as_f64()
                        .filter(|float| float.fract() == 0.0)
                        .filter(|float| *float >= i64::MIN as f64 && *float <= i64::MAX as f64)
                        .map(|float| Value::from(float as i64))
                }
            }
            (ParamType::Integer, Value::String(text)) => {
                text.trim().parse::<i64>().ok().map(Value::from)
            }
            (ParamType::Number, Value::Number(_)) => Some(value.clone()),
            (ParamType::Number, Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|float| float.is_finite())
                .map(Value::from),
            (ParamType::String, Value::String(_)) => Some(value.clone()),
            (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ParamType::Boolean, Value::String(text)) => match text.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: ParamType, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: Some(default.into()),
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Builds the JSON schema advertised in `tools/list` for a parameter list.
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for param in params {
        let mut property = Map::new();
        property.insert("type".into(), Value::String(param.ty.json_type().into()));
        if let Some(default) = &param.default {
            property.insert("default".into(), default.clone());
        }
        if let Some(description) = &param.description {
            property.insert("description".into(), Value::String(description.clone()));
        }
        properties.insert(param.name.clone(), Value::Object(property));
    }
    let required: Vec<&str> = params
        .iter()
        .filter(|param| param.required)
        .map(|param| param.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Validates raw arguments against `params`.
pub fn validate(params: &[ParamSpec], arguments: Value) -> Result<Arguments, ToolFailure> {
    let mut provided = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(ToolFailure::invalid_arguments(
                "arguments",
                format!("expected an object, got {}", value_kind(&other)),
            ));
        }
    };

    let mut values = Map::new();
    for param in params {
        match provided.remove(&param.name) {
            Some(Value::Null) | None => {
                if let Some(default) = &param.default {
                    values.insert(param.name.clone(), default.clone());
                } else if param.required {
                    return Err(ToolFailure::invalid_arguments(
                        &param.name,
                        "missing required parameter",
                    ));
                }
            }
            Some(raw) => {
                let converted = param.ty.coerce(&raw).ok_or_else(|| {
                    ToolFailure::invalid_arguments(
                        &param.name,
                        format!("expected {}, got {}", param.ty, value_kind(&raw)),
                    )
                })?;
                values.insert(param.name.clone(), converted);
            }
        }
    }

    if !provided.is_empty() {
        let ignored: Vec<&String> = provided.keys().collect();
        debug!(?ignored, "Ignoring undeclared tool arguments");
    }

    Ok(Arguments { values })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments that passed validation, already converted to declared types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    pub fn integer(&self, name: &str) -> Result<i64, ToolFailure> {
        self.values
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| ToolFailure::invalid_arguments(name, "expected integer"))
    }

    pub fn string(&self, name: &str) -> Result<&str, ToolFailure> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolFailure::invalid_arguments(name, "expected string"))
    }
}
