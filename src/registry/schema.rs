//! Structural argument contracts for capabilities.
//!
//! An [`InputSchema`] declares the parameters a tool accepts: name, primitive
//! type, whether it is required, and optionally an enumerated set of allowed
//! values. It serialises to the JSON Schema subset MCP clients expect and is
//! checked against incoming arguments before any handler runs.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Arguments passed to a handler: a JSON object.
pub type Arguments = Map<String, Value>;

/// Primitive parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// JSON string.
    String,
    /// Any JSON number.
    Number,
}

impl ParamType {
    /// JSON Schema name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }

    /// Returns `true` if `value` has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
        }
    }
}

/// Returns the JSON type name of a value, for error messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Why a set of arguments does not satisfy a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    /// A required parameter is absent.
    #[error("missing required argument '{name}'")]
    Missing {
        /// Parameter name.
        name: String,
    },

    /// A parameter has the wrong JSON type.
    #[error("argument '{name}' must be of type {expected}, got {found}")]
    WrongType {
        /// Parameter name.
        name: String,
        /// Declared type.
        expected: &'static str,
        /// Actual JSON type.
        found: &'static str,
    },

    /// A parameter value is outside its enumerated set.
    #[error("argument '{name}' must be one of [{allowed}], got {value}")]
    NotAllowed {
        /// Parameter name.
        name: String,
        /// The rejected value.
        value: String,
        /// Comma-separated allowed values.
        allowed: String,
    },

    /// A parameter was supplied that the schema does not declare.
    #[error("unexpected argument '{name}'")]
    Unexpected {
        /// Parameter name.
        name: String,
    },
}

/// Declaration of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    kind: ParamType,
    description: Option<String>,
    required: bool,
    allowed: Vec<Value>,
    default: Option<Value>,
}

impl ParamSpec {
    /// Declares an optional parameter of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            required: false,
            allowed: Vec::new(),
            default: None,
        }
    }

    /// Declares an optional string parameter.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    /// Declares an optional number parameter.
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number)
    }

    /// Marks the parameter as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restricts the parameter to an enumerated set of values.
    #[must_use]
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the advertised default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub const fn kind(&self) -> ParamType {
        self.kind
    }

    /// Whether the parameter must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    fn check(&self, value: &Value) -> Result<(), SchemaViolation> {
        if !self.kind.matches(value) {
            return Err(SchemaViolation::WrongType {
                name: self.name.clone(),
                expected: self.kind.as_str(),
                found: json_type_name(value),
            });
        }

        if !self.allowed.is_empty() && !self.allowed.contains(value) {
            let allowed = self
                .allowed
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SchemaViolation::NotAllowed {
                name: self.name.clone(),
                value: value.to_string(),
                allowed,
            });
        }

        Ok(())
    }

    fn to_json(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(self.kind.as_str()));
        if let Some(ref description) = self.description {
            property.insert("description".to_string(), json!(description));
        }
        if !self.allowed.is_empty() {
            property.insert("enum".to_string(), Value::Array(self.allowed.clone()));
        }
        if let Some(ref default) = self.default {
            property.insert("default".to_string(), default.clone());
        }
        Value::Object(property)
    }
}

/// The argument contract of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema {
    params: IndexMap<String, ParamSpec>,
    additional_properties: bool,
}

impl InputSchema {
    /// An empty schema that tolerates undeclared arguments.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: IndexMap::new(),
            additional_properties: true,
        }
    }

    /// Adds a parameter. A later declaration with the same name replaces
    /// the earlier one.
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.insert(spec.name.clone(), spec);
        self
    }

    /// Rejects arguments that are not declared.
    #[must_use]
    pub const fn deny_unknown(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    /// Declared parameters in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.values()
    }

    /// Checks `args` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] found, in declaration order.
    pub fn validate(&self, args: &Arguments) -> Result<(), SchemaViolation> {
        for spec in self.params.values() {
            match args.get(&spec.name) {
                // Explicit null counts as absent
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(SchemaViolation::Missing {
                            name: spec.name.clone(),
                        });
                    }
                }
                Some(value) => spec.check(value)?,
            }
        }

        if !self.additional_properties {
            if let Some(name) = args.keys().find(|k| !self.params.contains_key(*k)) {
                return Err(SchemaViolation::Unexpected { name: name.clone() });
            }
        }

        Ok(())
    }

    /// Renders this schema as a JSON Schema object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .values()
            .map(|p| (p.name.clone(), p.to_json()))
            .collect();
        let required: Vec<&str> = self
            .params
            .values()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        if !self.additional_properties {
            schema["additionalProperties"] = json!(false);
        }
        schema
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    fn sample() -> InputSchema {
        InputSchema::new()
            .param(ParamSpec::string("message").required().describe("Text"))
            .param(ParamSpec::string("format").one_of(["iso", "unix"]).default_value("iso"))
            .param(ParamSpec::number("scale"))
    }

    #[test]
    fn accepts_valid_arguments() {
        let schema = sample();
        assert!(schema
            .validate(&args(json!({"message": "hi", "format": "unix", "scale": 0.5})))
            .is_ok());
    }

    #[test]
    fn missing_required() {
        let err = sample().validate(&args(json!({}))).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::Missing {
                name: "message".to_string()
            }
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let err = sample()
            .validate(&args(json!({"message": null})))
            .unwrap_err();
        assert!(matches!(err, SchemaViolation::Missing { .. }));
    }

    #[test]
    fn wrong_type() {
        let err = sample()
            .validate(&args(json!({"message": 42})))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::WrongType {
                name: "message".to_string(),
                expected: "string",
                found: "number",
            }
        );
    }

    #[test]
    fn number_rejects_numeric_string() {
        let err = sample()
            .validate(&args(json!({"message": "x", "scale": "2"})))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::WrongType {
                name: "scale".to_string(),
                expected: "number",
                found: "string",
            }
        );
    }

    #[test]
    fn enum_membership() {
        let err = sample()
            .validate(&args(json!({"message": "x", "format": "klingon"})))
            .unwrap_err();
        assert!(err.to_string().contains("klingon"));
        assert!(err.to_string().contains("\"iso\""));
    }

    #[test]
    fn unknown_arguments_tolerated_by_default() {
        assert!(sample()
            .validate(&args(json!({"message": "x", "extra": true})))
            .is_ok());
    }

    #[test]
    fn deny_unknown_rejects_extras() {
        let schema = InputSchema::new().deny_unknown();
        let err = schema.validate(&args(json!({"extra": 1}))).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::Unexpected {
                name: "extra".to_string()
            }
        );
    }

    #[test]
    fn renders_json_schema() {
        let json = sample().to_json();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["message"]["type"], "string");
        assert_eq!(json["properties"]["message"]["description"], "Text");
        assert_eq!(json["properties"]["format"]["enum"], json!(["iso", "unix"]));
        assert_eq!(json["properties"]["format"]["default"], "iso");
        assert_eq!(json["required"], json!(["message"]));
        assert!(json.get("additionalProperties").is_none());
    }

    #[test]
    fn properties_keep_declaration_order() {
        let json = InputSchema::new()
            .param(ParamSpec::string("zeta"))
            .param(ParamSpec::number("alpha"))
            .param(ParamSpec::string("mid"))
            .to_json();
        let keys: Vec<&str> = json["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn empty_schema_has_no_required_list() {
        let json = InputSchema::new().deny_unknown().to_json();
        assert!(json.get("required").is_none());
        assert_eq!(json["additionalProperties"], false);
        assert!(json["properties"].as_object().unwrap().is_empty());
    }
}
