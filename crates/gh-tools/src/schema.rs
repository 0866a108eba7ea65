//! Tool descriptors and parameter schemas
//!
//! A [`ToolDescriptor`] bundles everything the dispatcher needs for one tool:
//! the parameter schema used by the validator, the command builder, the
//! result label and the policy applied to the program's error stream.

use std::fmt;

use serde_json::{Map, Value, json};

use crate::command::ExternalCommand;
use crate::validate::ValidatedArguments;

/// Semantic type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    StringArray,
}

impl ParamType {
    /// Human-readable name, used in validation messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::StringArray => "array of strings",
        }
    }

    fn json_schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        match self {
            ParamType::String => {
                schema.insert("type".into(), json!("string"));
            }
            ParamType::Integer => {
                schema.insert("type".into(), json!("integer"));
            }
            ParamType::Boolean => {
                schema.insert("type".into(), json!("boolean"));
            }
            ParamType::StringArray => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), json!({ "type": "string" }));
            }
        }
        schema
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default applied to an optional parameter the caller left unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Str(&'static str),
    Integer(i64),
    Boolean(bool),
}

impl ParamDefault {
    fn to_json(self) -> Value {
        match self {
            ParamDefault::Str(s) => json!(s),
            ParamDefault::Integer(n) => json!(n),
            ParamDefault::Boolean(b) => json!(b),
        }
    }
}

/// Schema for a single tool parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub default: Option<ParamDefault>,
    /// Allowed values; empty means unrestricted
    pub choices: &'static [&'static str],
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
            choices: &[],
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub fn string_array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::StringArray, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: ParamDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn one_of(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    /// JSON Schema fragment advertised to callers
    pub fn json_schema(&self) -> Value {
        let mut schema = self.kind.json_schema();
        if !self.choices.is_empty() {
            schema.insert("enum".into(), json!(self.choices));
        }
        schema.insert("description".into(), json!(self.description));
        if let Some(default) = self.default {
            schema.insert("default".into(), default.to_json());
        }
        Value::Object(schema)
    }
}

/// What a non-empty error stream means for a successful exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrPolicy {
    /// Any error-stream text fails the call
    Strict,
    /// Error-stream text is appended to the result under `heading`
    Advisory { heading: &'static str },
}

/// Builds the command for one tool from its validated arguments
pub type BuildFn = fn(&ValidatedArguments) -> ExternalCommand;

/// Static description of one tool
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    /// Prepended to the program's output in the result body
    pub label: &'static str,
    pub stderr_policy: StderrPolicy,
    build: BuildFn,
}

impl ToolDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        label: &'static str,
        stderr_policy: StderrPolicy,
        build: BuildFn,
    ) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
            label,
            stderr_policy,
            build,
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Look up a parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of the required parameters, in declaration order
    pub fn required_params(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }

    /// Describe the command for already-validated arguments. Never executes anything.
    pub fn build_command(&self, args: &ValidatedArguments) -> ExternalCommand {
        (self.build)(args)
    }

    /// JSON Schema object describing this tool's arguments
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.json_schema()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));

        let required = self.required_params();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        Value::Object(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop(_: &ValidatedArguments) -> ExternalCommand {
        ExternalCommand::new("gh", ["--version"])
    }

    #[test]
    fn param_schema_includes_enum_and_default() {
        let param = ParamSpec::string("state", "Issue state")
            .one_of(&["open", "closed", "all"])
            .with_default(ParamDefault::Str("open"));

        assert_eq!(
            param.json_schema(),
            json!({
                "type": "string",
                "enum": ["open", "closed", "all"],
                "description": "Issue state",
                "default": "open"
            })
        );
    }

    #[test]
    fn string_array_schema_declares_items() {
        let param = ParamSpec::string_array("labels", "Labels to add");
        assert_eq!(
            param.json_schema(),
            json!({
                "type": "array",
                "items": { "type": "string" },
                "description": "Labels to add"
            })
        );
    }

    #[test]
    fn input_schema_lists_required_fields_in_order() {
        let tool = ToolDescriptor::new("t", "test", "T:", StderrPolicy::Strict, noop)
            .with_param(ParamSpec::string("owner", "Repository owner").required())
            .with_param(ParamSpec::integer("limit", "Limit").with_default(ParamDefault::Integer(30)))
            .with_param(ParamSpec::string("repo", "Repository name").required());

        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["owner", "repo"]));
        assert_eq!(schema["properties"]["limit"]["default"], 30);
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
    }

    #[test]
    fn input_schema_omits_empty_required() {
        let tool = ToolDescriptor::new("t", "test", "T:", StderrPolicy::Strict, noop)
            .with_param(ParamSpec::boolean("draft", "Draft"));
        assert!(tool.input_schema().get("required").is_none());
    }

    #[test]
    fn param_lookup() {
        let tool = ToolDescriptor::new("t", "test", "T:", StderrPolicy::Strict, noop)
            .with_param(ParamSpec::boolean("draft", "Draft"));
        assert_eq!(tool.param("draft").map(|p| p.kind), Some(ParamType::Boolean));
        assert!(tool.param("missing").is_none());
    }
}
