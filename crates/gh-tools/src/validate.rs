//! Argument validation
//!
//! Turns the loosely-typed argument bag of a tool call into
//! [`ValidatedArguments`]. Checks run in a fixed order and stop at the first
//! violation:
//!
//! 1. every required field is present and non-null
//! 2. every present field has its declared type
//! 3. every restricted field holds one of its declared choices
//!
//! Unset optional fields then receive their declared default. Values are
//! never coerced across types: `"30"` is not an integer.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ARGUMENTS_FIELD, ValidationError, ValidationReason};
use crate::schema::{ParamDefault, ParamSpec, ParamType, ToolDescriptor};

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    StringArray(Vec<String>),
}

impl From<ParamDefault> for ArgValue {
    fn from(default: ParamDefault) -> Self {
        match default {
            ParamDefault::Str(s) => ArgValue::String(s.to_string()),
            ParamDefault::Integer(n) => ArgValue::Integer(n),
            ParamDefault::Boolean(b) => ArgValue::Boolean(b),
        }
    }
}

/// Schema-conformant, defaulted arguments for one tool call
///
/// Only [`validate`] creates these, so holding one means the descriptor's
/// constraints were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedArguments {
    values: BTreeMap<&'static str, ArgValue>,
}

impl ValidatedArguments {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value, `false` when unset
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Boolean(true)))
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(ArgValue::StringArray(items)) => Some(items),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validate a raw argument bag against a tool's schema.
///
/// A missing (`null`) bag is treated as empty. Unknown keys are ignored.
pub fn validate(
    descriptor: &ToolDescriptor,
    raw: &Value,
) -> Result<ValidatedArguments, ValidationError> {
    let empty = Map::new();
    let bag = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        _ => {
            return Err(ValidationError::new(
                ARGUMENTS_FIELD,
                ValidationReason::WrongType { expected: "object" },
            ));
        }
    };

    let present = |param: &ParamSpec| bag.get(param.name).filter(|v| !v.is_null());

    for param in descriptor.params.iter().filter(|p| p.required) {
        if present(param).is_none() {
            return Err(ValidationError::new(
                param.name,
                ValidationReason::MissingRequired,
            ));
        }
    }

    let mut values = BTreeMap::new();
    for param in &descriptor.params {
        if let Some(raw_value) = present(param) {
            let value = typed(param.kind, raw_value).ok_or_else(|| {
                ValidationError::new(
                    param.name,
                    ValidationReason::WrongType {
                        expected: param.kind.as_str(),
                    },
                )
            })?;
            values.insert(param.name, value);
        }
    }

    for param in descriptor.params.iter().filter(|p| !p.choices.is_empty()) {
        if let Some(ArgValue::String(choice)) = values.get(param.name)
            && !param.choices.contains(&choice.as_str())
        {
            return Err(ValidationError::new(
                param.name,
                ValidationReason::InvalidEnumValue {
                    allowed: param.choices,
                },
            ));
        }
    }

    for param in &descriptor.params {
        if let Some(default) = param.default {
            values.entry(param.name).or_insert_with(|| default.into());
        }
    }

    Ok(ValidatedArguments { values })
}

fn typed(kind: ParamType, value: &Value) -> Option<ArgValue> {
    match kind {
        ParamType::String => value.as_str().map(|s| ArgValue::String(s.to_string())),
        ParamType::Integer => value.as_i64().map(ArgValue::Integer),
        ParamType::Boolean => value.as_bool().map(ArgValue::Boolean),
        ParamType::StringArray => value
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(ArgValue::StringArray),
    }
}
