//! Evaluation context: the caller-supplied name → value mapping bound as
//! free variables in condition expressions. Immutable for the duration
//! of one resolution pass.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A context value: boolean, number, or string.
///
/// Directives live in JavaScript sources, so truthiness follows JS
/// rules: `false`, `0`, `NaN` and the empty string are falsy, everything
/// else is truthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Numeric value (all numbers are f64, as in the original evaluator).
    Number(f64),
    /// String value.
    Str(String),
}

impl Value {
    /// JS-style truthiness of this value.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Human-readable type name, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        // All numbers are f64, matching the original evaluator.
        Self::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Error building a context from external data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The JSON source was not valid JSON.
    #[error("Invalid context JSON: {0}")]
    InvalidJson(String),
    /// The JSON source was valid but not an object.
    #[error("Context must be a JSON object")]
    NotAnObject,
    /// An entry had a type outside bool/number/string.
    #[error("Unsupported value for '{0}': expected boolean, number, or string")]
    UnsupportedValue(String),
}

/// Read-only mapping of option names to [`Value`]s.
///
/// Option names are free-form and are looked up exactly as written in
/// condition expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    values: FxHashMap<String, Value>,
}

impl EvalContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name to a value, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Look up a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether a name is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a context from a JSON object string, e.g.
    /// `{"DEBUG": false, "MODE": "production"}`. Only boolean, number,
    /// and string entries are accepted.
    pub fn from_json_str(source: &str) -> Result<Self, ContextError> {
        let parsed: serde_json::Value =
            serde_json::from_str(source).map_err(|e| ContextError::InvalidJson(e.to_string()))?;
        let serde_json::Value::Object(map) = parsed else {
            return Err(ContextError::NotAnObject);
        };

        let mut ctx = Self::new();
        for (name, value) in map {
            let value = match value {
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::Number(n) => {
                    Value::Number(n.as_f64().ok_or_else(|| {
                        ContextError::UnsupportedValue(name.clone())
                    })?)
                }
                serde_json::Value::String(s) => Value::Str(s),
                serde_json::Value::Null
                | serde_json::Value::Array(_)
                | serde_json::Value::Object(_) => {
                    return Err(ContextError::UnsupportedValue(name));
                }
            };
            ctx.values.insert(name, value);
        }
        Ok(ctx)
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for EvalContext {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut ctx = Self::new();
        for (name, value) in iter {
            ctx.insert(name, value);
        }
        ctx
    }
}
