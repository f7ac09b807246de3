//! Configuration loading.
//!
//! A `[condsift.context]` TOML table supplies the option name → value
//! mapping bound into condition expressions. Discovery walks from a
//! starting path up through parent directories, preferring the dedicated
//! `.condsift.toml` over a `Condsift.toml` carrying the same table.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::constants::{CONFIG_FILENAME, FALLBACK_FILENAME};
use crate::context::{ContextError, EvalContext, Value};

/// Top-level configuration struct.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// The main configuration section.
    #[serde(default)]
    pub condsift: CondsiftConfig,
    /// The path to the configuration file this was loaded from.
    /// `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

/// Configuration options for condsift.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CondsiftConfig {
    /// Context entries bound as free variables in condition expressions.
    /// Only boolean, integer, float, and string values are accepted.
    #[serde(default)]
    pub context: BTreeMap<String, toml::Value>,
}

impl CondsiftConfig {
    /// Convert the raw context table into an [`EvalContext`].
    pub fn eval_context(&self) -> Result<EvalContext, ContextError> {
        let mut ctx = EvalContext::new();
        for (name, value) in &self.context {
            let value = match value {
                toml::Value::Boolean(b) => Value::Bool(*b),
                toml::Value::Integer(i) => Value::from(*i),
                toml::Value::Float(f) => Value::Number(*f),
                toml::Value::String(s) => Value::Str(s.clone()),
                toml::Value::Datetime(_) | toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(ContextError::UnsupportedValue(name.clone()));
                }
            };
            ctx.insert(name.clone(), value);
        }
        Ok(ctx)
    }
}

impl Config {
    /// Loads configuration from default locations in the current directory
    /// or any of its ancestors.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            for filename in [CONFIG_FILENAME, FALLBACK_FILENAME] {
                let candidate = current.join(filename);
                if candidate.exists() {
                    if let Ok(content) = fs::read_to_string(&candidate) {
                        if let Ok(mut config) = toml::from_str::<Self>(&content) {
                            config.config_file_path = Some(candidate);
                            return config;
                        }
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Self::default()
    }
}
