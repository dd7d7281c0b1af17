//! Placeholder substitution for option trees
//!
//! Transport options can reference variables as `%NAME%` tokens so that
//! secrets live apart from the option structure:
//!
//! ```
//! use serde_json::json;
//! use soflomo_mail::domain::communication::placeholders::resolve;
//!
//! let options = json!({ "connection_config": { "password": "%PASSWORD%" } });
//! let variables = json!({ "password": "hunter2" });
//!
//! let resolved = resolve(&options, variables.as_object().unwrap());
//!
//! assert_eq!(resolved, json!({ "connection_config": { "password": "hunter2" } }));
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};

/// The `%KEY%` token a variable named `key` replaces
pub fn placeholder_token(key: &str) -> String {
    format!("%{}%", key.to_ascii_uppercase())
}

/// Replaces placeholder tokens in option trees
///
/// Variable keys normalize to `%KEY%`. When two keys normalize to the same
/// token, the later one wins.
#[derive(Clone, Debug, Default)]
pub struct PlaceholderSubstitutor {
    tokens: HashMap<String, Value>,
}

impl PlaceholderSubstitutor {
    /// Create a substitutor for `variables`
    pub fn new(variables: &Map<String, Value>) -> Self {
        let tokens = variables
            .iter()
            .map(|(key, value)| (placeholder_token(key), value.clone()))
            .collect();

        Self { tokens }
    }

    /// Resolve every leaf of `tree` that exactly matches a token
    ///
    /// Unknown tokens are left as they are. The input is not modified.
    pub fn resolve(&self, tree: &Value) -> Value {
        match tree {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), self.resolve(value)))
                    .collect(),
            ),
            Value::Array(values) => Value::Array(values.iter().map(|value| self.resolve(value)).collect()),
            Value::String(leaf) => self
                .tokens
                .get(leaf)
                .cloned()
                .unwrap_or_else(|| tree.clone()),
            leaf => leaf.clone(),
        }
    }
}

/// Resolve `tree` against `variables`
pub fn resolve(tree: &Value, variables: &Map<String, Value>) -> Value {
    PlaceholderSubstitutor::new(variables).resolve(tree)
}
