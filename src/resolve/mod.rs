//! Output extraction and recursive input binding.
//!
//! Both halves only ever read the graph: [`resolve_output`] computes what a single output
//! socket currently produces, and [`InputBinder`] walks inbound edges to assemble the
//! variable bindings a node needs before it can run.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

mod binder;
mod output;

pub use binder::InputBinder;
pub use output::resolve_output;

/// Variable name -> every value bound to it, in edge order.
pub type PulledInputs = AHashMap<String, Vec<PromptVar>>;

/// A value flowing along an edge, together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateVarInfo {
    pub text: String,
    /// Sibling column or field values that travel with `text`.
    #[serde(default)]
    pub metavars: AHashMap<String, String>,
    /// Lets the execution layer re-correlate values that came from the same source row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associate_id: Option<String>,
}

/// The resolved unit of data: either a bare string or a string with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptVar {
    Text(String),
    Info(TemplateVarInfo),
}

impl PromptVar {
    pub fn text(&self) -> &str {
        match self {
            PromptVar::Text(text) => text,
            PromptVar::Info(info) => &info.text,
        }
    }

    pub fn metavars(&self) -> Option<&AHashMap<String, String>> {
        match self {
            PromptVar::Text(_) => None,
            PromptVar::Info(info) => Some(&info.metavars),
        }
    }

    /// Reads an arbitrary JSON value as a prompt variable.
    ///
    /// Strings stay strings and objects shaped like a `TemplateVarInfo` keep their
    /// metadata. Anything else is carried as its JSON text.
    pub fn from_value(value: Value) -> PromptVar {
        match value {
            Value::String(text) => PromptVar::Text(text),
            Value::Object(ref map) if map.get("text").is_some_and(Value::is_string) => {
                match serde_json::from_value::<TemplateVarInfo>(value.clone()) {
                    Ok(info) => PromptVar::Info(info),
                    Err(_) => PromptVar::Text(value.to_string()),
                }
            }
            other => PromptVar::Text(other.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            PromptVar::Text(text) => Value::String(text.clone()),
            PromptVar::Info(info) => serde_json::to_value(info).unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for PromptVar {
    fn from(text: &str) -> Self {
        PromptVar::Text(text.to_string())
    }
}

impl From<String> for PromptVar {
    fn from(text: String) -> Self {
        PromptVar::Text(text)
    }
}

impl From<TemplateVarInfo> for PromptVar {
    fn from(info: TemplateVarInfo) -> Self {
        PromptVar::Info(info)
    }
}

impl fmt::Display for PromptVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// What an output socket produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A list of values extracted by a shape-specific rule.
    List(Vec<PromptVar>),
    /// A value stored inline under the socket's key, returned as-is.
    Single(Value),
}

impl Output {
    /// The values this output contributes to a variable binding.
    ///
    /// Only lists bind: an inline value that is not a JSON array contributes nothing.
    pub fn into_prompt_vars(self) -> Vec<PromptVar> {
        match self {
            Output::List(values) => values,
            Output::Single(Value::Array(items)) => {
                items.into_iter().map(PromptVar::from_value).collect()
            }
            Output::Single(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_with_text_keep_metadata() {
        let var = PromptVar::from_value(json!({
            "text": "Paris",
            "metavars": { "country": "France" },
            "associate_id": "r1"
        }));
        match var {
            PromptVar::Info(info) => {
                assert_eq!(info.text, "Paris");
                assert_eq!(info.metavars.get("country").map(String::as_str), Some("France"));
                assert_eq!(info.associate_id.as_deref(), Some("r1"));
            }
            other => panic!("Expected Info, got {:?}", other),
        }
    }

    #[test]
    fn scalars_become_text() {
        assert_eq!(PromptVar::from_value(json!(3)), PromptVar::Text("3".to_string()));
        assert_eq!(PromptVar::from_value(json!("a")), PromptVar::Text("a".to_string()));
    }

    #[test]
    fn only_inline_arrays_bind() {
        assert!(Output::Single(json!("solo")).into_prompt_vars().is_empty());
        assert_eq!(
            Output::Single(json!(["a", "b"])).into_prompt_vars(),
            vec![PromptVar::from("a"), PromptVar::from("b")]
        );
    }
}
