use super::payload::{AttributeSet, CompositeData, FieldSet, NodeBody, TableData};
use crate::template::template_vars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub type NodeId = String;

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Arithmetic mean of a set of positions. `None` for an empty set.
    pub fn centroid<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Option<Position> {
        let (count, sum_x, sum_y) = positions
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(n, x, y), p| (n + 1, x + p.x, y + p.y));
        (count > 0).then(|| Position::new(sum_x / count as f64, sum_y / count as f64))
    }
}

/// Master macro to define the closed set of node kinds and their registered type names.
macro_rules! define_node_kinds {
    ( $( ($variant:ident, $type_name:literal) ),* $(,)? ) => {
        /// The registered node types. Every node in a graph is exactly one of these.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeKind {
            $(
                #[serde(rename = $type_name)]
                $variant,
            )*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[ $( NodeKind::$variant, )* ];

            /// The type string used by the node-type registry and in flow files.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant => $type_name, )*
                }
            }

            pub fn from_type_name(name: &str) -> Option<NodeKind> {
                match name {
                    $( $type_name => Some(NodeKind::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

define_node_kinds! {
    (TextFields, "textfields"),
    (Prompt, "prompt"),
    (Chat, "chat"),
    (SimpleEval, "simpleval"),
    (Evaluator, "evaluator"),
    (LlmEval, "llmeval"),
    (MultiEval, "multieval"),
    (Vis, "vis"),
    (Inspect, "inspect"),
    (Script, "script"),
    (Items, "csv"),
    (Table, "table"),
    (Comment, "comment"),
    (Join, "join"),
    (Split, "split"),
    (Processor, "processor"),
    (Project, "project"),
    (Task, "task"),
    (Group, "groupNode"),
    (DynamicPrompt, "dynamicprompt"),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::from_type_name(s).ok_or_else(|| format!("unknown node type '{}'", s))
    }
}

/// The data carried by a node.
///
/// The keys every node may carry (`vars`, `refresh`, `name`) are lifted into fields,
/// the node's output shape lives in `body`, and anything else the editing UI stores is
/// kept verbatim in `inline`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeData {
    pub body: NodeBody,
    /// Variable names this node declares as inputs.
    pub vars: Vec<String>,
    /// Set by a refresh ping: the cached display of this node is stale.
    pub refresh: bool,
    pub name: Option<String>,
    pub inline: Map<String, Value>,
}

const KEY_VARS: &str = "vars";
const KEY_REFRESH: &str = "refresh";
const KEY_NAME: &str = "name";

impl NodeData {
    pub fn new(body: NodeBody) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn with_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vars = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inline(mut self, key: &str, value: Value) -> Self {
        self.inline.insert(key.to_string(), value);
        self
    }

    /// Builds typed node data from a loosely shaped JSON object.
    ///
    /// Never fails: keys whose values do not have the expected shape are kept in
    /// `inline` untouched, so externally constructed data passes through as-is.
    pub fn from_map(kind: NodeKind, mut map: Map<String, Value>) -> Self {
        let vars = match map.remove(KEY_VARS) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(other) => {
                map.insert(KEY_VARS.to_string(), other);
                Vec::new()
            }
            None => Vec::new(),
        };
        let refresh = match map.remove(KEY_REFRESH) {
            Some(Value::Bool(b)) => b,
            Some(other) => {
                map.insert(KEY_REFRESH.to_string(), other);
                false
            }
            None => false,
        };
        let name = match map.remove(KEY_NAME) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                map.insert(KEY_NAME.to_string(), other);
                None
            }
            None => None,
        };

        let body = NodeBody::from_map(kind, &mut map);

        Self {
            body,
            vars,
            refresh,
            name,
            inline: map,
        }
    }

    /// Flattens the data back into the JSON object shape used by flow files.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.inline.clone();
        if !self.vars.is_empty() {
            map.insert(
                KEY_VARS.to_string(),
                Value::Array(self.vars.iter().cloned().map(Value::String).collect()),
            );
        }
        if self.refresh {
            map.insert(KEY_REFRESH.to_string(), Value::Bool(true));
        }
        if let Some(name) = &self.name {
            map.insert(KEY_NAME.to_string(), Value::String(name.clone()));
        }
        self.body.write_into(&mut map);
        map
    }
}

/// A typed unit of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
    pub selected: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position::default(),
            data,
            selected: false,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// A text-fields node with keyed fields, in the given order.
    pub fn text_fields<I, K, V>(id: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = FieldSet::keyed(fields);
        Node::new(id, NodeKind::TextFields, NodeData::new(NodeBody::Fields(fields)))
    }

    /// A prompt node whose declared variables are read from its template.
    pub fn prompt(id: impl Into<String>, template: &str) -> Self {
        let data = NodeData::new(NodeBody::Inline)
            .with_vars(template_vars(template))
            .with_inline("prompt", Value::String(template.to_string()));
        Node::new(id, NodeKind::Prompt, data)
    }

    pub fn table(id: impl Into<String>, table: TableData) -> Self {
        Node::new(id, NodeKind::Table, NodeData::new(NodeBody::Table(table)))
    }

    pub fn project(id: impl Into<String>, attributes: AttributeSet) -> Self {
        Node::new(
            id,
            NodeKind::Project,
            NodeData::new(NodeBody::Attributes(attributes)),
        )
    }

    pub fn composite(id: impl Into<String>, composite: CompositeData) -> Self {
        Node::new(
            id,
            NodeKind::Group,
            NodeData::new(NodeBody::Composite(composite)),
        )
    }

    /// The label shown for this node in group summaries.
    pub fn display_name(&self) -> String {
        self.data
            .name
            .clone()
            .unwrap_or_else(|| self.kind.type_name().to_string())
    }

    pub fn as_composite(&self) -> Option<&CompositeData> {
        match &self.data.body {
            NodeBody::Composite(composite) => Some(composite),
            _ => None,
        }
    }
}
