use crate::graph::{Edge, Group, Node, NodeData, NodeKind, Position};
use crate::error::FlowConversionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pan and zoom of the editor canvas. Carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// The complete, typed contents of a graph, as exchanged with the persistence layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Viewport,
    pub groups: Vec<Group>,
}

/// A node as stored in flow files: the data object is an untyped JSON map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub selected: bool,
}

impl RawNode {
    /// Types the node. Fails only when `type` is not a registered node kind.
    pub fn into_node(self) -> Result<Node, FlowConversionError> {
        let kind = NodeKind::from_type_name(&self.node_type).ok_or_else(|| {
            FlowConversionError::InvalidNodeType {
                node_id: self.id.clone(),
                type_name: self.node_type.clone(),
            }
        })?;
        Ok(Node {
            id: self.id,
            kind,
            position: self.position,
            data: NodeData::from_map(kind, self.data),
            selected: self.selected,
        })
    }
}

impl From<&Node> for RawNode {
    fn from(node: &Node) -> Self {
        RawNode {
            id: node.id.clone(),
            node_type: node.kind.type_name().to_string(),
            position: node.position,
            data: node.data.to_map(),
            selected: node.selected,
        }
    }
}

/// The on-disk flow shape: `{nodes, edges, viewport, groups}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFlow {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl RawFlow {
    pub fn from_json(json: &str) -> Result<Self, FlowConversionError> {
        serde_json::from_str(json).map_err(|e| FlowConversionError::Json(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowConversionError> {
        serde_json::to_string_pretty(self).map_err(|e| FlowConversionError::Json(e.to_string()))
    }
}

impl From<&FlowData> for RawFlow {
    fn from(flow: &FlowData) -> Self {
        RawFlow {
            nodes: flow.nodes.iter().map(RawNode::from).collect(),
            edges: flow.edges.clone(),
            viewport: flow.viewport,
            groups: flow.groups.clone(),
        }
    }
}
