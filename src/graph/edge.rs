use super::node::NodeId;
use serde::{Deserialize, Deserializer, Serialize};

/// A directed binding from a source node's output socket to a variable the target declares.
///
/// A missing handle (as produced by some editors for handle-less nodes) is read as the
/// empty string; such edges never carry data during input binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: NodeId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_handle: String,
    pub target: NodeId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub target_handle: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Connection::new(source, source_handle, target, target_handle).into_edge()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn connection(&self) -> Connection {
        Connection {
            source: self.source.clone(),
            source_handle: self.source_handle.clone(),
            target: self.target.clone(),
            target_handle: self.target_handle.clone(),
        }
    }
}

/// An edge request from the editor, before an id has been assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: NodeId,
    pub source_handle: String,
    pub target: NodeId,
    pub target_handle: String,
}

impl Connection {
    pub fn new(
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: source_handle.into(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }

    /// The deterministic id given to the edge this connection creates.
    pub fn edge_id(&self) -> String {
        format!(
            "reactflow__edge-{}{}-{}{}",
            self.source, self.source_handle, self.target, self.target_handle
        )
    }

    pub fn into_edge(self) -> Edge {
        Edge {
            id: self.edge_id(),
            source: self.source,
            source_handle: self.source_handle,
            target: self.target,
            target_handle: self.target_handle,
        }
    }
}
