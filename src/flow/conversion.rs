use super::definition::{FlowData, RawFlow};
use crate::error::FlowConversionError;
use ahash::AHashSet;

/// A trait for external graph formats that can be converted into a `FlowData`.
///
/// This is the seam for loading graphs the engine did not build itself. The engine
/// performs no schema validation beyond what a typed graph needs: every node type must
/// be registered and node ids must be unique.
///
/// # Example
///
/// ```rust,no_run
/// use flowforge::prelude::{FlowConversionError, FlowData, IntoFlow, Node};
///
/// struct Sheet { rows: Vec<(String, String)> }
///
/// impl IntoFlow for Sheet {
///     fn into_flow(self) -> Result<FlowData, FlowConversionError> {
///         if self.rows.is_empty() {
///             return Err(FlowConversionError::ValidationError("sheet has no rows".into()));
///         }
///         let node = Node::text_fields("sheet", self.rows);
///         Ok(FlowData { nodes: vec![node], ..FlowData::default() })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a typed flow.
    fn into_flow(self) -> Result<FlowData, FlowConversionError>;
}

impl IntoFlow for RawFlow {
    fn into_flow(self) -> Result<FlowData, FlowConversionError> {
        let mut seen = AHashSet::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for raw in self.nodes {
            if !seen.insert(raw.id.clone()) {
                return Err(FlowConversionError::DuplicateNodeId(raw.id));
            }
            nodes.push(raw.into_node()?);
        }

        let edges = self
            .edges
            .into_iter()
            .filter(|edge| {
                let known = seen.contains(&edge.source) && seen.contains(&edge.target);
                if !known {
                    tracing::warn!(
                        edge_id = %edge.id,
                        source = %edge.source,
                        target = %edge.target,
                        "Dropping edge with a missing endpoint"
                    );
                }
                known
            })
            .map(|edge| {
                if edge.id.is_empty() {
                    let id = edge.connection().edge_id();
                    edge.with_id(id)
                } else {
                    edge
                }
            })
            .collect();

        Ok(FlowData {
            nodes,
            edges,
            viewport: self.viewport,
            groups: self.groups,
        })
    }
}

impl FlowData {
    /// Parses a flow file and types it in one step.
    pub fn from_json(json: &str) -> Result<FlowData, FlowConversionError> {
        RawFlow::from_json(json)?.into_flow()
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowConversionError> {
        RawFlow::from(self).to_json_pretty()
    }
}
