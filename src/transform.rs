//! Collapsing a selection into a composite node, and expanding it back.

use crate::error::GroupError;
use crate::graph::{
    CompositeData, Edge, GraphEvent, GraphService, Group, Node, NodeBody, NodeId, Position,
};
use ahash::AHashSet;
use itertools::Itertools;
use rand::Rng;

impl GraphService {
    /// Replaces the selected nodes with a single composite node and returns the new group id.
    ///
    /// Every edge touching the selection is removed with it. The composite keeps full
    /// snapshots of the removed nodes and edges so [`GraphService::ungroup`] can restore
    /// the nodes and the edges between them. Nothing is changed when the selection is
    /// invalid.
    pub fn create_group(
        &mut self,
        node_ids: &[&str],
        name: &str,
        description: Option<&str>,
    ) -> Result<String, GroupError> {
        let selection: Vec<&str> = node_ids.iter().copied().unique().collect();
        if selection.len() < 2 {
            return Err(GroupError::InsufficientSelection {
                selected: selection.len(),
            });
        }
        if let Some(missing) = selection.iter().find(|id| !self.contains_node(id)) {
            return Err(GroupError::UnknownNode(missing.to_string()));
        }
        let selected: AHashSet<&str> = selection.iter().copied().collect();

        let (members, kept_nodes): (Vec<Node>, Vec<Node>) = self
            .nodes
            .drain(..)
            .partition(|n| selected.contains(n.id.as_str()));
        self.nodes = kept_nodes;

        let (connections, kept_edges): (Vec<Edge>, Vec<Edge>) = self
            .edges
            .drain(..)
            .partition(|e| selected.contains(e.source.as_str()) || selected.contains(e.target.as_str()));
        self.edges = kept_edges;

        let position = Position::centroid(members.iter().map(|n| &n.position)).unwrap_or_default();
        let member_ids: Vec<NodeId> = members.iter().map(|n| n.id.clone()).collect();

        let group = Group::new(name, description.map(str::to_string), member_ids.clone());
        let group_id = group.id.clone();
        self.groups.push(group);

        let mut composite = Node::composite(
            format!("groupnode-{group_id}"),
            CompositeData {
                description: description.map(str::to_string),
                group_id: group_id.clone(),
                members,
                connections: connections.clone(),
                is_collapsed: false,
            },
        );
        composite.position = position;
        composite.data.name = Some(name.to_string());
        let composite_id = composite.id.clone();
        self.nodes.push(composite);

        for edge in connections {
            self.emit(GraphEvent::EdgeRemoved(edge.id));
        }
        for id in member_ids {
            self.emit(GraphEvent::NodeRemoved(id));
        }
        self.emit(GraphEvent::NodeAdded(composite_id.clone()));
        self.emit(GraphEvent::GroupsChanged);

        tracing::info!(
            group_id = %group_id,
            composite = %composite_id,
            nodes = selection.len(),
            "Created group"
        );
        Ok(group_id)
    }

    /// Expands a composite node back into the nodes and edges it was created from.
    pub fn ungroup(&mut self, composite_id: &str) -> Result<Vec<NodeId>, GroupError> {
        self.ungroup_with_rng(composite_id, &mut rand::rng())
    }

    /// [`GraphService::ungroup`] with a caller-supplied source of position jitter.
    ///
    /// Restored nodes are scattered within `ungroup_spread` of the composite's position.
    /// A member whose id has been reused in the meantime is skipped. Only edges between two
    /// restored members come back; edges that crossed the group boundary stay dropped.
    /// Returns the restored node ids.
    pub fn ungroup_with_rng<R: Rng + ?Sized>(
        &mut self,
        composite_id: &str,
        rng: &mut R,
    ) -> Result<Vec<NodeId>, GroupError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == composite_id)
            .ok_or_else(|| GroupError::UnknownNode(composite_id.to_string()))?;
        if self.nodes[index].as_composite().is_none() {
            return Err(GroupError::NotComposite(composite_id.to_string()));
        }
        let composite = self.nodes.remove(index);
        let origin = composite.position;
        let NodeBody::Composite(data) = composite.data.body else {
            return Err(GroupError::NotComposite(composite_id.to_string()));
        };

        let detached: Vec<Edge> = {
            let (detached, kept): (Vec<Edge>, Vec<Edge>) =
                self.edges.drain(..).partition(|e| e.touches(composite_id));
            self.edges = kept;
            detached
        };
        self.groups.retain(|g| g.id != data.group_id);

        let half = self.config().ungroup_spread / 2.0;
        let mut restored = Vec::with_capacity(data.members.len());
        for mut node in data.members {
            if self.contains_node(&node.id) {
                tracing::warn!(node_id = %node.id, "Node id is already in use; not restoring it");
                continue;
            }
            node.position = Position::new(
                origin.x + jitter(rng, half),
                origin.y + jitter(rng, half),
            );
            node.selected = false;
            restored.push(node.id.clone());
            self.nodes.push(node);
        }

        let mut restored_edges = Vec::new();
        for edge in data.connections {
            let internal = restored.contains(&edge.source) && restored.contains(&edge.target);
            if !internal || self.edge(&edge.id).is_some() {
                continue;
            }
            restored_edges.push(edge.id.clone());
            self.edges.push(edge);
        }

        for edge in detached {
            self.emit(GraphEvent::EdgeRemoved(edge.id));
        }
        self.emit(GraphEvent::NodeRemoved(composite_id.to_string()));
        for id in &restored {
            self.emit(GraphEvent::NodeAdded(id.clone()));
        }
        for id in restored_edges {
            self.emit(GraphEvent::EdgeAdded(id));
        }
        self.emit(GraphEvent::GroupsChanged);

        tracing::info!(composite = composite_id, nodes = restored.len(), "Ungrouped");
        Ok(restored)
    }
}

/// Offset in `[-half, half]`. A non-finite or non-positive `half` yields no offset.
fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f64) -> f64 {
    if half.is_finite() && half > 0.0 {
        rng.random_range(-half..=half)
    } else {
        0.0
    }
}
