use super::edge::{Connection, Edge};
use super::event::{GraphEvent, GraphObserver, SubscriptionId};
use super::group::Group;
use super::node::{Node, NodeData, NodeId, NodeKind, Position};
use crate::config::EngineConfig;
use crate::error::ResolveError;
use crate::flow::{FlowData, Viewport};
use crate::resolve::{InputBinder, Output, PulledInputs, resolve_output};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Node kinds that remember which node feeds them when an edge is connected.
const INPUT_TRACKING_KINDS: &[NodeKind] = &[NodeKind::Vis, NodeKind::Inspect, NodeKind::SimpleEval];

/// Owns the node and edge collections and is the only way to mutate them.
///
/// Every mutation is synchronous and completes before returning. Observers registered
/// with [`GraphService::subscribe`] are told about each change after it has been applied.
pub struct GraphService {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) groups: Vec<Group>,
    viewport: Viewport,
    config: EngineConfig,
    observers: Vec<(SubscriptionId, GraphObserver)>,
    next_subscription: u64,
}

impl fmt::Debug for GraphService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphService")
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edges.len())
            .field("group_count", &self.groups.len())
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

impl Default for GraphService {
    fn default() -> Self {
        Self::new()
    }
}

pub struct GraphServiceBuilder {
    config: EngineConfig,
    flow: FlowData,
}

impl GraphServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            flow: FlowData::default(),
        }
    }
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
    pub fn with_refreshable_kind(mut self, kind: NodeKind) -> Self {
        self.config.refreshable_kinds.insert(kind);
        self
    }
    pub fn without_refreshable_kind(mut self, kind: NodeKind) -> Self {
        self.config.refreshable_kinds.remove(&kind);
        self
    }
    pub fn with_ungroup_spread(mut self, spread: f64) -> Self {
        self.config.ungroup_spread = spread;
        self
    }
    pub fn with_flow(mut self, flow: FlowData) -> Self {
        self.flow = flow;
        self
    }
    pub fn build(self) -> GraphService {
        GraphService {
            nodes: self.flow.nodes,
            edges: self.flow.edges,
            groups: self.flow.groups,
            viewport: self.flow.viewport,
            config: self.config,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl Default for GraphServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphService {
    pub fn new() -> Self {
        GraphServiceBuilder::new().build()
    }

    pub fn builder() -> GraphServiceBuilder {
        GraphServiceBuilder::new()
    }

    pub fn from_flow(flow: FlowData) -> Self {
        GraphServiceBuilder::new().with_flow(flow).build()
    }

    /// A copy of the full graph state, for persistence or diffing.
    pub fn to_flow(&self) -> FlowData {
        FlowData {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            viewport: self.viewport,
            groups: self.groups.clone(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // --- Observers ---

    pub fn subscribe(&mut self, observer: impl Fn(&GraphEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub(crate) fn emit(&self, event: GraphEvent) {
        for (_, observer) in &self.observers {
            observer(&event);
        }
    }

    // --- Nodes ---

    /// Inserts a node. Returns `false`, leaving the graph untouched, if the id is taken.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.contains_node(&node.id) {
            tracing::warn!(node_id = %node.id, "Refusing to add a node with a duplicate id");
            return false;
        }
        let id = node.id.clone();
        self.nodes.push(node);
        self.emit(GraphEvent::NodeAdded(id));
        true
    }

    /// Removes a node together with every edge attached to it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);

        let (detached, kept): (Vec<Edge>, Vec<Edge>) =
            self.edges.drain(..).partition(|e| e.touches(id));
        self.edges = kept;

        for edge in detached {
            self.emit(GraphEvent::EdgeRemoved(edge.id));
        }
        self.emit(GraphEvent::NodeRemoved(node.id.clone()));
        Some(node)
    }

    /// A deep copy of a node with a fresh id, shifted by `offset`. Not inserted.
    pub fn duplicate_node(&self, id: &str, offset: Position) -> Option<Node> {
        let mut duplicate = self.node(id)?.clone();
        duplicate.id = format!("{}-{}", duplicate.kind, Uuid::new_v4());
        duplicate.position.x += offset.x;
        duplicate.position.y += offset.y;
        duplicate.selected = false;
        Some(duplicate)
    }

    /// Replaces a node's data in place and notifies observers.
    pub fn update_node_data(&mut self, id: &str, update: impl FnOnce(&mut NodeData)) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            tracing::debug!(node_id = %id, "Ignoring data update for a missing node");
            return false;
        };
        update(&mut node.data);
        self.emit(GraphEvent::NodeDataChanged(id.to_string()));
        true
    }

    /// Merges loosely typed properties into a node's data.
    ///
    /// Keys the node understands (`vars`, `refresh`, `fields`, `rows`, ...) are re-typed,
    /// all others are stored inline. The node ends up with a freshly built data value.
    pub fn set_data_props(&mut self, id: &str, props: Map<String, Value>) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            tracing::debug!(node_id = %id, "Ignoring data props for a missing node");
            return false;
        };
        let mut merged = node.data.to_map();
        merged.extend(props);
        node.data = NodeData::from_map(node.kind, merged);
        self.emit(GraphEvent::NodeDataChanged(id.to_string()));
        true
    }

    // --- Edges ---

    /// Connects two sockets and returns the edge id.
    ///
    /// A no-op returning `None` when either endpoint is missing. Connecting the same
    /// sockets twice yields the existing edge.
    pub fn connect(&mut self, connection: Connection) -> Option<String> {
        let Some(target_kind) = self.node(&connection.target).map(|n| n.kind) else {
            tracing::debug!(target = %connection.target, "Ignoring connection to a missing node");
            return None;
        };
        if !self.contains_node(&connection.source) {
            tracing::debug!(source = %connection.source, "Ignoring connection from a missing node");
            return None;
        }

        if INPUT_TRACKING_KINDS.contains(&target_kind) {
            let mut props = Map::new();
            props.insert("input".to_string(), Value::String(connection.source.clone()));
            self.set_data_props(&connection.target, props);
        }
        if self.config.is_refreshable(target_kind) {
            self.mark_refresh(&connection.target);
        }

        if let Some(existing) = self.edges.iter().find(|e| e.connection() == connection) {
            return Some(existing.id.clone());
        }
        let edge = connection.into_edge();
        let id = edge.id.clone();
        self.edges.push(edge);
        self.emit(GraphEvent::EdgeAdded(id.clone()));
        Some(id)
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == id)?;
        let edge = self.edges.remove(index);
        self.emit(GraphEvent::EdgeRemoved(edge.id.clone()));
        Some(edge)
    }

    pub fn input_edges_for_node(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target == id).collect()
    }

    pub fn output_edges_for_node(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == id).collect()
    }

    /// Kinds of the nodes wired directly into any of `handles` on `id`.
    pub fn immediate_input_node_kinds(&self, handles: &[&str], id: &str) -> Vec<NodeKind> {
        self.edges
            .iter()
            .filter(|e| e.target == id && handles.contains(&e.target_handle.as_str()))
            .filter_map(|e| self.node(&e.source).map(|n| n.kind))
            .collect()
    }

    pub(crate) fn mark_refresh(&mut self, id: &str) -> bool {
        self.update_node_data(id, |data| data.refresh = true)
    }

    // --- Selection ---

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id.clone())
            .collect()
    }

    /// Selects exactly the given nodes.
    pub fn set_selected_nodes(&mut self, ids: &[&str]) {
        for node in &mut self.nodes {
            node.selected = ids.contains(&node.id.as_str());
        }
        self.emit(GraphEvent::SelectionChanged);
    }

    pub fn select_only(&mut self, id: &str) {
        self.set_selected_nodes(&[id]);
    }

    pub fn deselect_all(&mut self) {
        self.set_selected_nodes(&[]);
    }

    // --- Resolution ---

    /// What the socket `socket` of node `id` currently produces. `Ok(None)` if the node is missing.
    pub fn output(&self, id: &str, socket: &str) -> Result<Option<Output>, ResolveError> {
        resolve_output(self, id, socket)
    }

    /// Binds `var_names` on node `id`, recursing through upstream nodes' own variables.
    pub fn pull_input_data(&self, var_names: &[String], id: &str) -> Result<PulledInputs, ResolveError> {
        InputBinder::new(self).pull(var_names, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn observers_see_changes_until_unsubscribed() {
        let mut graph = GraphService::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = graph.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        graph.add_node(Node::text_fields("t1", [("f1", "hello")]));
        assert!(graph.unsubscribe(sub));
        graph.remove_node("t1");

        let events = events.lock().unwrap();
        assert_eq!(*events, vec![GraphEvent::NodeAdded("t1".to_string())]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut graph = GraphService::new();
        assert!(graph.add_node(Node::text_fields("t1", [("f1", "a")])));
        assert!(!graph.add_node(Node::text_fields("t1", [("f1", "b")])));
        assert_eq!(graph.nodes().len(), 1);
    }
}
