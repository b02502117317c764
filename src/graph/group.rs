use super::event::GraphEvent;
use super::node::NodeId;
use super::service::GraphService;
use crate::error::GroupError;
use crate::flow::FlowData;
use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, render-level aggregation of nodes. Does not affect edges or resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub is_collapsed: bool,
}

impl Group {
    pub fn new(name: impl Into<String>, description: Option<String>, nodes: Vec<NodeId>) -> Self {
        Self {
            id: format!("group-{}", Uuid::new_v4()),
            name: name.into(),
            description,
            nodes,
            is_collapsed: false,
        }
    }
}

/// Changes applied by `GraphService::update_group`. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_collapsed: Option<bool>,
}

impl GraphService {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Records a group over `nodes` and returns its id.
    pub fn add_group(&mut self, name: &str, description: Option<&str>, nodes: &[&str]) -> String {
        let group = Group::new(
            name,
            description.map(str::to_string),
            nodes.iter().map(|id| id.to_string()).collect(),
        );
        let id = group.id.clone();
        self.groups.push(group);
        self.emit(GraphEvent::GroupsChanged);
        id
    }

    /// Adds nodes to a group; nodes already in it are not repeated.
    pub fn add_nodes_to_group(&mut self, group_id: &str, node_ids: &[&str]) -> bool {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return false;
        };
        group.nodes = group
            .nodes
            .iter()
            .cloned()
            .chain(node_ids.iter().map(|id| id.to_string()))
            .unique()
            .collect();
        self.emit(GraphEvent::GroupsChanged);
        true
    }

    pub fn remove_nodes_from_group(&mut self, group_id: &str, node_ids: &[&str]) -> bool {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return false;
        };
        group.nodes.retain(|id| !node_ids.contains(&id.as_str()));
        self.emit(GraphEvent::GroupsChanged);
        true
    }

    pub fn update_group(&mut self, group_id: &str, update: GroupUpdate) -> bool {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return false;
        };
        if let Some(name) = update.name {
            group.name = name;
        }
        if let Some(description) = update.description {
            group.description = description;
        }
        if let Some(is_collapsed) = update.is_collapsed {
            group.is_collapsed = is_collapsed;
        }
        self.emit(GraphEvent::GroupsChanged);
        true
    }

    pub fn delete_group(&mut self, group_id: &str) -> Option<Group> {
        let index = self.groups.iter().position(|g| g.id == group_id)?;
        let group = self.groups.remove(index);
        self.emit(GraphEvent::GroupsChanged);
        Some(group)
    }

    /// Selects exactly the nodes of a group.
    pub fn select_nodes_in_group(&mut self, group_id: &str) -> bool {
        let Some(members) = self.group(group_id).map(|g| g.nodes.clone()) else {
            return false;
        };
        let members: Vec<&str> = members.iter().map(String::as_str).collect();
        self.set_selected_nodes(&members);
        true
    }

    /// Copies the selected nodes, and the edges running between them, into a new flow.
    ///
    /// Edges with only one endpoint in the selection are left out. The graph itself is
    /// not modified.
    pub fn extract_selection(&self, node_ids: &[&str]) -> Result<FlowData, GroupError> {
        let selection: AHashSet<&str> = node_ids
            .iter()
            .copied()
            .unique()
            .filter(|id| self.contains_node(id))
            .collect();
        if selection.len() < 2 {
            return Err(GroupError::InsufficientSelection {
                selected: selection.len(),
            });
        }

        let nodes = self
            .nodes
            .iter()
            .filter(|n| selection.contains(n.id.as_str()))
            .cloned()
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| selection.contains(e.source.as_str()) && selection.contains(e.target.as_str()))
            .cloned()
            .collect();

        Ok(FlowData {
            nodes,
            edges,
            ..FlowData::default()
        })
    }
}
