//! Typed payloads for the output shapes a node can have.

use super::edge::Edge;
use super::node::{Node, NodeData, NodeKind};
use crate::flow::RawNode;
use crate::resolve::PromptVar;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const KEY_FIELDS: &str = "fields";
const KEY_FIELDS_VISIBILITY: &str = "fields_visibility";
const KEY_COLUMNS: &str = "columns";
const KEY_ROWS: &str = "rows";
const KEY_SELECTED_ROWS: &str = "sel_rows";
const KEY_PROJECT_ATTRIBUTES: &str = "projectAttributes";
const KEY_ROW_UID: &str = "__uid";

/// The output shape of a node, which decides how its sockets are resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeBody {
    /// Named attributes, one socket per attribute (`attribute-<name>`).
    Attributes(AttributeSet),
    /// Rows and columns; each column header is a socket.
    Table(TableData),
    /// A list or keyed collection of fields, all emitted on every socket.
    Fields(FieldSet),
    /// A collapsed group of nodes and the edges that touched them.
    Composite(CompositeData),
    /// Outputs, if any, are stored inline under the socket key.
    #[default]
    Inline,
}

impl NodeBody {
    /// Picks the body for `kind` out of `map`, removing the keys it consumed.
    pub(crate) fn from_map(kind: NodeKind, map: &mut Map<String, Value>) -> NodeBody {
        match kind {
            NodeKind::Table => return NodeBody::Table(TableData::take_from(map)),
            NodeKind::Project => {
                if let Some(attributes) = AttributeSet::take_from(map) {
                    return NodeBody::Attributes(attributes);
                }
            }
            NodeKind::Group => {
                if let Some(composite) = CompositeData::take_from(map) {
                    return NodeBody::Composite(composite);
                }
            }
            _ => {}
        }

        match FieldSet::take_from(map) {
            Some(fields) => NodeBody::Fields(fields),
            None => NodeBody::Inline,
        }
    }

    pub(crate) fn write_into(&self, map: &mut Map<String, Value>) {
        match self {
            NodeBody::Attributes(attributes) => attributes.write_into(map),
            NodeBody::Table(table) => table.write_into(map),
            NodeBody::Fields(fields) => fields.write_into(map),
            NodeBody::Composite(composite) => composite.write_into(map),
            NodeBody::Inline => {}
        }
    }
}

/// A field collection: either an ordered list or ordered key/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum Fields {
    List(Vec<PromptVar>),
    Keyed(Vec<(String, PromptVar)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    pub fields: Fields,
    /// Per-key visibility for keyed fields. Only an explicit `false` hides a field.
    pub visibility: Option<AHashMap<String, bool>>,
}

impl FieldSet {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PromptVar>,
    {
        Self {
            fields: Fields::List(values.into_iter().map(Into::into).collect()),
            visibility: None,
        }
    }

    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: Fields::Keyed(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), PromptVar::Text(v.into())))
                    .collect(),
            ),
            visibility: None,
        }
    }

    pub fn with_visibility<I, K>(mut self, visibility: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        self.visibility = Some(visibility.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visibility
            .as_ref()
            .and_then(|vis| vis.get(key))
            .copied()
            .unwrap_or(true)
    }

    fn take_from(map: &mut Map<String, Value>) -> Option<FieldSet> {
        let fields = match map.remove(KEY_FIELDS)? {
            Value::Array(items) => Fields::List(items.into_iter().map(PromptVar::from_value).collect()),
            Value::Object(entries) => Fields::Keyed(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, PromptVar::from_value(v)))
                    .collect(),
            ),
            other => {
                map.insert(KEY_FIELDS.to_string(), other);
                return None;
            }
        };

        let visibility = match map.remove(KEY_FIELDS_VISIBILITY) {
            Some(Value::Object(entries)) => Some(
                entries
                    .into_iter()
                    .filter_map(|(k, v)| v.as_bool().map(|b| (k, b)))
                    .collect(),
            ),
            Some(other) => {
                map.insert(KEY_FIELDS_VISIBILITY.to_string(), other);
                None
            }
            None => None,
        };

        Some(FieldSet { fields, visibility })
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        let fields = match &self.fields {
            Fields::List(values) => Value::Array(values.iter().map(PromptVar::to_value).collect()),
            Fields::Keyed(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        };
        map.insert(KEY_FIELDS.to_string(), fields);
        if let Some(visibility) = &self.visibility {
            let visibility: Map<String, Value> = visibility
                .iter()
                .map(|(k, v)| (k.clone(), Value::Bool(*v)))
                .collect();
            map.insert(KEY_FIELDS_VISIBILITY.to_string(), Value::Object(visibility));
        }
    }
}

/// A column descriptor: `key` addresses cells, `header` is the externally visible name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub header: String,
}

impl TableColumn {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }
}

/// A table row, cells keyed by column key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    /// The row's internal id. Never treated as a cell.
    pub uid: Option<String>,
    pub cells: Map<String, Value>,
}

impl TableRow {
    pub fn new<I, K, V>(uid: Option<&str>, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            uid: uid.map(str::to_string),
            cells: cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// True when no cell holds anything but whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|cell| match cell {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
    }

    /// The cell under `key` rendered as text; empty when the cell is absent.
    pub fn cell_text(&self, key: &str) -> String {
        self.cells.get(key).map(cell_to_string).unwrap_or_default()
    }

    fn from_value(value: Value) -> Option<TableRow> {
        let Value::Object(mut cells) = value else {
            return None;
        };
        let uid = cells.remove(KEY_ROW_UID).and_then(|uid| match uid {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        Some(TableRow { uid, cells })
    }

    fn to_value(&self) -> Value {
        let mut cells = self.cells.clone();
        if let Some(uid) = &self.uid {
            cells.insert(KEY_ROW_UID.to_string(), Value::String(uid.clone()));
        }
        Value::Object(cells)
    }
}

pub(crate) fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
    /// A user-selected subset of rows; when present it is emitted instead of `rows`.
    pub selected_rows: Option<Vec<TableRow>>,
}

impl TableData {
    pub fn new(columns: Vec<TableColumn>, rows: Vec<TableRow>) -> Self {
        Self {
            columns,
            rows,
            selected_rows: None,
        }
    }

    pub fn active_rows(&self) -> &[TableRow] {
        self.selected_rows.as_deref().unwrap_or(&self.rows)
    }

    pub fn column_by_header(&self, header: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.header == header)
    }

    fn take_from(map: &mut Map<String, Value>) -> TableData {
        let columns = match map.remove(KEY_COLUMNS) {
            Some(value) => match serde_json::from_value::<Vec<TableColumn>>(value.clone()) {
                Ok(columns) => columns,
                Err(e) => {
                    tracing::warn!(error = %e, "Table columns are malformed; keeping them inline");
                    map.insert(KEY_COLUMNS.to_string(), value);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let rows = take_rows(map, KEY_ROWS).unwrap_or_default();
        let selected_rows = take_rows(map, KEY_SELECTED_ROWS);

        TableData {
            columns,
            rows,
            selected_rows,
        }
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        let columns = self
            .columns
            .iter()
            .map(|c| json!({ "key": c.key, "header": c.header }))
            .collect();
        map.insert(KEY_COLUMNS.to_string(), Value::Array(columns));
        map.insert(
            KEY_ROWS.to_string(),
            Value::Array(self.rows.iter().map(TableRow::to_value).collect()),
        );
        if let Some(selected) = &self.selected_rows {
            map.insert(
                KEY_SELECTED_ROWS.to_string(),
                Value::Array(selected.iter().map(TableRow::to_value).collect()),
            );
        }
    }
}

fn take_rows(map: &mut Map<String, Value>, key: &str) -> Option<Vec<TableRow>> {
    match map.remove(key)? {
        Value::Array(items) => Some(items.into_iter().filter_map(TableRow::from_value).collect()),
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Named attributes of a record-selector node, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeSet {
    pub attributes: Vec<(String, PromptVar)>,
}

impl AttributeSet {
    pub const SOCKET_PREFIX: &'static str = "attribute-";

    pub fn new<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PromptVar>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PromptVar> {
        self.attributes
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    fn take_from(map: &mut Map<String, Value>) -> Option<AttributeSet> {
        match map.remove(KEY_PROJECT_ATTRIBUTES)? {
            Value::Object(entries) => Some(AttributeSet {
                attributes: entries
                    .into_iter()
                    .map(|(k, v)| (k, PromptVar::from_value(v)))
                    .collect(),
            }),
            other => {
                map.insert(KEY_PROJECT_ATTRIBUTES.to_string(), other);
                None
            }
        }
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        let attributes: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect();
        map.insert(KEY_PROJECT_ATTRIBUTES.to_string(), Value::Object(attributes));
    }
}

/// The payload of a composite node: everything needed to expand it again.
///
/// The group's name is the composite node's own `NodeData::name`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeData {
    pub description: Option<String>,
    /// Id of the render-level group record created alongside this node.
    pub group_id: String,
    /// Full snapshots of the collapsed nodes.
    pub members: Vec<Node>,
    /// Every edge that touched a collapsed node when the group was created.
    pub connections: Vec<Edge>,
    pub is_collapsed: bool,
}

impl CompositeData {
    /// Human-readable lines describing the contained nodes and their connections.
    ///
    /// Empty while the composite is collapsed. Connections are only listed when both
    /// endpoints are members.
    pub fn summary(&self) -> Vec<String> {
        if self.is_collapsed {
            return Vec::new();
        }

        let label = |node: &Node| {
            node.data
                .name
                .clone()
                .unwrap_or_else(|| format!("{} Node", node.kind))
        };
        let member = |id: &str| self.members.iter().find(|n| n.id == id);

        let mut lines = vec!["Contained Nodes:".to_string()];
        lines.extend(self.members.iter().map(|n| format!("• {}", label(n))));

        let connections: Vec<String> = self
            .connections
            .iter()
            .filter_map(|e| match (member(&e.source), member(&e.target)) {
                (Some(source), Some(target)) => {
                    Some(format!("• {} → {}", label(source), label(target)))
                }
                _ => None,
            })
            .collect();
        if !connections.is_empty() {
            lines.push("Connections:".to_string());
            lines.extend(connections);
        }
        lines
    }

    fn take_from(map: &mut Map<String, Value>) -> Option<CompositeData> {
        if !matches!(map.get("nodes"), Some(Value::Array(_))) {
            return None;
        }
        let Some(Value::Array(summaries)) = map.remove("nodes") else {
            return None;
        };
        let connections_value = map.remove("connections");
        let snapshot = map.remove("snapshot");
        let description = match map.remove("description") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let group_id = match map.remove("groupId") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let is_collapsed = map
            .remove("isCollapsed")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let (members, connections) = match snapshot {
            Some(snapshot) => members_from_snapshot(snapshot),
            None => (
                members_from_summaries(summaries),
                connections_from_summaries(connections_value),
            ),
        };

        Some(CompositeData {
            description,
            group_id,
            members,
            connections,
            is_collapsed,
        })
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        let summaries: Vec<Value> = self
            .members
            .iter()
            .map(|n| json!({ "id": n.id, "type": n.kind.type_name(), "name": n.display_name() }))
            .collect();
        let connections: Vec<Value> = self
            .connections
            .iter()
            .map(|e| {
                json!({
                    "source": e.source,
                    "target": e.target,
                    "sourceHandle": e.source_handle,
                    "targetHandle": e.target_handle,
                })
            })
            .collect();
        let snapshot = json!({
            "nodes": self.members.iter().map(RawNode::from).collect::<Vec<_>>(),
            "edges": self.connections,
        });

        map.insert("nodes".to_string(), Value::Array(summaries));
        map.insert("connections".to_string(), Value::Array(connections));
        map.insert("snapshot".to_string(), snapshot);
        map.insert("groupId".to_string(), Value::String(self.group_id.clone()));
        map.insert("isCollapsed".to_string(), Value::Bool(self.is_collapsed));
        if let Some(description) = &self.description {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
    }
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<Edge>,
}

fn members_from_snapshot(snapshot: Value) -> (Vec<Node>, Vec<Edge>) {
    match serde_json::from_value::<Snapshot>(snapshot) {
        Ok(snapshot) => {
            let members = snapshot
                .nodes
                .into_iter()
                .filter_map(|raw| match raw.into_node() {
                    Ok(node) => Some(node),
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping unreadable composite member");
                        None
                    }
                })
                .collect();
            (members, snapshot.edges)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Composite snapshot is malformed");
            (Vec::new(), Vec::new())
        }
    }
}

#[derive(Deserialize)]
struct MemberSummary {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    name: Option<String>,
}

/// Rebuilds members from `{id, type, name}` summaries. Only identity and label survive.
fn members_from_summaries(summaries: Vec<Value>) -> Vec<Node> {
    summaries
        .into_iter()
        .filter_map(|v| serde_json::from_value::<MemberSummary>(v).ok())
        .filter_map(|summary| {
            let kind = NodeKind::from_type_name(&summary.node_type)?;
            let data = NodeData {
                name: summary.name,
                ..NodeData::default()
            };
            Some(Node::new(summary.id, kind, data))
        })
        .collect()
}

fn connections_from_summaries(value: Option<Value>) -> Vec<Edge> {
    let Some(value) = value else {
        return Vec::new();
    };
    match serde_json::from_value::<Vec<Edge>>(value) {
        Ok(edges) => edges
            .into_iter()
            .map(|e| {
                if e.id.is_empty() {
                    let id = format!("{}-{}", e.source, e.target);
                    e.with_id(id)
                } else {
                    e
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Composite connections are malformed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rows_ignore_uid() {
        let row = TableRow::new(Some("r1"), [("a", " "), ("b", "")]);
        assert!(row.is_blank());
        let row = TableRow::new(Some("r2"), [("a", " "), ("b", "x")]);
        assert!(!row.is_blank());
    }

    #[test]
    fn field_visibility_defaults_to_visible() {
        let fields = FieldSet::keyed([("f1", "a"), ("f2", "b")]).with_visibility([("f2", false)]);
        assert!(fields.is_visible("f1"));
        assert!(!fields.is_visible("f2"));
    }

    #[test]
    fn collapsed_composite_has_no_summary() {
        let composite = CompositeData {
            is_collapsed: true,
            ..CompositeData::default()
        };
        assert!(composite.summary().is_empty());
    }
}
