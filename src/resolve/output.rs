use super::{Output, PromptVar, TemplateVarInfo};
use crate::error::ResolveError;
use crate::graph::{AttributeSet, FieldSet, Fields, GraphService, NodeBody, TableData};
use crate::template::escape_braces;

/// Computes the values a node's output socket currently produces.
///
/// Returns `Ok(None)` when the node does not exist (a dangling reference is tolerated)
/// or the socket has nothing to offer. A table socket that names no column is a wiring
/// error and is reported as [`ResolveError::MissingTableColumn`].
pub fn resolve_output(
    graph: &GraphService,
    node_id: &str,
    socket: &str,
) -> Result<Option<Output>, ResolveError> {
    let Some(node) = graph.node(node_id) else {
        tracing::debug!(node_id, "Cannot resolve output of a missing node");
        return Ok(None);
    };

    match &node.data.body {
        NodeBody::Attributes(attributes) => Ok(resolve_attributes(attributes, socket)),
        NodeBody::Table(table) => resolve_table(node_id, table, socket),
        NodeBody::Fields(fields) => Ok(Some(Output::List(resolve_fields(fields)))),
        NodeBody::Composite(_) | NodeBody::Inline => {
            Ok(node.data.inline.get(socket).cloned().map(Output::Single))
        }
    }
}

/// `attribute-<name>` selects one attribute; any other socket yields them all.
/// A missing or empty attribute yields nothing.
fn resolve_attributes(attributes: &AttributeSet, socket: &str) -> Option<Output> {
    match socket.strip_prefix(AttributeSet::SOCKET_PREFIX) {
        Some(name) => attributes
            .get(name)
            .filter(|value| !value.text().is_empty())
            .map(|value| Output::List(vec![value.clone()])),
        None => Some(Output::List(
            attributes.attributes.iter().map(|(_, v)| v.clone()).collect(),
        )),
    }
}

fn resolve_table(
    node_id: &str,
    table: &TableData,
    socket: &str,
) -> Result<Option<Output>, ResolveError> {
    // A table without columns has not been set up yet.
    if table.columns.is_empty() {
        return Ok(None);
    }

    let Some(column) = table.column_by_header(socket) else {
        tracing::warn!(node_id, socket, "No table column matches the output socket");
        return Err(ResolveError::MissingTableColumn {
            node_id: node_id.to_string(),
            socket: socket.to_string(),
        });
    };

    let values = table
        .active_rows()
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| {
            let metavars = table
                .columns
                .iter()
                .filter(|c| c.key != column.key && row.cells.contains_key(&c.key))
                .map(|c| (c.header.clone(), row.cell_text(&c.key)))
                .collect();
            PromptVar::Info(TemplateVarInfo {
                text: escape_braces(&row.cell_text(&column.key)),
                metavars,
                associate_id: row.uid.clone(),
            })
        })
        .collect();

    Ok(Some(Output::List(values)))
}

fn resolve_fields(fields: &FieldSet) -> Vec<PromptVar> {
    match &fields.fields {
        Fields::List(values) => values.clone(),
        Fields::Keyed(pairs) => pairs
            .iter()
            .filter(|(key, _)| fields.is_visible(key))
            .map(|(_, value)| value.clone())
            .collect(),
    }
}
