//! Graph service mutations, selection, render groups and refresh pings.
mod common;
use common::*;
use flowforge::prelude::*;
use serde_json::{Map, Value, json};

#[test]
fn test_connect_tracks_input_and_pings_refreshable_targets() {
    let mut graph = GraphService::new();
    graph.add_node(Node::text_fields("tf", [("f1", "a")]));
    graph.add_node(Node::new("vis", NodeKind::Vis, NodeData::default()));
    graph.add_node(Node::table("tab", TableData::default()));

    let edge_id = graph.connect(Connection::new("tf", "output", "vis", "input")).unwrap();
    assert_eq!(edge_id, "reactflow__edge-tfoutput-visinput");

    let vis = graph.node("vis").unwrap();
    assert_eq!(vis.data.inline.get("input"), Some(&json!("tf")));
    assert!(vis.data.refresh);

    graph.connect(Connection::new("tf", "output", "tab", "x"));
    assert!(!graph.node("tab").unwrap().data.refresh);
    assert!(graph.node("tab").unwrap().data.inline.get("input").is_none());
}

#[test]
fn test_connect_is_idempotent_and_ignores_missing_endpoints() {
    let mut graph = cities_and_prompt();
    let again = graph.connect(Connection::new("cities", "output", "ask", "city"));
    assert_eq!(again.as_deref(), Some("reactflow__edge-citiesoutput-askcity"));
    assert_eq!(graph.edges().len(), 1);

    assert_eq!(graph.connect(Connection::new("ghost", "output", "ask", "city")), None);
    assert_eq!(graph.connect(Connection::new("cities", "output", "ghost", "x")), None);
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn test_remove_node_drops_incident_edges() {
    let mut graph = cities_and_prompt();
    let removed = graph.remove_node("cities").unwrap();
    assert_eq!(removed.id, "cities");
    assert!(graph.edges().is_empty());
    assert!(graph.remove_node("cities").is_none());
}

#[test]
fn test_edge_queries() {
    let mut graph = cities_and_prompt();
    graph.add_node(Node::new("view", NodeKind::Inspect, NodeData::default()));
    graph.connect(Connection::new("ask", "prompt", "view", "input"));

    assert_eq!(graph.input_edges_for_node("ask").len(), 1);
    assert_eq!(graph.output_edges_for_node("ask").len(), 1);
    assert_eq!(
        graph.immediate_input_node_kinds(&["city"], "ask"),
        vec![NodeKind::TextFields]
    );
    assert!(graph.immediate_input_node_kinds(&["other"], "ask").is_empty());

    let edge_id = graph.output_edges_for_node("ask")[0].id.clone();
    assert!(graph.remove_edge(&edge_id).is_some());
    assert!(graph.output_edges_for_node("ask").is_empty());
}

#[test]
fn test_set_data_props_merges_and_retypes() {
    let mut graph = GraphService::new();
    graph.add_node(Node::prompt("p", "{a}"));

    let mut props = Map::new();
    props.insert("fields".to_string(), json!(["r1", "r2"]));
    props.insert("refresh".to_string(), Value::Bool(true));
    props.insert("n".to_string(), json!(3));
    assert!(graph.set_data_props("p", props));

    let data = &graph.node("p").unwrap().data;
    assert!(data.refresh);
    assert_eq!(data.vars, vec!["a".to_string()]);
    assert_eq!(data.inline.get("prompt"), Some(&json!("{a}")));
    assert_eq!(data.inline.get("n"), Some(&json!(3)));
    assert!(matches!(data.body, NodeBody::Fields(_)));

    assert!(!graph.set_data_props("ghost", Map::new()));
}

#[test]
fn test_duplicate_node_gets_fresh_id() {
    let graph = cities_and_prompt();
    let copy = graph.duplicate_node("cities", Position::new(10.0, 20.0)).unwrap();

    assert_ne!(copy.id, "cities");
    assert!(copy.id.starts_with("textfields-"));
    assert_eq!(copy.position, Position::new(10.0, 20.0));
    assert_eq!(copy.data, graph.node("cities").unwrap().data);
    assert!(!graph.contains_node(&copy.id));
}

#[test]
fn test_selection() {
    let mut graph = cities_and_prompt();
    graph.set_selected_nodes(&["cities", "ask"]);
    assert_eq!(graph.selected_nodes(), vec!["cities".to_string(), "ask".to_string()]);

    graph.select_only("ask");
    assert_eq!(graph.selected_nodes(), vec!["ask".to_string()]);

    graph.deselect_all();
    assert!(graph.selected_nodes().is_empty());
}

#[test]
fn test_render_groups() {
    let mut graph = cities_and_prompt();
    let id = graph.add_group("Inputs", None, &["cities"]);

    assert!(graph.add_nodes_to_group(&id, &["cities", "ask"]));
    assert_eq!(graph.group(&id).unwrap().nodes, vec!["cities".to_string(), "ask".to_string()]);

    assert!(graph.remove_nodes_from_group(&id, &["cities"]));
    assert_eq!(graph.group(&id).unwrap().nodes, vec!["ask".to_string()]);

    assert!(graph.update_group(
        &id,
        GroupUpdate {
            name: Some("Prompts".to_string()),
            is_collapsed: Some(true),
            ..GroupUpdate::default()
        }
    ));
    let group = graph.group(&id).unwrap();
    assert_eq!(group.name, "Prompts");
    assert!(group.is_collapsed);

    assert!(graph.select_nodes_in_group(&id));
    assert_eq!(graph.selected_nodes(), vec!["ask".to_string()]);

    // Render groups never touch edges.
    assert_eq!(graph.edges().len(), 1);
    assert!(graph.delete_group(&id).is_some());
    assert!(!graph.update_group(&id, GroupUpdate::default()));
}

#[test]
fn test_extract_selection_keeps_internal_edges_only() {
    let mut graph = cities_and_prompt();
    graph.add_node(Node::new("view", NodeKind::Inspect, NodeData::default()));
    graph.connect(Connection::new("ask", "prompt", "view", "input"));

    let flow = graph.extract_selection(&["cities", "ask"]).unwrap();
    assert_eq!(flow.nodes.len(), 2);
    assert_eq!(flow.edges.len(), 1);
    assert_eq!(flow.edges[0].target, "ask");
    assert_eq!(graph.nodes().len(), 3);

    assert_eq!(
        graph.extract_selection(&["view"]),
        Err(GroupError::InsufficientSelection { selected: 1 })
    );
}

#[test]
fn test_extract_selection_counts_distinct_existing_nodes() {
    let graph = cities_and_prompt();

    assert_eq!(
        graph.extract_selection(&["cities", "cities"]),
        Err(GroupError::InsufficientSelection { selected: 1 })
    );
    assert_eq!(
        graph.extract_selection(&["ghost1", "ghost2"]),
        Err(GroupError::InsufficientSelection { selected: 0 })
    );

    let flow = graph.extract_selection(&["cities", "ask", "ask", "ghost"]).unwrap();
    assert_eq!(flow.nodes.len(), 2);
    assert_eq!(flow.edges.len(), 1);
}

#[test]
fn test_notify_downstream_is_one_hop() {
    let mut graph = GraphService::new();
    graph.add_node(Node::text_fields("a", [("f1", "x")]));
    graph.add_node(Node::prompt("b", "{v}"));
    graph.add_node(Node::new("c", NodeKind::Inspect, NodeData::default()));
    graph.connect(Connection::new("a", "output", "b", "v"));
    graph.connect(Connection::new("b", "prompt", "c", "input"));
    for id in ["b", "c"] {
        graph.update_node_data(id, |data| data.refresh = false);
    }

    assert_eq!(graph.notify_downstream("a"), vec!["b".to_string()]);
    assert!(graph.node("b").unwrap().data.refresh);
    assert!(!graph.node("c").unwrap().data.refresh);
}

#[test]
fn test_refreshable_kinds_come_from_config() {
    let mut graph = GraphService::builder()
        .without_refreshable_kind(NodeKind::Prompt)
        .with_refreshable_kind(NodeKind::Table)
        .build();
    graph.add_node(Node::text_fields("a", [("f1", "x")]));
    graph.add_node(Node::prompt("p", "{v}"));
    graph.add_node(Node::table("t", TableData::default()));
    graph.connect(Connection::new("a", "output", "p", "v"));
    graph.connect(Connection::new("a", "output", "t", "v"));

    assert!(!graph.node("p").unwrap().data.refresh);
    assert!(graph.node("t").unwrap().data.refresh);
}

#[test]
fn test_color_registry_is_instance_scoped() {
    let mut rng = seeded_rng();
    let mut first = ColorRegistry::default();
    let second = ColorRegistry::default();

    let color = first.get_or_assign("gpt-4", &mut rng);
    assert_eq!(first.get("gpt-4"), Some(color.as_str()));
    assert!(second.get("gpt-4").is_none());

    first.set("gpt-4", "#123456");
    assert_eq!(first.get("gpt-4"), Some("#123456"));
}
