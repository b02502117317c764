//! Output extraction per node shape.
mod common;
use common::*;
use flowforge::prelude::*;
use serde_json::json;

fn texts(output: Option<Output>) -> Vec<String> {
    output
        .map(Output::into_prompt_vars)
        .unwrap_or_default()
        .iter()
        .map(|v| v.text().to_string())
        .collect()
}

#[test]
fn test_table_column_carries_siblings_as_metavars() {
    let mut graph = GraphService::new();
    let table = TableData::new(
        vec![TableColumn::new("A", "A"), TableColumn::new("B", "B")],
        vec![TableRow::new(Some("r1"), [("A", "x"), ("B", "y")])],
    );
    graph.add_node(Node::table("t", table));

    let values = graph.output("t", "A").unwrap().unwrap().into_prompt_vars();
    assert_eq!(values.len(), 1);
    match &values[0] {
        PromptVar::Info(info) => {
            assert_eq!(info.text, "x");
            assert_eq!(info.metavars.len(), 1);
            assert_eq!(info.metavars.get("B").map(String::as_str), Some("y"));
            assert_eq!(info.associate_id.as_deref(), Some("r1"));
        }
        other => panic!("Expected TemplateVarInfo, got {:?}", other),
    }
}

#[test]
fn test_blank_rows_are_skipped_and_braces_escaped() {
    let mut graph = GraphService::new();
    graph.add_node(question_table("qa"));

    let values = graph.output("qa", "Question").unwrap().unwrap().into_prompt_vars();
    let texts: Vec<&str> = values.iter().map(PromptVar::text).collect();
    assert_eq!(texts, vec!["What is 2+2?", r"Name a \{color\}"]);

    // Metavars are keyed by header and are not escaped.
    assert_eq!(
        values[1].metavars().and_then(|m| m.get("Answer")).map(String::as_str),
        Some("red")
    );
}

#[test]
fn test_selected_rows_take_precedence() {
    let mut graph = GraphService::new();
    let mut node = question_table("qa");
    if let NodeBody::Table(table) = &mut node.data.body {
        table.selected_rows = Some(vec![TableRow::new(Some("q9"), [("q", "Only me"), ("a", "1")])]);
    }
    graph.add_node(node);

    assert_eq!(texts(graph.output("qa", "Question").unwrap()), vec!["Only me"]);
}

#[test]
fn test_unknown_column_is_an_error() {
    let mut graph = GraphService::new();
    graph.add_node(question_table("qa"));

    let err = graph.output("qa", "Nope").unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingTableColumn {
            node_id: "qa".to_string(),
            socket: "Nope".to_string(),
        }
    );
}

#[test]
fn test_table_without_columns_has_no_output() {
    let mut graph = GraphService::new();
    graph.add_node(Node::table("empty", TableData::default()));
    assert_eq!(graph.output("empty", "anything").unwrap(), None);
}

#[test]
fn test_project_attributes() {
    let mut graph = GraphService::new();
    let attributes = AttributeSet::new([("title", "Dune"), ("author", "Herbert")]);
    graph.add_node(Node::project("proj", attributes));

    assert_eq!(texts(graph.output("proj", "attribute-author").unwrap()), vec!["Herbert"]);
    assert_eq!(graph.output("proj", "attribute-year").unwrap(), None);
    assert_eq!(texts(graph.output("proj", "output").unwrap()), vec!["Dune", "Herbert"]);
}

#[test]
fn test_empty_attribute_resolves_to_nothing() {
    let mut graph = GraphService::new();
    graph.add_node(Node::project("proj", AttributeSet::new([("title", ""), ("author", "Herbert")])));
    graph.add_node(Node::prompt("ask", "Summarise {title}"));
    graph.connect(Connection::new("proj", "attribute-title", "ask", "title"));

    assert_eq!(graph.output("proj", "attribute-title").unwrap(), None);
    assert!(graph.pull_input_data(&vars(&["title"]), "ask").unwrap().is_empty());
}

#[test]
fn test_keyed_fields_respect_visibility() {
    let mut graph = GraphService::new();
    let fields = FieldSet::keyed([("f1", "a"), ("f2", "b"), ("f3", "c")])
        .with_visibility([("f2", false), ("f3", true)]);
    graph.add_node(Node::new(
        "tf",
        NodeKind::TextFields,
        NodeData::new(NodeBody::Fields(fields)),
    ));

    assert_eq!(texts(graph.output("tf", "output").unwrap()), vec!["a", "c"]);
}

#[test]
fn test_field_lists_are_returned_verbatim() {
    let mut graph = GraphService::new();
    let fields = FieldSet::list(["one", "two"]);
    graph.add_node(Node::new(
        "items",
        NodeKind::Items,
        NodeData::new(NodeBody::Fields(fields)),
    ));

    assert_eq!(texts(graph.output("items", "output").unwrap()), vec!["one", "two"]);
}

#[test]
fn test_inline_values_are_returned_as_is() {
    let mut graph = GraphService::new();
    let data = NodeData::default()
        .with_inline("prompt", json!("Hello {name}"))
        .with_inline("output", json!(["r1", "r2"]));
    graph.add_node(Node::new("p", NodeKind::Prompt, data));

    assert_eq!(
        graph.output("p", "prompt").unwrap(),
        Some(Output::Single(json!("Hello {name}")))
    );
    assert_eq!(texts(graph.output("p", "output").unwrap()), vec!["r1", "r2"]);
    assert_eq!(graph.output("p", "missing").unwrap(), None);
}

#[test]
fn test_missing_node_resolves_to_none() {
    let graph = GraphService::new();
    assert_eq!(graph.output("ghost", "output").unwrap(), None);
}

#[test]
fn test_resolution_is_pure() {
    let mut graph = GraphService::new();
    graph.add_node(question_table("qa"));
    let before = graph.to_flow();

    let first = graph.output("qa", "Answer").unwrap();
    let second = graph.output("qa", "Answer").unwrap();
    assert_eq!(first, second);
    assert_eq!(graph.to_flow(), before);
}
