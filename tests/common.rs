//! Common test utilities for building graphs and flows.
use flowforge::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Owned variable names, as `pull_input_data` takes them.
#[allow(dead_code)]
pub fn vars(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// A deterministic rng for group expansion.
#[allow(dead_code)]
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A text fields node that declares its own template variables.
#[allow(dead_code)]
pub fn templated_fields(id: &str, fields: &[(&str, &str)], declared: &[&str]) -> Node {
    let body = NodeBody::Fields(FieldSet::keyed(fields.iter().copied()));
    Node::new(
        id,
        NodeKind::TextFields,
        NodeData::new(body).with_vars(declared.iter().copied()),
    )
}

/// A table node with `Question` and `Answer` columns.
///
/// Rows: `(q1, "What is 2+2?", "4")`, a blank row, `(q3, "Name a {color}", "red")`.
#[allow(dead_code)]
pub fn question_table(id: &str) -> Node {
    let table = TableData::new(
        vec![
            TableColumn::new("q", "Question"),
            TableColumn::new("a", "Answer"),
        ],
        vec![
            TableRow::new(Some("q1"), [("q", "What is 2+2?"), ("a", "4")]),
            TableRow::new(Some("q2"), [("q", ""), ("a", "  ")]),
            TableRow::new(Some("q3"), [("q", "Name a {color}"), ("a", "red")]),
        ],
    );
    Node::table(id, table)
}

/// `cities` (text fields) -> `ask` (prompt over `{city}`), positioned for grouping.
#[allow(dead_code)]
pub fn cities_and_prompt() -> GraphService {
    let mut graph = GraphService::new();
    graph.add_node(Node::text_fields("cities", [("f1", "Paris"), ("f2", "Tokyo")]).at(0.0, 0.0));
    graph.add_node(Node::prompt("ask", "Population of {city}?").at(200.0, 100.0));
    graph.connect(Connection::new("cities", "output", "ask", "city"));
    graph
}

/// A saved flow in the editor's JSON shape: a table and a text fields node feed a
/// prompt, and the prompt feeds an inspector.
#[allow(dead_code)]
pub const QA_FLOW_JSON: &str = r#"
{
  "nodes": [
    {
      "id": "table-1",
      "type": "table",
      "position": { "x": 0, "y": 0 },
      "data": {
        "columns": [
          { "key": "c0", "header": "question" },
          { "key": "c1", "header": "topic" }
        ],
        "rows": [
          { "__uid": "r1", "c0": "Who wrote Hamlet?", "c1": "literature" },
          { "__uid": "r2", "c0": "", "c1": "" },
          { "__uid": "r3", "c0": "What is {x}?", "c1": "math" }
        ]
      }
    },
    {
      "id": "tf-1",
      "type": "textfields",
      "position": { "x": 0, "y": 300 },
      "data": {
        "fields": { "f1": "concise", "f2": "verbose" },
        "fields_visibility": { "f2": false }
      }
    },
    {
      "id": "prompt-1",
      "type": "prompt",
      "position": { "x": 400, "y": 150 },
      "data": {
        "prompt": "Answer {question} in a {style} way",
        "vars": ["question", "style"],
        "n": 1
      }
    },
    {
      "id": "inspect-1",
      "type": "inspect",
      "position": { "x": 800, "y": 150 },
      "data": {}
    }
  ],
  "edges": [
    { "id": "e1", "source": "table-1", "sourceHandle": "question", "target": "prompt-1", "targetHandle": "question" },
    { "id": "e2", "source": "tf-1", "sourceHandle": "output", "target": "prompt-1", "targetHandle": "style" },
    { "source": "prompt-1", "sourceHandle": "prompt", "target": "inspect-1", "targetHandle": "input" },
    { "id": "dangling", "source": "ghost", "sourceHandle": "output", "target": "prompt-1", "targetHandle": "style" }
  ],
  "viewport": { "x": 10, "y": 20, "zoom": 0.75 },
  "groups": []
}
"#;
