//! Unit tests for core FlowForge types.
mod common;
use flowforge::prelude::*;
use flowforge::template::template_vars;
use serde_json::json;

#[test]
fn test_template_vars_skip_escaped_and_settings() {
    assert_eq!(
        template_vars(r"{a} \{b\} {#c} {a} {d}"),
        vec!["a".to_string(), "d".to_string()]
    );
    assert!(template_vars("{unclosed").is_empty());
}

#[test]
fn test_prompt_var_serialization_is_untagged() {
    let text = PromptVar::from("hi");
    assert_eq!(serde_json::to_value(&text).unwrap(), json!("hi"));

    let info = PromptVar::Info(TemplateVarInfo {
        text: "Paris".to_string(),
        associate_id: Some("r1".to_string()),
        ..TemplateVarInfo::default()
    });
    let value = serde_json::to_value(&info).unwrap();
    assert_eq!(value["text"], json!("Paris"));
    assert_eq!(value["associate_id"], json!("r1"));
    assert_eq!(info.to_string(), "Paris");
}

#[test]
fn test_error_messages() {
    let err = ResolveError::CyclicDependency {
        node_id: "a".to_string(),
        path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "Variable dependency cycle through node 'a' (path: a -> b -> a)"
    );

    let err = GroupError::InsufficientSelection { selected: 1 };
    assert_eq!(err.to_string(), "Select at least 2 nodes to create a group (got 1)");
}

#[test]
fn test_edges_read_null_handles_as_empty() {
    let edge: Edge = serde_json::from_value(json!({
        "id": "e", "source": "a", "sourceHandle": null, "target": "b", "targetHandle": "v"
    }))
    .unwrap();
    assert_eq!(edge.source_handle, "");
    assert_eq!(edge.target_handle, "v");
}
