use thiserror::Error;

/// Errors raised while resolving node outputs or binding template variables.
///
/// Any of these aborts the whole pull: no partially bound variable map is ever
/// handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "Variable name '{name}' is declared more than once (names are compared case-insensitively). Rename one of the variables and try again."
    )]
    DuplicateVariableName { name: String },

    #[error("Table node '{node_id}' has no column with header '{socket}'")]
    MissingTableColumn { node_id: String, socket: String },

    #[error("Variable dependency cycle through node '{node_id}' (path: {})", .path.join(" -> "))]
    CyclicDependency { node_id: String, path: Vec<String> },
}

/// Errors that can occur while collapsing or expanding node groups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("Select at least 2 nodes to create a group (got {selected})")]
    InsufficientSelection { selected: usize },

    #[error("Node '{0}' not found in the graph")]
    UnknownNode(String),

    #[error("Node '{0}' is not a composite group node")]
    NotComposite(String),
}

/// Errors that can occur when converting an external flow format into a `FlowData`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Failed to parse flow JSON: {0}")]
    Json(String),

    #[error("Node '{node_id}' has an unregistered node type: '{type_name}'")]
    InvalidNodeType { node_id: String, type_name: String },

    #[error("Node id '{0}' appears more than once")]
    DuplicateNodeId(String),

    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors that can occur while loading an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
