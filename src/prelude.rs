//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowforge crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowforge::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/flow.cforge")?;
//! let config = EngineConfig::from_file("path/to/config.json")?;
//!
//! let graph = GraphService::builder()
//!     .with_config(config)
//!     .with_flow(FlowData::from_json(&json)?)
//!     .build();
//!
//! if let Some(output) = graph.output("table-1", "Question")? {
//!     println!("{:?}", output.into_prompt_vars());
//! }
//! # Ok(())
//! # }
//! ```

// Graph service and data model
pub use crate::graph::{
    Connection, Edge, GraphEvent, GraphService, GraphServiceBuilder, Group, GroupUpdate, Node,
    NodeData, NodeId, NodeKind, Position,
};
pub use crate::graph::{AttributeSet, CompositeData, FieldSet, NodeBody, TableColumn, TableData, TableRow};

// Flow interchange
pub use crate::flow::{FlowData, IntoFlow, RawFlow, Viewport};

// Resolution values
pub use crate::resolve::{Output, PromptVar, PulledInputs, TemplateVarInfo};

// Configuration
pub use crate::config::EngineConfig;
pub use crate::palette::ColorRegistry;

// Error types
pub use crate::error::{ConfigError, FlowConversionError, GroupError, ResolveError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
