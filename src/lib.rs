//! # FlowForge - Graph Resolution Engine for Prompt Flows
//!
//! **FlowForge** owns the node/edge graph behind a node-based prompt editor and answers the
//! one question every node asks before it runs: *which values are bound to my template
//! variables right now?* Resolution is pull-based and always reads the current graph, so
//! nothing has to be recomputed eagerly when an upstream node changes.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Flow**: Parse a saved flow with `FlowData::from_json`, or implement the
//!     `IntoFlow` trait to translate your own format into the typed model.
//! 2.  **Build the Service**: Use `GraphService::builder` to combine the flow with an
//!     `EngineConfig`. The service is the only owner of nodes, edges and groups.
//! 3.  **Resolve**: Call `GraphService::output` for one socket, or
//!     `GraphService::pull_input_data` to bind a node's variables through the whole
//!     upstream closure.
//! 4.  **Edit**: Connect sockets, merge data, ping downstream nodes, and collapse or expand
//!     groups. Observers registered with `GraphService::subscribe` see every change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowforge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut graph = GraphService::builder().build();
//!
//!     graph.add_node(Node::text_fields("cities", [("f1", "Paris"), ("f2", "Tokyo")]));
//!     graph.add_node(Node::prompt("ask", "What is the population of {city}?"));
//!     graph.connect(Connection::new("cities", "output", "ask", "city"));
//!
//!     let vars = graph.node("ask").map(|n| n.data.vars.clone()).unwrap_or_default();
//!     let pulled = graph.pull_input_data(&vars, "ask")?;
//!     for value in &pulled["city"] {
//!         println!("city = {}", value);
//!     }
//!
//!     // Collapse both nodes into one composite, then expand it again.
//!     let group_id = graph.create_group(&["cities", "ask"], "Population", None)?;
//!     graph.ungroup(&format!("groupnode-{group_id}"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod flow;
pub mod graph;
pub mod palette;
pub mod prelude;
pub mod propagate;
pub mod resolve;
pub mod template;
pub mod transform;
