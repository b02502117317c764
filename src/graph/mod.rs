//! The node/edge data model and the service that owns it.

pub mod edge;
pub mod event;
pub mod group;
pub mod node;
pub mod payload;
pub mod service;

pub use edge::{Connection, Edge};
pub use event::{GraphEvent, GraphObserver, SubscriptionId};
pub use group::{Group, GroupUpdate};
pub use node::{Node, NodeData, NodeId, NodeKind, Position};
pub use payload::{
    AttributeSet, CompositeData, FieldSet, Fields, NodeBody, TableColumn, TableData, TableRow,
};
pub use service::{GraphService, GraphServiceBuilder};
