use super::node::NodeId;

/// A structural or data change made through the `GraphService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    /// The node's data was replaced; anything derived from it must be recomputed.
    NodeDataChanged(NodeId),
    EdgeAdded(String),
    EdgeRemoved(String),
    GroupsChanged,
    SelectionChanged,
}

/// Callback invoked after every change to the graph.
pub type GraphObserver = Box<dyn Fn(&GraphEvent) + Send + Sync>;

/// Handle returned by `GraphService::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);
