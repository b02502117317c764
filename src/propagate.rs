//! Downstream invalidation.

use crate::graph::{GraphService, NodeId};

impl GraphService {
    /// Flags the direct successors of `id` whose kind is refreshable.
    ///
    /// One hop only: nodes further downstream are not touched. Returns the ids that were
    /// flagged, in edge order.
    pub fn notify_downstream(&mut self, id: &str) -> Vec<NodeId> {
        let targets: Vec<NodeId> = self
            .output_edges_for_node(id)
            .into_iter()
            .filter_map(|e| self.node(&e.target))
            .filter(|n| self.config().is_refreshable(n.kind))
            .map(|n| n.id.clone())
            .collect();

        let mut pinged = Vec::with_capacity(targets.len());
        for target in targets {
            if !pinged.contains(&target) && self.mark_refresh(&target) {
                pinged.push(target);
            }
        }
        tracing::trace!(source = id, pinged = pinged.len(), "Notified downstream nodes");
        pinged
    }
}
