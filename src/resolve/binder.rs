use super::{PulledInputs, resolve_output};
use crate::error::ResolveError;
use crate::graph::GraphService;
use ahash::AHashSet;

/// Assembles the variable bindings of one node by walking its inbound edges upstream.
///
/// A binder is good for one pull: the set of variable names it has seen is shared by
/// the whole traversal, so two declarations anywhere in the upstream closure that only
/// differ by case are rejected.
pub struct InputBinder<'a> {
    graph: &'a GraphService,
    seen: AHashSet<String>,
    pulled: PulledInputs,
}

impl<'a> InputBinder<'a> {
    pub fn new(graph: &'a GraphService) -> Self {
        Self {
            graph,
            seen: AHashSet::new(),
            pulled: PulledInputs::default(),
        }
    }

    /// Binds `var_names` on `target`, then recursively the variables of every upstream
    /// node that contributed a value.
    ///
    /// Any error aborts the pull and nothing is returned.
    pub fn pull(mut self, var_names: &[String], target: &str) -> Result<PulledInputs, ResolveError> {
        self.bind(var_names, target, &[target.to_string()])?;
        tracing::debug!(
            target_node = target,
            variables = self.pulled.len(),
            "Pulled input data"
        );
        Ok(self.pulled)
    }

    fn bind(&mut self, var_names: &[String], target: &str, path: &[String]) -> Result<(), ResolveError> {
        let graph = self.graph;

        for name in var_names {
            if !self.seen.insert(name.to_lowercase()) {
                return Err(ResolveError::DuplicateVariableName { name: name.clone() });
            }

            let inbound = graph
                .edges()
                .iter()
                .filter(|e| e.target == target && e.target_handle == *name);

            for edge in inbound {
                if edge.source_handle.is_empty() {
                    continue;
                }
                let Some(output) = resolve_output(graph, &edge.source, &edge.source_handle)? else {
                    continue;
                };
                let values = output.into_prompt_vars();
                if values.is_empty() {
                    continue;
                }
                self.pulled.entry(name.clone()).or_default().extend(values);

                let Some(source) = graph.node(&edge.source) else {
                    continue;
                };
                if source.data.vars.is_empty() {
                    continue;
                }
                if path.contains(&source.id) {
                    let mut cycle = path.to_vec();
                    cycle.push(source.id.clone());
                    return Err(ResolveError::CyclicDependency {
                        node_id: source.id.clone(),
                        path: cycle,
                    });
                }

                let mut next = path.to_vec();
                next.push(source.id.clone());
                self.bind(&source.data.vars, &source.id, &next)?;
            }
        }
        Ok(())
    }
}
