use crate::error::ConfigError;
use crate::graph::NodeKind;
use ahash::AHashSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Node kinds whose display is recomputed when an upstream node pings them.
pub const DEFAULT_REFRESHABLE_KINDS: &[NodeKind] = &[
    NodeKind::Evaluator,
    NodeKind::Processor,
    NodeKind::Prompt,
    NodeKind::Inspect,
    NodeKind::Vis,
    NodeKind::LlmEval,
    NodeKind::TextFields,
    NodeKind::Chat,
    NodeKind::SimpleEval,
    NodeKind::Join,
    NodeKind::Split,
    NodeKind::Project,
];

/// Width of the square, centred on a composite node, in which ungrouped nodes are scattered.
pub const DEFAULT_UNGROUP_SPREAD: f64 = 200.0;

/// Tunables of the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub refreshable_kinds: AHashSet<NodeKind>,
    pub ungroup_spread: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refreshable_kinds: DEFAULT_REFRESHABLE_KINDS.iter().copied().collect(),
            ungroup_spread: DEFAULT_UNGROUP_SPREAD,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn is_refreshable(&self, kind: NodeKind) -> bool {
        self.refreshable_kinds.contains(&kind)
    }
}
