//! Persisted script documents.

use crate::error::DocumentError;
use crate::graph::{Edge, Node, ScriptGraph};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// File extension for saved scripts.
pub const SCRIPT_FILE_EXTENSION: &str = "script.json";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScriptMetadata {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// A paused script is kept but not run by the swarm.
    #[serde(default)]
    pub paused: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for ScriptMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: "Untitled Script".into(),
            description: String::new(),
            paused: false,
            created: now,
            modified: now,
        }
    }
}

/// What gets handed to the persistence collaborator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScriptDocument {
    pub version: u32,
    pub metadata: ScriptMetadata,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl ScriptDocument {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(metadata: ScriptMetadata, graph: &ScriptGraph) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            metadata,
            nodes: graph.nodes.values().cloned().collect(),
            edges: graph.edges.clone(),
        }
    }

    pub fn graph(&self) -> ScriptGraph {
        ScriptGraph {
            nodes: self.nodes.iter().map(|n| (n.id, n.clone())).collect(),
            edges: self.edges.clone(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: ScriptDocument = serde_json::from_str(json)?;
        if doc.version > Self::CURRENT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: doc.version,
                supported: Self::CURRENT_VERSION,
            });
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved script '{}' to {}", self.metadata.name, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        let doc = Self::from_json(&json)?;
        log::info!(
            "Loaded script '{}' ({} nodes, {} edges) from {}",
            doc.metadata.name,
            doc.nodes.len(),
            doc.edges.len(),
            path.display()
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn save_and_load_keeps_metadata_and_order() {
        let mut graph = ScriptGraph::new();
        let first = Node::new("trigger.on_tick", Position::new(0.0, 0.0));
        let second = Node::new("action.log", Position::new(200.0, 0.0));
        let order = vec![first.id, second.id];
        graph.insert_node(first);
        graph.insert_node(second);
        let metadata = ScriptMetadata {
            name: "Guard".into(),
            paused: true,
            ..ScriptMetadata::default()
        };
        let doc = ScriptDocument::new(metadata, &graph);

        let temp = NamedTempFile::new().unwrap();
        doc.save(temp.path()).unwrap();
        let loaded = ScriptDocument::load(temp.path()).unwrap();

        assert_eq!(loaded.metadata.name, "Guard");
        assert!(loaded.metadata.paused);
        assert_eq!(loaded.graph().nodes.keys().copied().collect::<Vec<_>>(), order);
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        let metadata = serde_json::to_string(&ScriptMetadata::default()).unwrap();
        write!(temp, r#"{{"version": 999, "metadata": {metadata}, "nodes": [], "edges": []}}"#).unwrap();
        assert!(matches!(
            ScriptDocument::load(temp.path()),
            Err(DocumentError::UnsupportedVersion { found: 999, .. })
        ));
    }
}
