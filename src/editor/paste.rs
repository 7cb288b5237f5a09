use super::ScriptEditor;
use crate::clipboard::Snapshot;
use crate::error::DocumentError;
use crate::graph::Position;
use std::collections::HashSet;
use uuid::Uuid;

impl ScriptEditor {
    /// Snapshot of the current selection, or `None` when nothing is selected.
    pub fn copy_selection(&self) -> Option<Snapshot> {
        let selected: HashSet<Uuid> = self.selected_nodes().into_iter().collect();
        Snapshot::export(&self.graph, &selected, Some(self.metadata.id))
    }

    /// Insert a snapshot into the current level with its reference point at
    /// `target`. The pasted top-level nodes become the selection.
    pub fn paste(&mut self, snapshot: &Snapshot, target: Position) -> Vec<Uuid> {
        let level = self.current_group();
        let (nodes, edges) = snapshot.instantiate(target, level);
        if nodes.is_empty() {
            return Vec::new();
        }
        let top_level: Vec<Uuid> = nodes.iter().filter(|n| n.parent_group == level).map(|n| n.id).collect();
        for node in nodes {
            self.graph.insert_node(node);
        }
        self.graph.edges.extend(edges);
        self.select_nodes(top_level.iter().copied());
        log::info!("Pasted {} nodes", top_level.len());
        self.commit("paste");
        top_level
    }

    pub fn paste_text(&mut self, text: &str, target: Position) -> Result<Vec<Uuid>, DocumentError> {
        let snapshot = Snapshot::from_text(text)?;
        Ok(self.paste(&snapshot, target))
    }

    /// Clone the selection next to itself, offset so the originals stay
    /// visible. Edges leaving the selection are not duplicated.
    pub fn duplicate_selected(&mut self) -> Vec<Uuid> {
        let Some(snapshot) = self.copy_selection() else {
            return Vec::new();
        };
        let target = snapshot.reference + self.config.duplicate_offset;
        self.paste(&snapshot, target)
    }
}
