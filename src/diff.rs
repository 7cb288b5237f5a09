//! Changes between two graph states, used for the "unsaved changes" view.

use crate::graph::ScriptGraph;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct GraphDiff {
    pub added_nodes: Vec<Uuid>,
    pub removed_nodes: Vec<Uuid>,
    /// Present in both with different position, data, flags or payload.
    pub modified_nodes: Vec<Uuid>,
    pub added_edges: Vec<Uuid>,
    pub removed_edges: Vec<Uuid>,
}

impl GraphDiff {
    pub fn between(before: &ScriptGraph, after: &ScriptGraph) -> Self {
        let mut diff = GraphDiff::default();
        for (id, node) in &after.nodes {
            match before.nodes.get(id) {
                None => diff.added_nodes.push(*id),
                // selection is live state and never counts as a change
                Some(old) if !same_content(old, node) => diff.modified_nodes.push(*id),
                Some(_) => {}
            }
        }
        diff.removed_nodes = before
            .nodes
            .keys()
            .filter(|id| !after.nodes.contains_key(*id))
            .copied()
            .collect();

        let before_edges: HashSet<Uuid> = before.edges.iter().map(|e| e.id).collect();
        let after_edges: HashSet<Uuid> = after.edges.iter().map(|e| e.id).collect();
        diff.added_edges = after
            .edges
            .iter()
            .filter(|e| !before_edges.contains(&e.id))
            .map(|e| e.id)
            .collect();
        diff.removed_edges = before
            .edges
            .iter()
            .filter(|e| !after_edges.contains(&e.id))
            .map(|e| e.id)
            .collect();
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.modified_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added_nodes.len()
            + self.removed_nodes.len()
            + self.modified_nodes.len()
            + self.added_edges.len()
            + self.removed_edges.len()
    }
}

fn same_content(a: &crate::graph::Node, b: &crate::graph::Node) -> bool {
    a.position == b.position
        && a.data == b.data
        && a.muted == b.muted
        && a.collapsed == b.collapsed
        && a.parent_group == b.parent_group
        && a.parent_frame == b.parent_frame
        && a.kind == b.kind
}
