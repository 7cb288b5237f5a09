//! Selection commands. Selection is live state: it is never persisted
//! and only covers nodes of the level currently open for editing.

use super::ScriptEditor;
use crate::algorithms::{self, LinkDirection};
use std::collections::HashSet;
use uuid::Uuid;

impl ScriptEditor {
    /// Selected nodes of the current level, in graph order.
    pub fn selected_nodes(&self) -> Vec<Uuid> {
        self.visible_nodes().filter(|n| n.selected).map(|n| n.id).collect()
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.graph.node(id).is_some_and(|n| n.selected)
    }

    /// Select a visible node, replacing the selection unless `additive`.
    pub fn select_node(&mut self, id: Uuid, additive: bool) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        if !additive {
            self.deselect_all();
        }
        if let Some(node) = self.graph.node_mut(id) {
            node.selected = true;
        }
        true
    }

    /// Replace the selection with the visible nodes among `ids`.
    pub fn select_nodes<I: IntoIterator<Item = Uuid>>(&mut self, ids: I) {
        self.deselect_all();
        self.extend_selection(ids);
    }

    pub fn deselect_node(&mut self, id: Uuid) {
        if let Some(node) = self.graph.node_mut(id) {
            node.selected = false;
        }
    }

    pub fn select_all(&mut self) {
        let level = self.current_group();
        for node in self.graph.nodes.values_mut() {
            node.selected = node.parent_group == level;
        }
    }

    pub fn deselect_all(&mut self) {
        for node in self.graph.nodes.values_mut() {
            node.selected = false;
        }
    }

    fn extend_selection<I: IntoIterator<Item = Uuid>>(&mut self, ids: I) {
        let level = self.current_group();
        for id in ids {
            if let Some(node) = self.graph.node_mut(id) {
                if node.parent_group == level {
                    node.selected = true;
                }
            }
        }
    }

    /// Node shown in the inspector.
    pub fn focused_node(&self) -> Option<Uuid> {
        self.focused_node
    }

    pub fn focus_node(&mut self, id: Option<Uuid>) {
        self.focused_node = id.filter(|id| self.graph.node(*id).is_some());
    }

    /// Grow the selection along edges until nothing new is reached.
    pub fn select_linked(&mut self, direction: LinkDirection) -> usize {
        let start: HashSet<Uuid> = self.selected_nodes().into_iter().collect();
        if start.is_empty() {
            return 0;
        }
        let reached = algorithms::linked_closure(&start, self.visible_edges(), direction);
        let added = reached.len() - start.len();
        self.extend_selection(reached);
        added
    }

    /// Add every visible node sharing a type with a selected node.
    pub fn select_similar(&mut self) -> usize {
        let types: HashSet<String> = self
            .visible_nodes()
            .filter(|n| n.selected)
            .map(|n| n.node_type.clone())
            .collect();
        let matches: Vec<Uuid> = self
            .visible_nodes()
            .filter(|n| !n.selected && types.contains(&n.node_type))
            .map(|n| n.id)
            .collect();
        let added = matches.len();
        self.extend_selection(matches);
        added
    }

    /// Select one shortest undirected path between two visible nodes. With
    /// no path, just the two endpoints end up selected.
    pub fn select_shortest_path(&mut self, from: Uuid, to: Uuid) -> bool {
        if !self.is_visible(from) || !self.is_visible(to) {
            return false;
        }
        let path = algorithms::shortest_path(from, to, self.visible_edges());
        let found = path.is_some();
        self.select_nodes(path.unwrap_or_else(|| vec![from, to]));
        found
    }
}
