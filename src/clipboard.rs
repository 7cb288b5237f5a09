//! Copy/paste snapshots.
//!
//! A snapshot keeps the original ids so paste can remap them, plus the
//! centroid of the copied nodes as the reference point for placement.

use crate::error::DocumentError;
use crate::graph::{Edge, Node, Position, ScriptGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Marks clipboard text that carries a snapshot.
pub const CLIPBOARD_PREFIX: &str = "SCRIPT_GRAPH_CLIPBOARD:";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Script the nodes were copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_script: Option<Uuid>,
    pub reference: Position,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    /// Collect `selection` (plus the interior of any selected group) and the
    /// edges with both endpoints inside. Boundary-crossing edges are dropped.
    ///
    /// Group input/output proxies belong to their group, so they only travel
    /// inside a copied group, never as selected nodes of their own.
    pub fn export(graph: &ScriptGraph, selection: &HashSet<Uuid>, source_script: Option<Uuid>) -> Option<Self> {
        let roots: HashSet<Uuid> = selection
            .iter()
            .copied()
            .filter(|id| graph.node(*id).is_some_and(|n| !n.is_group_boundary()))
            .collect();
        if roots.is_empty() {
            return None;
        }
        let reference = graph.centroid(&roots)?;
        let included = graph.with_descendants(&roots);

        let nodes = graph
            .nodes
            .values()
            .filter(|n| included.contains(&n.id))
            .map(|n| {
                let mut node = n.clone();
                node.selected = false;
                node
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .filter(|e| included.contains(&e.source) && included.contains(&e.target))
            .cloned()
            .collect();
        Some(Self {
            source_script,
            reference,
            nodes,
            edges,
        })
    }

    /// Fresh copies of the snapshot contents placed so that the reference
    /// point lands on `target`, inside `parent_group`.
    ///
    /// Nodes nested in a copied group keep their group-relative positions.
    /// Edges whose endpoints cannot be remapped are dropped.
    pub fn instantiate(&self, target: Position, parent_group: Option<Uuid>) -> (Vec<Node>, Vec<Edge>) {
        let id_map: HashMap<Uuid, Uuid> = self.nodes.iter().map(|n| (n.id, Uuid::new_v4())).collect();
        let delta = target - self.reference;

        let nodes = self
            .nodes
            .iter()
            .filter_map(|node| {
                let mut copy = node.clone();
                copy.id = *id_map.get(&node.id)?;
                copy.selected = false;
                match node.parent_group.and_then(|g| id_map.get(&g)) {
                    Some(new_parent) => copy.parent_group = Some(*new_parent),
                    None => {
                        copy.parent_group = parent_group;
                        copy.position = node.position + delta;
                    }
                }
                copy.parent_frame = node.parent_frame.and_then(|f| id_map.get(&f)).copied();
                Some(copy)
            })
            .collect();

        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let (Some(source), Some(target)) = (id_map.get(&edge.source), id_map.get(&edge.target)) else {
                log::warn!("Dropping clipboard edge {} with unknown endpoint", edge.id);
                continue;
            };
            edges.push(Edge {
                id: Uuid::new_v4(),
                source: *source,
                target: *target,
                ..edge.clone()
            });
        }
        (nodes, edges)
    }

    pub fn to_text(&self) -> Result<String, DocumentError> {
        Ok(format!("{}{}", CLIPBOARD_PREFIX, serde_json::to_string(self)?))
    }

    pub fn from_text(text: &str) -> Result<Self, DocumentError> {
        let json = text
            .trim()
            .strip_prefix(CLIPBOARD_PREFIX)
            .ok_or(DocumentError::NotClipboardData)?;
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_clipboard_text(text: &str) -> bool {
        text.trim_start().starts_with(CLIPBOARD_PREFIX)
    }
}
