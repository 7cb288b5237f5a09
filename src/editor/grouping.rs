//! Group navigation and the group/ungroup transforms.
//!
//! A group's interior lives in the same graph as everything else; nodes
//! point at their group through `parent_group`. Inside each group a
//! group-input proxy exposes the group's inputs as outputs, and a
//! group-output proxy takes the group's outputs as inputs.

use super::ScriptEditor;
use crate::catalog;
use crate::graph::{Edge, EdgeKind, Node, NodeKind, Position};
use crate::node_types::{PortDefinition, PortDirection, PortType};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Breadcrumb {
    pub group: Uuid,
    pub label: String,
    /// Index of this group on the navigation stack.
    pub depth: usize,
}

/// One port synthesized on a new group, keyed by the endpoint it stands in
/// for.
struct BoundaryPort {
    endpoint: (Uuid, String),
    definition: PortDefinition,
}

fn boundary_port(
    ports: &mut Vec<BoundaryPort>,
    prefix: &str,
    endpoint: (Uuid, String),
    port_type: PortType,
    label: String,
) -> String {
    if let Some(existing) = ports.iter().find(|p| p.endpoint == endpoint) {
        return existing.definition.id.clone();
    }
    let id = format!("{}-{}", prefix, ports.len());
    ports.push(BoundaryPort {
        endpoint,
        definition: PortDefinition::new(id.clone(), label, port_type),
    });
    id
}

fn edge(source: Uuid, source_port: &str, target: Uuid, target_port: &str, kind: EdgeKind) -> Edge {
    Edge {
        id: Uuid::new_v4(),
        source,
        source_port: source_port.to_string(),
        target,
        target_port: target_port.to_string(),
        kind,
    }
}

impl ScriptEditor {
    /// Open a group at the current level for editing. Anything else is a
    /// no-op.
    pub fn enter_group(&mut self, group: Uuid) -> bool {
        let enterable = self
            .graph
            .node(group)
            .is_some_and(|n| n.is_group() && n.parent_group == self.current_group());
        if !enterable {
            return false;
        }
        self.deselect_all();
        self.group_edit_stack.push(group);
        true
    }

    pub fn exit_group(&mut self) -> bool {
        if self.group_edit_stack.pop().is_none() {
            return false;
        }
        self.deselect_all();
        true
    }

    pub fn exit_to_root(&mut self) {
        self.group_edit_stack.clear();
        self.deselect_all();
    }

    /// Breadcrumb click on the group at `depth`: pops
    /// `current - depth - 1` levels, never fewer than zero.
    pub fn navigate_to_depth(&mut self, depth: usize) {
        let pops = self.depth().saturating_sub(depth + 1);
        if pops == 0 {
            return;
        }
        let keep = self.depth() - pops;
        self.group_edit_stack.truncate(keep);
        self.deselect_all();
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.group_edit_stack
            .iter()
            .enumerate()
            .map(|(depth, id)| Breadcrumb {
                group: *id,
                label: self.graph.node(*id).map(|n| n.label()).unwrap_or_default(),
                depth,
            })
            .collect()
    }

    /// Wrap the selected nodes of the current level in a new group placed
    /// at their centroid.
    ///
    /// Internal edges move with the nodes. A boundary-crossing edge is
    /// split in two at a synthesized group port: inputs get one port per
    /// distinct outside source, outputs one per distinct inside source.
    pub fn create_group_from_selection(&mut self) -> Option<Uuid> {
        let members: Vec<Uuid> = self
            .visible_nodes()
            .filter(|n| n.selected && !n.is_group_boundary())
            .map(|n| n.id)
            .collect();
        let center = self.graph.centroid(&members)?;
        let member_set: HashSet<Uuid> = members.iter().copied().collect();
        let level = self.current_group();

        let mut group = Node::new(catalog::GROUP, center);
        group.parent_group = level;
        let group_id = group.id;
        let mut input_proxy = Node::new(catalog::GROUP_INPUT, self.config.group_input_offset);
        input_proxy.parent_group = Some(group_id);
        let mut output_proxy = Node::new(catalog::GROUP_OUTPUT, self.config.group_output_offset);
        output_proxy.parent_group = Some(group_id);
        let (input_id, output_id) = (input_proxy.id, output_proxy.id);

        let mut inputs: Vec<BoundaryPort> = Vec::new();
        let mut outputs: Vec<BoundaryPort> = Vec::new();
        let mut edges = Vec::with_capacity(self.graph.edges.len());
        for e in std::mem::take(&mut self.graph.edges) {
            let inside = (member_set.contains(&e.source), member_set.contains(&e.target));
            if inside.0 == inside.1 {
                edges.push(e);
                continue;
            }
            let port_type = match self.graph.effective_types(&e.connection(), &self.catalog) {
                Some((out, _)) if out.is_concrete() => out,
                Some((_, input)) => input,
                None => PortType::Any,
            };
            let label = self
                .graph
                .port(e.source, PortDirection::Output, &e.source_port, &self.catalog)
                .map(|p| if p.label.is_empty() { p.id } else { p.label })
                .unwrap_or_else(|| e.source_port.clone());
            if inside.1 {
                let port = boundary_port(&mut inputs, "group-in", (e.source, e.source_port.clone()), port_type, label);
                if !edges
                    .iter()
                    .any(|x: &Edge| x.target == group_id && x.target_port == port)
                {
                    edges.push(edge(e.source, &e.source_port, group_id, &port, e.kind));
                }
                edges.push(edge(input_id, &port, e.target, &e.target_port, e.kind));
            } else {
                let port = boundary_port(&mut outputs, "group-out", (e.source, e.source_port.clone()), port_type, label);
                if !edges
                    .iter()
                    .any(|x: &Edge| x.target == output_id && x.target_port == port)
                {
                    edges.push(edge(e.source, &e.source_port, output_id, &port, e.kind));
                }
                edges.push(edge(group_id, &port, e.target, &e.target_port, e.kind));
            }
        }
        self.graph.edges = edges;

        let inputs: Vec<PortDefinition> = inputs.into_iter().map(|p| p.definition).collect();
        let outputs: Vec<PortDefinition> = outputs.into_iter().map(|p| p.definition).collect();
        input_proxy.kind = NodeKind::GroupInput { ports: inputs.clone() };
        output_proxy.kind = NodeKind::GroupOutput { ports: outputs.clone() };
        group.kind = NodeKind::Group {
            label: "Group".into(),
            inputs,
            outputs,
        };

        for id in &members {
            if let Some(node) = self.graph.node_mut(*id) {
                node.parent_group = Some(group_id);
                node.position = node.position - center;
                node.selected = false;
            }
        }
        // frames stay at the outer level
        for node in self.graph.nodes.values_mut() {
            if node.parent_frame.is_some_and(|f| !member_set.contains(&f)) && member_set.contains(&node.id) {
                node.parent_frame = None;
            }
        }
        group.selected = true;
        self.graph.insert_node(group);
        self.graph.insert_node(input_proxy);
        self.graph.insert_node(output_proxy);

        log::info!("Grouped {} nodes into {}", members.len(), group_id);
        self.commit("create group");
        Some(group_id)
    }

    /// Ungroup every selected group of the current level. Returns the
    /// nodes released into the current level, which become the selection.
    pub fn ungroup_selected(&mut self) -> Vec<Uuid> {
        let groups: Vec<Uuid> = self
            .visible_nodes()
            .filter(|n| n.selected && n.is_group())
            .map(|n| n.id)
            .collect();
        if groups.is_empty() {
            return Vec::new();
        }
        let mut released = Vec::new();
        for group in groups {
            released.extend(self.splice_group(group));
        }
        self.select_nodes(released.iter().copied());
        self.commit("ungroup");
        released
    }

    /// Dissolve one group into its parent level, wiring every outside
    /// endpoint straight to the inside endpoint it reached through the
    /// boundary.
    fn splice_group(&mut self, group_id: Uuid) -> Vec<Uuid> {
        let Some(group) = self.graph.node(group_id).cloned() else {
            return Vec::new();
        };
        let proxies: HashSet<Uuid> = self
            .graph
            .nodes_in(Some(group_id))
            .filter(|n| n.is_group_boundary())
            .map(|n| n.id)
            .collect();
        let is_input_proxy = |id: &Uuid, graph: &crate::graph::ScriptGraph| {
            proxies.contains(id) && graph.node(*id).is_some_and(|n| matches!(n.kind, NodeKind::GroupInput { .. }))
        };
        let is_output_proxy = |id: &Uuid, graph: &crate::graph::ScriptGraph| {
            proxies.contains(id) && graph.node(*id).is_some_and(|n| matches!(n.kind, NodeKind::GroupOutput { .. }))
        };

        // Outside sources feeding each group input port
        let outer_sources = |port: &str| -> Vec<(Uuid, String)> {
            self.graph
                .edges
                .iter()
                .filter(|e| e.target == group_id && e.target_port == port)
                .map(|e| (e.source, e.source_port.clone()))
                .collect()
        };

        let mut rewired = Vec::new();
        for inner in self.graph.edges.iter().filter(|e| is_input_proxy(&e.source, &self.graph)) {
            if is_output_proxy(&inner.target, &self.graph) {
                continue;
            }
            for (source, port) in outer_sources(&inner.source_port) {
                rewired.push(edge(source, &port, inner.target, &inner.target_port, inner.kind));
            }
        }
        for outer in self.graph.edges.iter().filter(|e| e.source == group_id) {
            for inner in self
                .graph
                .edges
                .iter()
                .filter(|e| is_output_proxy(&e.target, &self.graph) && e.target_port == outer.source_port)
            {
                // A port wired straight through the group
                let sources = if is_input_proxy(&inner.source, &self.graph) {
                    outer_sources(&inner.source_port)
                } else {
                    vec![(inner.source, inner.source_port.clone())]
                };
                for (source, port) in sources {
                    rewired.push(edge(source, &port, outer.target, &outer.target_port, outer.kind));
                }
            }
        }

        let mut removed = proxies;
        removed.insert(group_id);
        self.graph
            .edges
            .retain(|e| !removed.contains(&e.source) && !removed.contains(&e.target));
        self.graph.edges.extend(rewired);

        let mut released = Vec::new();
        for node in self.graph.nodes.values_mut() {
            if node.parent_group == Some(group_id) && !removed.contains(&node.id) {
                node.parent_group = group.parent_group;
                node.position = node.position + group.position;
                node.parent_frame = group.parent_frame;
                released.push(node.id);
            }
        }
        for node in self.graph.nodes.values_mut() {
            if node.parent_frame == Some(group_id) {
                node.parent_frame = None;
            }
        }
        self.graph.nodes.retain(|id, _| !removed.contains(id));
        log::info!("Ungrouped {} ({} nodes released)", group_id, released.len());
        released
    }

    /// Add a group node with empty boundaries and its two proxies at the
    /// current level.
    pub fn add_empty_group(&mut self, position: Position) -> Uuid {
        let group_id = self.insert_group(position);
        self.commit("add group");
        group_id
    }

    pub(super) fn insert_group(&mut self, position: Position) -> Uuid {
        let mut group = Node::new(catalog::GROUP, position);
        group.parent_group = self.current_group();
        let group_id = group.id;
        let mut input_proxy = Node::new(catalog::GROUP_INPUT, self.config.group_input_offset);
        input_proxy.parent_group = Some(group_id);
        let mut output_proxy = Node::new(catalog::GROUP_OUTPUT, self.config.group_output_offset);
        output_proxy.parent_group = Some(group_id);
        self.graph.insert_node(group);
        self.graph.insert_node(input_proxy);
        self.graph.insert_node(output_proxy);
        group_id
    }
}
