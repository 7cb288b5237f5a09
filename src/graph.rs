use crate::catalog::{self, NodeCatalog};
use crate::node_types::{PortDefinition, PortDirection, PortType, can_connect, resolve_passthrough};
use crate::value::NodeData;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::{Add, Sub};
use uuid::Uuid;

/// Logical 2D position. The graph knows nothing about pixels.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Kind-specific payload layered on top of the common node structure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Regular node backed by a catalog definition.
    #[default]
    Script,
    Reroute {
        resolved_type: PortType,
    },
    Frame {
        label: String,
        size: Size,
    },
    Note {
        text: String,
    },
    Group {
        label: String,
        inputs: Vec<PortDefinition>,
        outputs: Vec<PortDefinition>,
    },
    /// Lives inside a group; its outputs mirror the group's inputs.
    GroupInput {
        ports: Vec<PortDefinition>,
    },
    /// Lives inside a group; its inputs mirror the group's outputs.
    GroupOutput {
        ports: Vec<PortDefinition>,
    },
}

impl NodeKind {
    /// Initial payload for a freshly created node of `node_type`.
    pub fn for_type(node_type: &str) -> Self {
        match node_type {
            catalog::REROUTE => NodeKind::Reroute {
                resolved_type: PortType::Any,
            },
            catalog::FRAME => NodeKind::Frame {
                label: "Frame".into(),
                size: Size {
                    width: 320.0,
                    height: 200.0,
                },
            },
            catalog::NOTE => NodeKind::Note {
                text: String::new(),
            },
            catalog::GROUP => NodeKind::Group {
                label: "Group".into(),
                inputs: Vec::new(),
                outputs: Vec::new(),
            },
            catalog::GROUP_INPUT => NodeKind::GroupInput { ports: Vec::new() },
            catalog::GROUP_OUTPUT => NodeKind::GroupOutput { ports: Vec::new() },
            _ => NodeKind::Script,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    /// Live selection state, never persisted.
    #[serde(skip)]
    pub selected: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub collapsed: bool,
    /// Show only the sockets that carry an edge.
    #[serde(default)]
    pub hide_unconnected: bool,
    /// Group whose sub-graph contains this node; `None` at the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<Uuid>,
    /// Frame that owns this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_frame: Option<Uuid>,
    #[serde(default)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(node_type: impl Into<String>, position: Position) -> Self {
        let node_type = node_type.into();
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::for_type(&node_type),
            node_type,
            position,
            data: NodeData::default(),
            selected: false,
            muted: false,
            collapsed: false,
            hide_unconnected: false,
            parent_group: None,
            parent_frame: None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.kind, NodeKind::Frame { .. })
    }

    pub fn is_reroute(&self) -> bool {
        matches!(self.kind, NodeKind::Reroute { .. })
    }

    pub fn is_group_boundary(&self) -> bool {
        matches!(self.kind, NodeKind::GroupInput { .. } | NodeKind::GroupOutput { .. })
    }

    /// Display label: group and frame labels, otherwise a `label` field in
    /// the data, otherwise the type.
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::Group { label, .. } | NodeKind::Frame { label, .. } => label.clone(),
            _ => match self.data.get("label") {
                Some(crate::value::NodeValue::String(s)) if !s.is_empty() => s.clone(),
                _ => self.node_type.clone(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Execution,
    Data,
}

impl EdgeKind {
    pub fn for_port_type(ty: PortType) -> Self {
        if ty.is_execution() {
            EdgeKind::Execution
        } else {
            EdgeKind::Data
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub id: Uuid,
    pub source: Uuid,
    pub source_port: String,
    pub target: Uuid,
    pub target_port: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn touches(&self, node: Uuid) -> bool {
        self.source == node || self.target == node
    }

    pub fn connection(&self) -> Connection {
        Connection {
            source: self.source,
            source_port: self.source_port.clone(),
            target: self.target,
            target_port: self.target_port.clone(),
        }
    }
}

/// A requested edge, before it has an id or a kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: Uuid,
    pub source_port: String,
    pub target: Uuid,
    pub target_port: String,
}

impl Connection {
    pub fn new(
        source: Uuid,
        source_port: impl Into<String>,
        target: Uuid,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_port: source_port.into(),
            target,
            target_port: target_port.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Integrity finding reported by [`ScriptGraph::diagnostics`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<Uuid>,
    pub message: String,
}

impl Diagnostic {
    fn error(node: Option<Uuid>, edge: Option<Uuid>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            node,
            edge,
            message,
        }
    }

    fn warning(node: Option<Uuid>, edge: Option<Uuid>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            node,
            edge,
            message,
        }
    }
}

/// All nodes and edges of a script, including nested group contents.
///
/// Node and edge ids are unique across every nesting level, so lookups
/// never need to know how deep a node sits.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ScriptGraph {
    pub nodes: IndexMap<Uuid, Node>,
    pub edges: Vec<Edge>,
}

impl ScriptGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn edge(&self, id: Uuid) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Nodes whose parent group is `group` (`None` for the root level).
    pub fn nodes_in(&self, group: Option<Uuid>) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.parent_group == group)
    }

    pub fn edges_touching(&self, node: Uuid) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(node))
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.nodes.values().filter(|n| n.selected).map(|n| n.id).collect()
    }

    /// `roots` plus everything nested inside any group among them.
    pub fn with_descendants(&self, roots: &HashSet<Uuid>) -> HashSet<Uuid> {
        let mut all = roots.clone();
        loop {
            let before = all.len();
            for node in self.nodes.values() {
                if let Some(parent) = node.parent_group {
                    if all.contains(&parent) {
                        all.insert(node.id);
                    }
                }
            }
            if all.len() == before {
                return all;
            }
        }
    }

    /// Nesting depth of the deepest node (root level is 0).
    pub fn max_depth(&self) -> usize {
        self.nodes
            .values()
            .map(|n| {
                let mut depth = 0;
                let mut parent = n.parent_group;
                while let Some(p) = parent {
                    depth += 1;
                    if depth > self.nodes.len() {
                        break;
                    }
                    parent = self.node(p).and_then(|g| g.parent_group);
                }
                depth
            })
            .max()
            .unwrap_or(0)
    }

    /// Ports a node exposes in `direction`. Layout nodes synthesize theirs.
    pub fn ports(&self, node_id: Uuid, direction: PortDirection, catalog: &NodeCatalog) -> Vec<PortDefinition> {
        let Some(node) = self.node(node_id) else {
            return Vec::new();
        };
        match (&node.kind, direction) {
            (NodeKind::Script, _) => catalog
                .get(&node.node_type)
                .map(|d| d.ports(direction).to_vec())
                .unwrap_or_default(),
            (NodeKind::Reroute { resolved_type }, PortDirection::Input) => {
                vec![PortDefinition::new(catalog::REROUTE_IN, "", *resolved_type)]
            }
            (NodeKind::Reroute { resolved_type }, PortDirection::Output) => {
                vec![PortDefinition::new(catalog::REROUTE_OUT, "", *resolved_type)]
            }
            (NodeKind::Group { inputs, .. }, PortDirection::Input) => inputs.clone(),
            (NodeKind::Group { outputs, .. }, PortDirection::Output) => outputs.clone(),
            (NodeKind::GroupInput { ports }, PortDirection::Output) => ports.clone(),
            (NodeKind::GroupOutput { ports }, PortDirection::Input) => ports.clone(),
            _ => Vec::new(),
        }
    }

    /// Ports to draw: all of them, or only the wired ones when the node
    /// hides unconnected sockets.
    pub fn shown_ports(&self, node_id: Uuid, direction: PortDirection, catalog: &NodeCatalog) -> Vec<PortDefinition> {
        let mut ports = self.ports(node_id, direction, catalog);
        if self.node(node_id).is_some_and(|n| n.hide_unconnected) {
            ports.retain(|p| {
                self.edges.iter().any(|e| match direction {
                    PortDirection::Input => e.target == node_id && e.target_port == p.id,
                    PortDirection::Output => e.source == node_id && e.source_port == p.id,
                })
            });
        }
        ports
    }

    pub fn port(
        &self,
        node_id: Uuid,
        direction: PortDirection,
        port_id: &str,
        catalog: &NodeCatalog,
    ) -> Option<PortDefinition> {
        self.ports(node_id, direction, catalog)
            .into_iter()
            .find(|p| p.id == port_id)
    }

    pub fn port_type(
        &self,
        node_id: Uuid,
        direction: PortDirection,
        port_id: &str,
        catalog: &NodeCatalog,
    ) -> Option<PortType> {
        self.port(node_id, direction, port_id, catalog)
            .map(|p| p.port_type)
    }

    /// Pass-through ports take their type from what they are wired to.
    pub fn is_passthrough(&self, node_id: Uuid) -> bool {
        self.node(node_id).is_some_and(|n| n.is_reroute())
    }

    /// Effective (output, input) types for a proposed edge. An unresolved
    /// pass-through endpoint adopts the type of the other side.
    pub fn effective_types(&self, connection: &Connection, catalog: &NodeCatalog) -> Option<(PortType, PortType)> {
        let output = self.port_type(
            connection.source,
            PortDirection::Output,
            &connection.source_port,
            catalog,
        )?;
        let input = self.port_type(
            connection.target,
            PortDirection::Input,
            &connection.target_port,
            catalog,
        )?;
        let source_open = output == PortType::Any && self.is_passthrough(connection.source);
        let target_open = input == PortType::Any && self.is_passthrough(connection.target);
        Some(match (source_open, target_open) {
            (true, false) => (input, input),
            (false, true) => (output, output),
            _ => (output, input),
        })
    }

    /// Re-resolve every reroute from its current connections. Chains of
    /// reroutes resolve transitively; a reroute with no concrete neighbour
    /// falls back to `Any`.
    pub fn refresh_passthrough_types(&mut self, catalog: &NodeCatalog) {
        let reroutes: Vec<Uuid> = self
            .nodes
            .values()
            .filter(|n| n.is_reroute())
            .map(|n| n.id)
            .collect();
        if reroutes.is_empty() {
            return;
        }
        for id in &reroutes {
            self.set_reroute_type(*id, PortType::Any);
        }
        for _ in 0..reroutes.len() {
            let mut changed = false;
            for id in &reroutes {
                if self.port_type(*id, PortDirection::Input, catalog::REROUTE_IN, catalog)
                    .is_some_and(|t| t.is_concrete())
                {
                    continue;
                }
                let inbound = self
                    .edges
                    .iter()
                    .filter(|e| e.target == *id)
                    .filter_map(|e| self.port_type(e.source, PortDirection::Output, &e.source_port, catalog));
                let outbound = self
                    .edges
                    .iter()
                    .filter(|e| e.source == *id)
                    .filter_map(|e| self.port_type(e.target, PortDirection::Input, &e.target_port, catalog));
                let resolved = resolve_passthrough(inbound.chain(outbound));
                if resolved.is_concrete() {
                    self.set_reroute_type(*id, resolved);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Edges touching a reroute whose resolved types no longer connect,
    /// with the (output, input) pair that fails.
    pub fn passthrough_conflicts(&self, catalog: &NodeCatalog) -> Vec<(Uuid, PortType, PortType)> {
        self.edges
            .iter()
            .filter(|e| self.is_passthrough(e.source) || self.is_passthrough(e.target))
            .filter_map(|e| {
                let (output, input) = self.effective_types(&e.connection(), catalog)?;
                (!can_connect(output, input)).then_some((e.id, output, input))
            })
            .collect()
    }

    fn set_reroute_type(&mut self, id: Uuid, ty: PortType) {
        if let Some(NodeKind::Reroute { resolved_type }) = self.node_mut(id).map(|n| &mut n.kind) {
            *resolved_type = ty;
        }
    }

    /// Average position of the given nodes.
    pub fn centroid<'a, I>(&self, ids: I) -> Option<Position>
    where
        I: IntoIterator<Item = &'a Uuid>,
    {
        let mut sum = Position::default();
        let mut count = 0usize;
        for node in ids.into_iter().filter_map(|id| self.node(*id)) {
            sum = sum + node.position;
            count += 1;
        }
        (count > 0).then(|| Position::new(sum.x / count as f32, sum.y / count as f32))
    }

    /// `nodes + 0.5 * edges + 3 * loop nodes + 2 * max fan-out`.
    pub fn complexity_score(&self, catalog: &NodeCatalog) -> f32 {
        let loop_nodes = self
            .nodes
            .values()
            .filter(|n| catalog.get(&n.node_type).is_some_and(|d| d.is_loop()))
            .count();
        let mut fan_out: HashMap<Uuid, usize> = HashMap::new();
        for edge in &self.edges {
            *fan_out.entry(edge.source).or_default() += 1;
        }
        let max_fan_out = fan_out.values().copied().max().unwrap_or(0);
        self.nodes.len() as f32
            + self.edges.len() as f32 * 0.5
            + loop_nodes as f32 * 3.0
            + max_fan_out as f32 * 2.0
    }

    /// Check the structural invariants of the graph against a catalog.
    pub fn diagnostics(&self, catalog: &NodeCatalog) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        for node in self.nodes.values() {
            if let Some(parent) = node.parent_group {
                if !self.node(parent).is_some_and(|g| g.is_group()) {
                    out.push(Diagnostic::error(
                        Some(node.id),
                        None,
                        format!("parent group {} does not exist", parent),
                    ));
                }
            }
            if let Some(frame) = node.parent_frame {
                if !self.node(frame).is_some_and(|f| f.is_frame()) {
                    out.push(Diagnostic::warning(
                        Some(node.id),
                        None,
                        format!("parent frame {} does not exist", frame),
                    ));
                }
            }
            if node.kind != NodeKind::Script {
                continue;
            }
            let Some(def) = catalog.get(&node.node_type) else {
                out.push(Diagnostic::warning(
                    Some(node.id),
                    None,
                    format!("unknown node type '{}'", node.node_type),
                ));
                continue;
            };
            for (key, _) in node.data.iter() {
                if def.input(key).is_none() && !def.default_data.contains_key(key) {
                    continue;
                }
                if let Err(err) = node.data.read(key, def) {
                    out.push(Diagnostic::warning(Some(node.id), None, err.to_string()));
                }
            }
            for port in def.inputs.iter().filter(|p| p.required && !p.port_type.is_execution()) {
                let wired = self
                    .edges
                    .iter()
                    .any(|e| e.target == node.id && e.target_port == port.id);
                if !wired && node.data.read(&port.id, def).is_err() {
                    out.push(Diagnostic::warning(
                        Some(node.id),
                        None,
                        format!("required input '{}' is not connected", port.id),
                    ));
                }
            }
        }

        let mut edge_ids = HashSet::new();
        let mut sources_per_input: HashMap<(Uuid, &str), usize> = HashMap::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                out.push(Diagnostic::error(None, Some(edge.id), "duplicate edge id".into()));
            }
            let (Some(source), Some(target)) = (self.node(edge.source), self.node(edge.target)) else {
                out.push(Diagnostic::error(
                    None,
                    Some(edge.id),
                    "edge references a missing node".into(),
                ));
                continue;
            };
            if source.parent_group != target.parent_group {
                out.push(Diagnostic::error(
                    None,
                    Some(edge.id),
                    "edge crosses a group boundary".into(),
                ));
            }
            let input_port = self.port(edge.target, PortDirection::Input, &edge.target_port, catalog);
            let connection = edge.connection();
            match self.effective_types(&connection, catalog) {
                None => out.push(Diagnostic::error(
                    None,
                    Some(edge.id),
                    format!(
                        "edge references missing port {}:{} -> {}:{}",
                        source.node_type, edge.source_port, target.node_type, edge.target_port
                    ),
                )),
                Some((output, input)) if !can_connect(output, input) => out.push(Diagnostic::error(
                    None,
                    Some(edge.id),
                    format!("cannot connect {} output to {} input", output, input),
                )),
                Some(_) => {}
            }
            let multi = input_port
                .as_ref()
                .is_some_and(|p| p.multi_input && !p.port_type.is_execution());
            if !multi {
                *sources_per_input
                    .entry((edge.target, edge.target_port.as_str()))
                    .or_default() += 1;
            }
        }
        for ((node, port), count) in sources_per_input {
            if count > 1 {
                out.push(Diagnostic::error(
                    Some(node),
                    None,
                    format!("input '{}' has {} sources", port, count),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_nodes::standard_catalog;

    fn edge(source: &Node, source_port: &str, target: &Node, target_port: &str) -> Edge {
        Edge {
            id: Uuid::new_v4(),
            source: source.id,
            source_port: source_port.into(),
            target: target.id,
            target_port: target_port.into(),
            kind: EdgeKind::Data,
        }
    }

    #[test]
    fn reroute_chain_resolves_from_concrete_end() {
        let catalog = standard_catalog();
        let mut graph = ScriptGraph::new();
        let number = Node::new("data.number", Position::default());
        let r1 = Node::new(catalog::REROUTE, Position::default());
        let r2 = Node::new(catalog::REROUTE, Position::default());
        graph.edges.push(edge(&r1, "out", &r2, "in"));
        graph.edges.push(edge(&number, "value", &r1, "in"));
        let (r1_id, r2_id) = (r1.id, r2.id);
        for n in [number, r1, r2] {
            graph.insert_node(n);
        }

        graph.refresh_passthrough_types(&catalog);
        assert_eq!(graph.port_type(r2_id, PortDirection::Output, "out", &catalog), Some(PortType::Number));

        graph.edges.retain(|e| e.target != r1_id);
        graph.refresh_passthrough_types(&catalog);
        assert_eq!(graph.port_type(r1_id, PortDirection::Input, "in", &catalog), Some(PortType::Any));
        assert_eq!(graph.port_type(r2_id, PortDirection::Input, "in", &catalog), Some(PortType::Any));
    }

    #[test]
    fn descendants_follow_nested_groups() {
        let mut graph = ScriptGraph::new();
        let outer = Node::new(catalog::GROUP, Position::default());
        let mut inner = Node::new(catalog::GROUP, Position::default());
        inner.parent_group = Some(outer.id);
        let mut leaf = Node::new("math.add", Position::default());
        leaf.parent_group = Some(inner.id);
        let ids = [outer.id, inner.id, leaf.id];
        for n in [outer, inner, leaf] {
            graph.insert_node(n);
        }
        let all = graph.with_descendants(&HashSet::from([ids[0]]));
        assert_eq!(all, HashSet::from(ids));
        assert_eq!(graph.max_depth(), 2);
    }

    #[test]
    fn diagnostics_flag_dangling_and_doubled_inputs() {
        let catalog = standard_catalog();
        let mut graph = ScriptGraph::new();
        let a = Node::new("data.number", Position::default());
        let b = Node::new("data.number", Position::default());
        let add = Node::new("math.add", Position::default());
        graph.edges.push(edge(&a, "value", &add, "a"));
        graph.edges.push(edge(&b, "value", &add, "a"));
        let ghost = Node::new("data.number", Position::default());
        graph.edges.push(edge(&ghost, "value", &add, "b"));
        for n in [a, b, add] {
            graph.insert_node(n);
        }

        let found = graph.diagnostics(&catalog);
        assert!(found.iter().any(|d| d.message.contains("missing node")));
        assert!(found.iter().any(|d| d.message.contains("2 sources")));
    }

    #[test]
    fn complexity_counts_loops_and_fan_out() {
        let catalog = standard_catalog();
        let mut graph = ScriptGraph::new();
        let tick = Node::new("trigger.on_tick", Position::default());
        let looper = Node::new("flow.loop", Position::default());
        let log = Node::new("action.log", Position::default());
        let mut e1 = edge(&tick, "exec_out", &looper, "exec_in");
        e1.kind = EdgeKind::Execution;
        let mut e2 = edge(&tick, "exec_out", &log, "exec_in");
        e2.kind = EdgeKind::Execution;
        graph.edges.extend([e1, e2]);
        for n in [tick, looper, log] {
            graph.insert_node(n);
        }
        // 3 nodes + 1.0 for edges + 3 for the loop + 2 * fan-out of 2
        assert_eq!(graph.complexity_score(&catalog), 11.0);
    }

    #[test]
    fn selection_is_not_serialized() {
        let mut node = Node::new("math.add", Position::new(1.0, 2.0));
        node.selected = true;
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert!(!back.selected);
        assert_eq!(back.position, node.position);
    }
}
