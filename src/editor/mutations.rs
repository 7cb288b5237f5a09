use super::ScriptEditor;
use crate::catalog;
use crate::error::EditError;
use crate::graph::{Connection, Edge, EdgeKind, Node, NodeKind, Position};
use crate::node_types::{PortDirection, can_connect};
use crate::quick_add::SourceSocket;
use crate::value::NodeData;
use std::collections::HashSet;
use uuid::Uuid;

/// A concrete port on a node in the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketRef {
    pub node: Uuid,
    pub port: String,
    pub direction: PortDirection,
}

impl SocketRef {
    pub fn output(node: Uuid, port: impl Into<String>) -> Self {
        Self {
            node,
            port: port.into(),
            direction: PortDirection::Output,
        }
    }

    pub fn input(node: Uuid, port: impl Into<String>) -> Self {
        Self {
            node,
            port: port.into(),
            direction: PortDirection::Input,
        }
    }
}

impl ScriptEditor {
    /// Create a node of `node_type` at the current level, seeded from the
    /// definition defaults with `initial` merged on top.
    pub fn add_node(&mut self, node_type: &str, position: Position, initial: NodeData) -> Result<Uuid, EditError> {
        let id = self.insert_new_node(node_type, position, initial)?;
        self.commit("add node");
        Ok(id)
    }

    /// Group nodes come with their two proxies; the proxies themselves
    /// cannot be placed on their own.
    fn insert_new_node(&mut self, node_type: &str, position: Position, initial: NodeData) -> Result<Uuid, EditError> {
        match node_type {
            catalog::GROUP => return Ok(self.insert_group(position)),
            catalog::GROUP_INPUT | catalog::GROUP_OUTPUT => {
                return Err(EditError::GroupBoundaryNode(node_type.to_string()));
            }
            _ => {}
        }
        let data = self
            .catalog
            .create_node_data(node_type, initial)
            .ok_or_else(|| EditError::UnknownNodeType(node_type.to_string()))?;
        let mut node = Node::new(node_type, position);
        node.data = data;
        node.parent_group = self.current_group();
        let id = node.id;
        self.graph.insert_node(node);
        Ok(id)
    }

    /// Shallow-merge `partial` into the node's data. Missing node is a no-op.
    pub fn update_node_data(&mut self, id: Uuid, partial: NodeData) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.data.merge(partial);
        self.commit("update node data");
        true
    }

    /// Rename a group or frame, or set the display label of any other node.
    pub fn rename_node(&mut self, id: Uuid, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        match &mut node.kind {
            NodeKind::Group { label, .. } | NodeKind::Frame { label, .. } => *label = name,
            _ => {
                node.data.insert("label", name);
            }
        }
        self.commit("rename node");
        true
    }

    pub fn set_note_text(&mut self, id: Uuid, text: impl Into<String>) -> bool {
        let Some(NodeKind::Note { text: current }) = self.graph.node_mut(id).map(|n| &mut n.kind) else {
            return false;
        };
        *current = text.into();
        self.commit("edit note");
        true
    }

    pub fn toggle_mute(&mut self, id: Uuid) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.muted = !node.muted;
        self.commit("toggle mute");
        true
    }

    pub fn toggle_collapse(&mut self, id: Uuid) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.collapsed = !node.collapsed;
        self.commit("toggle collapse");
        true
    }

    /// Switch between showing every socket and only the connected ones.
    pub fn toggle_socket_visibility(&mut self, id: Uuid) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.hide_unconnected = !node.hide_unconnected;
        self.commit("toggle socket visibility");
        true
    }

    /// Move a node. A frame drags the nodes it owns along.
    pub fn move_node(&mut self, id: Uuid, position: Position) -> bool {
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        let delta = position - node.position;
        let moved = self.with_frame_members(&HashSet::from([id]));
        self.translate(&moved, delta);
        self.commit("move node");
        true
    }

    pub fn move_selected(&mut self, delta: Position) -> usize {
        let selected: HashSet<Uuid> = self.selected_nodes().into_iter().collect();
        if selected.is_empty() {
            return 0;
        }
        let moved = self.with_frame_members(&selected);
        self.translate(&moved, delta);
        self.commit("move selection");
        moved.len()
    }

    /// `roots` plus every node owned, directly or through nested frames,
    /// by a frame among them.
    fn with_frame_members(&self, roots: &HashSet<Uuid>) -> HashSet<Uuid> {
        let mut all = roots.clone();
        loop {
            let before = all.len();
            for node in self.graph.nodes.values() {
                if node.parent_frame.is_some_and(|f| all.contains(&f)) {
                    all.insert(node.id);
                }
            }
            if all.len() == before {
                return all;
            }
        }
    }

    fn translate(&mut self, ids: &HashSet<Uuid>, delta: Position) {
        for id in ids {
            if let Some(node) = self.graph.node_mut(*id) {
                node.position = node.position + delta;
            }
        }
    }

    /// Validate and add an edge.
    ///
    /// A single-input port (every execution input, and data inputs not
    /// marked multi-input) loses its previous inbound edge.
    ///
    /// Connecting an edge that already exists returns its id and changes
    /// nothing.
    pub fn connect(&mut self, connection: Connection) -> Result<Uuid, EditError> {
        if let Some(existing) = self.graph.edges.iter().find(|e| e.connection() == connection) {
            return Ok(existing.id);
        }
        let id = self.transaction(|ed| ed.try_connect(&connection))?;
        self.commit("connect");
        Ok(id)
    }

    /// Insert an edge without committing. On a refusal raised after the
    /// edge went in the graph is left modified, so callers run this inside
    /// `transaction`.
    pub(crate) fn try_connect(&mut self, connection: &Connection) -> Result<Uuid, EditError> {
        let (source, target) = (connection.source, connection.target);
        if source == target {
            return Err(EditError::SelfConnection(source));
        }
        let source_node = self.graph.node(source).ok_or(EditError::NodeNotFound(source))?;
        let target_node = self.graph.node(target).ok_or(EditError::NodeNotFound(target))?;
        if source_node.parent_group != target_node.parent_group {
            return Err(EditError::DifferentLevels { from: source, to: target });
        }
        if self
            .graph
            .port(source, PortDirection::Output, &connection.source_port, &self.catalog)
            .is_none()
        {
            return Err(EditError::PortNotFound {
                node: source,
                port: connection.source_port.clone(),
                direction: PortDirection::Output,
            });
        }
        let Some(input_port) = self
            .graph
            .port(target, PortDirection::Input, &connection.target_port, &self.catalog)
        else {
            return Err(EditError::PortNotFound {
                node: target,
                port: connection.target_port.clone(),
                direction: PortDirection::Input,
            });
        };
        let (output, input) = self
            .graph
            .effective_types(connection, &self.catalog)
            .ok_or(EditError::NodeNotFound(target))?;
        if !can_connect(output, input) {
            log::warn!(
                "Rejected connection {}:{} -> {}:{} ({} to {})",
                source,
                connection.source_port,
                target,
                connection.target_port,
                output,
                input
            );
            return Err(EditError::Incompatible { output, input });
        }

        if let Some(existing) = self.graph.edges.iter().find(|e| e.connection() == *connection) {
            return Ok(existing.id);
        }
        let single_input = input.is_execution() || input_port.port_type.is_execution() || !input_port.multi_input;
        if single_input {
            self.graph
                .edges
                .retain(|e| !(e.target == target && e.target_port == connection.target_port));
        }

        let edge = Edge {
            id: Uuid::new_v4(),
            source,
            source_port: connection.source_port.clone(),
            target,
            target_port: connection.target_port.clone(),
            kind: EdgeKind::for_port_type(output),
        };
        let id = edge.id;
        let already_broken: HashSet<Uuid> = self
            .graph
            .passthrough_conflicts(&self.catalog)
            .into_iter()
            .map(|(edge, _, _)| edge)
            .collect();
        self.graph.edges.push(edge);
        // later connections in the same command must see resolved reroutes
        self.graph.refresh_passthrough_types(&self.catalog);

        // retyping a reroute can invalidate the edges already hanging off it
        let broken = self
            .graph
            .passthrough_conflicts(&self.catalog)
            .into_iter()
            .find(|(edge, _, _)| !already_broken.contains(edge));
        if let Some((edge, output, input)) = broken {
            log::warn!("Rejected connection {}: retypes edge {} to {} -> {}", id, edge, output, input);
            return Err(EditError::Incompatible { output, input });
        }
        Ok(id)
    }

    /// Move an existing edge to a new pair of endpoints. The new connection
    /// is validated without the old edge; when it is refused the old edge
    /// stays exactly where it was.
    pub fn reconnect(&mut self, edge_id: Uuid, connection: Connection) -> Result<Uuid, EditError> {
        if self.graph.edge(edge_id).is_none() {
            return Err(EditError::EdgeNotFound(edge_id));
        }
        let id = self.transaction(|ed| {
            ed.graph.edges.retain(|e| e.id != edge_id);
            ed.graph.refresh_passthrough_types(&ed.catalog);
            ed.try_connect(&connection)
        })?;
        self.commit("reconnect");
        Ok(id)
    }

    pub fn delete_edge(&mut self, edge_id: Uuid) -> bool {
        let before = self.graph.edges.len();
        self.graph.edges.retain(|e| e.id != edge_id);
        if self.graph.edges.len() == before {
            return false;
        }
        self.commit("delete edge");
        true
    }

    /// Remove every edge touching the node. Returns how many were removed.
    pub fn disconnect_node(&mut self, id: Uuid) -> usize {
        let before = self.graph.edges.len();
        self.graph.edges.retain(|e| !e.touches(id));
        let removed = before - self.graph.edges.len();
        if removed > 0 {
            self.commit("disconnect node");
        }
        removed
    }

    pub fn delete_node(&mut self, id: Uuid) -> usize {
        self.delete_nodes(&HashSet::from([id]))
    }

    /// Delete the selected nodes of the current level, the interior of any
    /// selected group, and every edge touching them. Returns the number of
    /// nodes removed.
    pub fn delete_selected(&mut self) -> usize {
        let selected: HashSet<Uuid> = self.selected_nodes().into_iter().collect();
        self.delete_nodes(&selected)
    }

    fn delete_nodes(&mut self, roots: &HashSet<Uuid>) -> usize {
        let roots: HashSet<Uuid> = roots
            .iter()
            .copied()
            .filter(|id| self.graph.node(*id).is_some())
            .collect();
        if roots.is_empty() {
            return 0;
        }
        let doomed = self.graph.with_descendants(&roots);

        self.graph.edges.retain(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target));
        self.graph.nodes.retain(|id, _| !doomed.contains(id));
        for node in self.graph.nodes.values_mut() {
            if node.parent_frame.is_some_and(|f| doomed.contains(&f)) {
                node.parent_frame = None;
            }
        }
        self.commit("delete nodes");
        doomed.len()
    }

    /// Splice an existing node into an edge, through the first of its
    /// ports that fit the edge on each side.
    pub fn insert_node_on_edge(&mut self, node_id: Uuid, edge_id: Uuid) -> Result<(), EditError> {
        let edge = self.graph.edge(edge_id).cloned().ok_or(EditError::EdgeNotFound(edge_id))?;
        if self.graph.node(node_id).is_none() {
            return Err(EditError::NodeNotFound(node_id));
        }
        if edge.touches(node_id) {
            return Err(EditError::SelfConnection(node_id));
        }
        let (output, input) = self
            .graph
            .effective_types(&edge.connection(), &self.catalog)
            .ok_or(EditError::EdgeNotFound(edge_id))?;

        let inputs = self.graph.ports(node_id, PortDirection::Input, &self.catalog);
        let outputs = self.graph.ports(node_id, PortDirection::Output, &self.catalog);
        let node_in = SourceSocket::output(output)
            .first_compatible(&inputs)
            .map(|p| p.id.clone())
            .ok_or(EditError::NoCompatiblePort(node_id))?;
        let node_out = SourceSocket::input(input)
            .first_compatible(&outputs)
            .map(|p| p.id.clone())
            .ok_or(EditError::NoCompatiblePort(node_id))?;

        self.transaction(|ed| {
            ed.graph.edges.retain(|e| e.id != edge_id);
            ed.try_connect(&Connection::new(edge.source, edge.source_port.clone(), node_id, node_in))?;
            ed.try_connect(&Connection::new(node_id, node_out, edge.target, edge.target_port.clone()))?;
            Ok(())
        })?;
        self.commit("insert node on edge");
        Ok(())
    }

    /// Add a node from the quick-add palette. When opened from a socket,
    /// the new node is wired to it through its first compatible port; if
    /// that fails nothing is added.
    pub fn quick_add(
        &mut self,
        node_type: &str,
        position: Position,
        socket: Option<SocketRef>,
    ) -> Result<Uuid, EditError> {
        let id = self.transaction(|ed| {
            let id = ed.insert_new_node(node_type, position, NodeData::new())?;
            if let Some(socket) = socket {
                ed.connect_new_node(id, &socket)?;
            }
            Ok(id)
        })?;
        self.commit("quick add");
        self.select_node(id, false);
        Ok(id)
    }

    fn connect_new_node(&mut self, new_node: Uuid, socket: &SocketRef) -> Result<Uuid, EditError> {
        let port_type = self
            .graph
            .port_type(socket.node, socket.direction, &socket.port, &self.catalog)
            .ok_or_else(|| EditError::PortNotFound {
                node: socket.node,
                port: socket.port.clone(),
                direction: socket.direction,
            })?;
        let candidates = self.graph.ports(new_node, socket.direction.opposite(), &self.catalog);
        let dragged = SourceSocket {
            port_type,
            direction: socket.direction,
        };
        let port = dragged
            .first_compatible(&candidates)
            .map(|p| p.id.clone())
            .ok_or(EditError::NoCompatiblePort(new_node))?;
        let connection = match socket.direction {
            PortDirection::Output => Connection::new(socket.node, socket.port.clone(), new_node, port),
            PortDirection::Input => Connection::new(new_node, port, socket.node, socket.port.clone()),
        };
        self.try_connect(&connection)
    }

    /// Palette entries for `search` and an optional dragged socket type.
    pub fn quick_add_results(
        &self,
        search: &str,
        socket: Option<SourceSocket>,
    ) -> Vec<crate::quick_add::QuickAddGroup<'_>> {
        let query = crate::quick_add::QuickAddQuery {
            search: search.to_string(),
            socket,
            include_deprecated: self.config.include_deprecated,
        };
        crate::quick_add::grouped(&self.catalog, &query)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add, editor};
    use super::*;

    #[test]
    fn add_node_merges_defaults() {
        let mut ed = editor();
        let id = ed
            .add_node("trigger.on_interval", Position::default(), NodeData::new().with("label", "fast"))
            .unwrap();
        let node = ed.node(id).unwrap();
        assert_eq!(node.data.get("interval"), Some(&1000.0.into()));
        assert_eq!(node.label(), "fast");
        assert_eq!(
            ed.add_node("nope.nothing", Position::default(), NodeData::new()),
            Err(EditError::UnknownNodeType("nope.nothing".into()))
        );
    }

    #[test]
    fn group_nodes_arrive_with_proxies() {
        let mut ed = editor();
        let group = ed.quick_add(catalog::GROUP, Position::new(50.0, 0.0), None).unwrap();
        let proxies: Vec<_> = ed.graph().nodes_in(Some(group)).map(|n| n.node_type.as_str()).collect();
        assert_eq!(proxies, vec![catalog::GROUP_INPUT, catalog::GROUP_OUTPUT]);

        let count = ed.graph().nodes.len();
        for proxy in [catalog::GROUP_INPUT, catalog::GROUP_OUTPUT] {
            assert_eq!(
                ed.add_node(proxy, Position::default(), NodeData::new()),
                Err(EditError::GroupBoundaryNode(proxy.into()))
            );
        }
        assert_eq!(ed.graph().nodes.len(), count);
    }

    #[test]
    fn hidden_sockets_show_only_wired_ports() {
        let mut ed = editor();
        let a = add(&mut ed, "data.number", 0.0, 0.0);
        let sum = add(&mut ed, "math.add", 200.0, 0.0);
        ed.connect(Connection::new(a, "value", sum, "b")).unwrap();
        let shown = |ed: &ScriptEditor| -> Vec<String> {
            ed.graph()
                .shown_ports(sum, PortDirection::Input, ed.catalog())
                .into_iter()
                .map(|p| p.id)
                .collect()
        };
        assert_eq!(shown(&ed), vec!["a", "b"]);

        ed.mark_saved();
        assert!(ed.toggle_socket_visibility(sum));
        assert!(ed.is_dirty());
        assert_eq!(shown(&ed), vec!["b"]);
        assert!(ed.toggle_socket_visibility(sum));
        assert_eq!(shown(&ed), vec!["a", "b"]);
    }

    #[test]
    fn update_missing_node_is_noop() {
        let mut ed = editor();
        assert!(!ed.update_node_data(Uuid::new_v4(), NodeData::new().with("x", 1.0)));
        assert!(!ed.is_dirty());
    }

    #[test]
    fn execution_inputs_take_one_edge_outputs_fan_out() {
        let mut ed = editor();
        let t1 = add(&mut ed, "trigger.on_tick", 0.0, 0.0);
        let t2 = add(&mut ed, "trigger.on_chat", 0.0, 100.0);
        let log = add(&mut ed, "action.log", 200.0, 0.0);
        let wait = add(&mut ed, "action.wait", 200.0, 100.0);

        ed.connect(Connection::new(t1, "exec_out", log, "exec_in")).unwrap();
        ed.connect(Connection::new(t1, "exec_out", wait, "exec_in")).unwrap();
        assert_eq!(ed.graph().edges.len(), 2);

        ed.connect(Connection::new(t2, "exec_out", log, "exec_in")).unwrap();
        let into_log: Vec<_> = ed.graph().edges.iter().filter(|e| e.target == log).collect();
        assert_eq!(into_log.len(), 1);
        assert_eq!(into_log[0].source, t2);
        assert_eq!(into_log[0].kind, EdgeKind::Execution);
    }

    #[test]
    fn multi_input_keeps_every_source() {
        let mut ed = editor();
        let a = add(&mut ed, "data.string", 0.0, 0.0);
        let b = add(&mut ed, "data.string", 0.0, 100.0);
        let join = add(&mut ed, "data.join", 200.0, 0.0);
        ed.connect(Connection::new(a, "value", join, "parts")).unwrap();
        ed.connect(Connection::new(b, "value", join, "parts")).unwrap();
        ed.connect(Connection::new(b, "value", join, "parts")).unwrap();
        assert_eq!(ed.graph().edges.len(), 2);
    }

    #[test]
    fn repeated_connect_records_nothing() {
        let mut ed = editor();
        let num = add(&mut ed, "data.number", 0.0, 0.0);
        let log = add(&mut ed, "action.log", 200.0, 0.0);
        let edge = ed.connect(Connection::new(num, "value", log, "message")).unwrap();
        ed.mark_saved();

        assert_eq!(ed.connect(Connection::new(num, "value", log, "message")), Ok(edge));
        assert!(!ed.is_dirty());
        assert!(ed.undo());
        assert!(ed.graph().edges.is_empty());
    }

    #[test]
    fn reroute_retype_cannot_break_fan_out() {
        let mut ed = editor();
        let reroute = ed.add_node(catalog::REROUTE, Position::default(), NodeData::new()).unwrap();
        let log = add(&mut ed, "action.log", 200.0, 0.0);
        let not = add(&mut ed, "logic.not", 200.0, 100.0);
        let players = add(&mut ed, "data.nearby_players", -200.0, 0.0);
        let text = add(&mut ed, "data.string", -200.0, 100.0);
        ed.connect(Connection::new(reroute, "out", log, "message")).unwrap();
        ed.connect(Connection::new(reroute, "out", not, "value")).unwrap();
        let before = ed.graph().clone();

        // list converts to string but not to boolean
        assert!(matches!(
            ed.connect(Connection::new(players, "players", reroute, "in")),
            Err(EditError::Incompatible { .. })
        ));
        assert_eq!(ed.graph(), &before);

        ed.connect(Connection::new(text, "value", reroute, "in")).unwrap();
        assert!(ed.graph().passthrough_conflicts(ed.catalog()).is_empty());
        assert_eq!(ed.graph().edges.len(), 3);
    }

    #[test]
    fn rejected_connection_changes_nothing() {
        let mut ed = editor();
        let num = add(&mut ed, "data.number", 0.0, 0.0);
        let log = add(&mut ed, "action.log", 200.0, 0.0);
        let before = ed.graph().clone();

        assert!(matches!(
            ed.connect(Connection::new(num, "value", log, "exec_in")),
            Err(EditError::Incompatible { .. })
        ));
        assert!(matches!(
            ed.connect(Connection::new(num, "nope", log, "message")),
            Err(EditError::PortNotFound { .. })
        ));
        assert_eq!(
            ed.connect(Connection::new(num, "value", num, "value")),
            Err(EditError::SelfConnection(num))
        );
        assert_eq!(ed.graph(), &before);
    }

    #[test]
    fn reconnect_is_transactional() {
        let mut ed = editor();
        let num = add(&mut ed, "data.number", 0.0, 0.0);
        let add_node = add(&mut ed, "math.add", 200.0, 0.0);
        let attack = add(&mut ed, "action.attack", 200.0, 100.0);
        let edge = ed.connect(Connection::new(num, "value", add_node, "a")).unwrap();

        let refused = ed.reconnect(edge, Connection::new(num, "value", attack, "bot"));
        assert!(refused.is_err());
        assert!(ed.graph().edge(edge).is_some());

        let moved = ed.reconnect(edge, Connection::new(num, "value", add_node, "b")).unwrap();
        assert!(ed.graph().edge(edge).is_none());
        assert_eq!(ed.graph().edge(moved).map(|e| e.target_port.as_str()), Some("b"));
    }

    #[test]
    fn delete_group_takes_its_interior() {
        let mut ed = editor();
        let a = add(&mut ed, "data.number", 0.0, 0.0);
        let b = add(&mut ed, "math.add", 100.0, 0.0);
        ed.connect(Connection::new(a, "value", b, "a")).unwrap();
        ed.select_nodes([a, b]);
        let group = ed.create_group_from_selection().unwrap();

        // group + two members + two proxies
        assert_eq!(ed.delete_node(group), 5);
        assert!(ed.graph().nodes.is_empty());
        assert!(ed.graph().edges.is_empty());
    }

    #[test]
    fn frame_drags_its_members() {
        let mut ed = editor();
        let a = add(&mut ed, "data.number", 10.0, 10.0);
        let frame = ed.create_frame(&[a], "Inputs").unwrap();
        let frame_pos = ed.node(frame).unwrap().position;

        ed.move_node(frame, frame_pos + Position::new(5.0, -5.0));
        assert_eq!(ed.node(a).unwrap().position, Position::new(15.0, 5.0));

        ed.select_nodes([frame, a]);
        ed.move_selected(Position::new(1.0, 0.0));
        assert_eq!(ed.node(a).unwrap().position, Position::new(16.0, 5.0));
    }

    #[test]
    fn insert_node_on_edge_uses_compatible_ports() {
        let mut ed = editor();
        let tick = add(&mut ed, "trigger.on_tick", 0.0, 0.0);
        let log = add(&mut ed, "action.log", 400.0, 0.0);
        let wait = add(&mut ed, "action.wait", 200.0, 0.0);
        let num = add(&mut ed, "data.number", 200.0, 200.0);
        let edge = ed.connect(Connection::new(tick, "exec_out", log, "exec_in")).unwrap();

        assert_eq!(ed.insert_node_on_edge(num, edge), Err(EditError::NoCompatiblePort(num)));
        assert!(ed.graph().edge(edge).is_some());

        ed.insert_node_on_edge(wait, edge).unwrap();
        let pairs: HashSet<_> = ed.graph().edges.iter().map(|e| (e.source, e.target)).collect();
        assert_eq!(pairs, HashSet::from([(tick, wait), (wait, log)]));
    }

    #[test]
    fn quick_add_wires_to_socket() {
        let mut ed = editor();
        let num = add(&mut ed, "data.number", 0.0, 0.0);
        let log = ed
            .quick_add("action.log", Position::new(200.0, 0.0), Some(SocketRef::output(num, "value")))
            .unwrap();
        let edge = &ed.graph().edges[0];
        assert_eq!((edge.source, edge.target, edge.target_port.as_str()), (num, log, "message"));
        assert_eq!(ed.selected_nodes(), vec![log]);

        let count = ed.graph().nodes.len();
        let refused = ed.quick_add("action.attack", Position::default(), Some(SocketRef::output(num, "value")));
        assert!(matches!(refused, Err(EditError::NoCompatiblePort(_))));
        assert_eq!(ed.graph().nodes.len(), count);
    }
}
