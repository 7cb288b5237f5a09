use super::ScriptEditor;
use crate::algorithms::{self, AlignEdge, DistributeAxis};
use crate::catalog;
use crate::graph::{Edge, Node, NodeKind, Position, Size};
use crate::node_types::{PortDirection, PortType};
use std::collections::HashSet;
use uuid::Uuid;

impl ScriptEditor {
    fn selected_positions(&self) -> Vec<(Uuid, Position)> {
        self.visible_nodes()
            .filter(|n| n.selected)
            .map(|n| (n.id, n.position))
            .collect()
    }

    fn apply_positions(&mut self, positions: Vec<(Uuid, Position)>) {
        for (id, position) in positions {
            if let Some(node) = self.graph.node_mut(id) {
                node.position = position;
            }
        }
    }

    /// Snap the selection to a common edge. Needs at least two nodes.
    pub fn align_selected(&mut self, edge: AlignEdge) -> bool {
        let Some(aligned) = algorithms::align(&self.selected_positions(), edge) else {
            return false;
        };
        self.apply_positions(aligned);
        self.commit("align");
        true
    }

    /// Space the selection evenly along an axis. Needs at least three nodes.
    pub fn distribute_selected(&mut self, axis: DistributeAxis) -> bool {
        let Some(spread) = algorithms::distribute(&self.selected_positions(), axis) else {
            return false;
        };
        self.apply_positions(spread);
        self.commit("distribute");
        true
    }

    /// Split an edge with a reroute node at `position`.
    pub fn insert_reroute(&mut self, edge_id: Uuid, position: Position) -> Option<Uuid> {
        let index = self.graph.edges.iter().position(|e| e.id == edge_id)?;
        let edge = self.graph.edges[index].clone();
        let source = self.graph.node(edge.source)?;
        let level = source.parent_group;
        let output = self
            .graph
            .port_type(edge.source, PortDirection::Output, &edge.source_port, &self.catalog)
            .unwrap_or(PortType::Any);
        let resolved_type = if output.is_concrete() {
            output
        } else {
            self.graph
                .port_type(edge.target, PortDirection::Input, &edge.target_port, &self.catalog)
                .unwrap_or(PortType::Any)
        };

        let mut reroute = Node::new(catalog::REROUTE, position);
        reroute.parent_group = level;
        reroute.kind = NodeKind::Reroute { resolved_type };
        let id = reroute.id;
        self.graph.insert_node(reroute);

        let incoming = Edge {
            id: Uuid::new_v4(),
            target: id,
            target_port: catalog::REROUTE_IN.into(),
            ..edge.clone()
        };
        let outgoing = Edge {
            id: Uuid::new_v4(),
            source: id,
            source_port: catalog::REROUTE_OUT.into(),
            ..edge
        };
        self.graph.edges.splice(index..=index, [incoming, outgoing]);
        self.commit("insert reroute");
        Some(id)
    }

    /// Put the given nodes of the current level in a new frame sized to
    /// enclose them.
    pub fn create_frame(&mut self, members: &[Uuid], label: impl Into<String>) -> Option<Uuid> {
        let members: Vec<Uuid> = members.iter().copied().filter(|id| self.is_visible(*id)).collect();
        let positions: Vec<Position> = members.iter().filter_map(|id| self.graph.node(*id)).map(|n| n.position).collect();
        if positions.is_empty() {
            return None;
        }
        let pad = self.config.frame_padding;
        let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = positions.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = positions.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        let mut frame = Node::new(catalog::FRAME, Position::new(min_x - pad, min_y - pad));
        frame.parent_group = self.current_group();
        frame.kind = NodeKind::Frame {
            label: label.into(),
            size: Size {
                width: max_x - min_x + pad * 2.0,
                height: max_y - min_y + pad * 2.0,
            },
        };
        let frame_id = frame.id;
        self.graph.insert_node(frame);
        for id in members {
            if let Some(node) = self.graph.node_mut(id) {
                node.parent_frame = Some(frame_id);
            }
        }
        self.commit("create frame");
        Some(frame_id)
    }

    pub fn remove_from_frame(&mut self, id: Uuid) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        if node.parent_frame.take().is_none() {
            return false;
        }
        self.commit("remove from frame");
        true
    }

    pub fn resize_frame(&mut self, id: Uuid, new_size: Size) -> bool {
        let Some(NodeKind::Frame { size, .. }) = self.graph.node_mut(id).map(|n| &mut n.kind) else {
            return false;
        };
        *size = new_size;
        self.commit("resize frame");
        true
    }

    pub fn add_note(&mut self, position: Position, text: impl Into<String>) -> Uuid {
        let mut note = Node::new(catalog::NOTE, position);
        note.parent_group = self.current_group();
        note.kind = NodeKind::Note { text: text.into() };
        let id = note.id;
        self.graph.insert_node(note);
        self.commit("add note");
        id
    }

    /// Straight-line stand-in for a drawn edge, between the configured
    /// anchors on its two nodes.
    fn edge_segment(&self, edge: &Edge) -> Option<(Position, Position)> {
        let source = self.graph.node(edge.source)?;
        let target = self.graph.node(edge.target)?;
        Some((
            source.position + self.config.edge_source_anchor,
            target.position + self.config.edge_target_anchor,
        ))
    }

    /// Remove every visible edge crossed by the stroke `start`-`end`.
    /// Returns how many were cut.
    pub fn cut_links(&mut self, start: Position, end: Position) -> usize {
        let doomed: HashSet<Uuid> = self
            .visible_edges()
            .filter(|e| {
                self.edge_segment(e)
                    .is_some_and(|(a, b)| algorithms::segments_cross(start, end, a, b))
            })
            .map(|e| e.id)
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        self.graph.edges.retain(|e| !doomed.contains(&e.id));
        log::debug!("Cut {} links", doomed.len());
        self.commit("cut links");
        doomed.len()
    }

    /// Visible edge nearest to `point`, if one lies closer than `threshold`.
    pub fn closest_edge(&self, point: Position, threshold: f32) -> Option<Uuid> {
        self.visible_edges()
            .filter_map(|e| {
                let (a, b) = self.edge_segment(e)?;
                let distance = algorithms::distance_to_segment(point, a, b);
                (distance < threshold).then_some((e.id, distance))
            })
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(id, _)| id)
    }
}
