//! # Script Editor
//!
//! The mutable editing session over one script graph. Every command
//! arrives here as a named operation with explicit parameters and runs to
//! completion before returning.
//!
//! ## Submodules
//! - [`mutations`]: add/update/delete nodes, connect and reconnect edges
//! - [`grouping`]: group navigation, grouping and ungrouping
//! - [`selection`]: selection and graph-traversal selection commands
//! - [`layout`]: align, distribute, reroutes, frames and notes
//! - [`paste`]: copy, paste and duplicate
//! - [`runtime`]: debug samples and previews reported during a run
//!
//! ## Main Type
//! [`ScriptEditor`] - owns the graph, its history and the navigation stack

pub mod grouping;
pub mod layout;
pub mod mutations;
pub mod paste;
pub mod runtime;
pub mod selection;

use crate::catalog::NodeCatalog;
use crate::config::EditorConfig;
use crate::diff::GraphDiff;
use crate::document::{ScriptDocument, ScriptMetadata};
use crate::error::{DocumentError, EditError};
use crate::graph::{Diagnostic, Edge, Node, ScriptGraph};
use crate::history::UndoStack;
use crate::value::NodeData;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub use grouping::Breadcrumb;
pub use mutations::SocketRef;
pub use runtime::DebugSample;

pub struct ScriptEditor {
    graph: ScriptGraph,
    catalog: Arc<NodeCatalog>,
    config: EditorConfig,
    /// Open groups, outermost first. Empty at the root level.
    group_edit_stack: Vec<Uuid>,
    /// Node shown in the inspector panel.
    focused_node: Option<Uuid>,
    metadata: ScriptMetadata,
    dirty: bool,
    /// Set by the execution collaborator while the script runs.
    running: bool,
    active_node: Option<Uuid>,
    history: UndoStack,
    /// Graph as of the last save or load.
    saved: ScriptGraph,
    debug_samples: HashMap<Uuid, Vec<DebugSample>>,
    preview_nodes: HashSet<Uuid>,
    preview_values: HashMap<Uuid, NodeData>,
}

impl ScriptEditor {
    pub fn new(catalog: Arc<NodeCatalog>, config: EditorConfig) -> Self {
        Self::with_graph(catalog, config, ScriptMetadata::default(), ScriptGraph::new())
    }

    pub fn from_document(document: &ScriptDocument, catalog: Arc<NodeCatalog>, config: EditorConfig) -> Self {
        Self::with_graph(catalog, config, document.metadata.clone(), document.graph())
    }

    fn with_graph(
        catalog: Arc<NodeCatalog>,
        config: EditorConfig,
        metadata: ScriptMetadata,
        mut graph: ScriptGraph,
    ) -> Self {
        graph.refresh_passthrough_types(&catalog);
        let mut history = UndoStack::with_limit(config.history_limit);
        history.reset(&graph);
        Self {
            saved: graph.clone(),
            graph,
            catalog,
            config,
            group_edit_stack: Vec::new(),
            focused_node: None,
            metadata,
            dirty: false,
            running: false,
            active_node: None,
            history,
            debug_samples: HashMap::new(),
            preview_nodes: HashSet::new(),
            preview_values: HashMap::new(),
        }
    }

    pub fn load(path: &Path, catalog: Arc<NodeCatalog>, config: EditorConfig) -> Result<Self, DocumentError> {
        let document = ScriptDocument::load(path)?;
        Ok(Self::from_document(&document, catalog, config))
    }

    pub fn graph(&self) -> &ScriptGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Group whose interior is being edited; `None` at the root.
    pub fn current_group(&self) -> Option<Uuid> {
        self.group_edit_stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.group_edit_stack.len()
    }

    /// Nodes of the level currently open for editing, proxies included.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.nodes_in(self.current_group())
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &Edge> {
        let level = self.current_group();
        self.graph
            .edges
            .iter()
            .filter(move |e| self.graph.node(e.source).is_some_and(|n| n.parent_group == level))
    }

    pub fn is_visible(&self, id: Uuid) -> bool {
        self.graph
            .node(id)
            .is_some_and(|n| n.parent_group == self.current_group())
    }

    // ---- session state ----

    pub fn metadata(&self) -> &ScriptMetadata {
        &self.metadata
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.metadata.name = name.into();
        self.dirty = true;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.metadata.description = description.into();
        self.dirty = true;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.metadata.paused != paused {
            self.metadata.paused = paused;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        if !running {
            self.active_node = None;
        }
    }

    /// Node currently executing, as reported by the runner.
    pub fn active_node(&self) -> Option<Uuid> {
        self.active_node
    }

    pub fn set_active_node(&mut self, node: Option<Uuid>) {
        self.active_node = node.filter(|id| self.graph.node(*id).is_some());
    }

    /// Record the current graph as saved.
    pub fn mark_saved(&mut self) {
        self.metadata.modified = Utc::now();
        self.saved = self.graph.clone();
        self.dirty = false;
    }

    pub fn changes_since_save(&self) -> GraphDiff {
        GraphDiff::between(&self.saved, &self.graph)
    }

    /// Serialized form for the persistence collaborator.
    pub fn document(&self) -> ScriptDocument {
        ScriptDocument::new(self.metadata.clone(), &self.graph)
    }

    pub fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        let previous = self.metadata.modified;
        self.metadata.modified = Utc::now();
        if let Err(err) = self.document().save(path) {
            self.metadata.modified = previous;
            return Err(err);
        }
        self.saved = self.graph.clone();
        self.dirty = false;
        Ok(())
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.graph.diagnostics(&self.catalog)
    }

    pub fn complexity_score(&self) -> f32 {
        self.graph.complexity_score(&self.catalog)
    }

    // ---- history ----

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(graph) => {
                self.restore(graph);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(graph) => {
                self.restore(graph);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, graph: ScriptGraph) {
        self.graph = graph;
        // Keep the navigation path valid: cut it at the first group that
        // no longer exists.
        if let Some(cut) = self
            .group_edit_stack
            .iter()
            .position(|id| !self.graph.node(*id).is_some_and(|n| n.is_group()))
        {
            self.group_edit_stack.truncate(cut);
        }
        self.prune_references();
        self.dirty = true;
    }

    /// Finish a mutation: re-resolve pass-through types, record history and
    /// mark the script dirty.
    fn commit(&mut self, action: &str) {
        self.graph.refresh_passthrough_types(&self.catalog);
        self.prune_references();
        self.history.push(&self.graph);
        self.dirty = true;
        log::debug!(
            "{}: {} nodes, {} edges",
            action,
            self.graph.nodes.len(),
            self.graph.edges.len()
        );
    }

    fn prune_references(&mut self) {
        if self.focused_node.is_some_and(|id| self.graph.node(id).is_none()) {
            self.focused_node = None;
        }
        if self.active_node.is_some_and(|id| self.graph.node(id).is_none()) {
            self.active_node = None;
        }
        self.prune_runtime_state();
    }

    /// Run `f` against the graph; when it fails, put the graph back the way
    /// it was.
    fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, EditError>) -> Result<T, EditError> {
        let before = self.graph.clone();
        let result = f(self);
        if result.is_err() {
            self.graph = before;
        }
        result
    }
}
