use crate::graph::ScriptGraph;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Linear snapshot history. `history[current_index]` is the state the
/// graph is in right now.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UndoStack {
    pub history: Vec<ScriptGraph>,
    pub current_index: usize,
    pub max_records: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_records: usize) -> Self {
        Self {
            history: Vec::new(),
            current_index: 0,
            max_records: max_records.max(1),
        }
    }

    /// Drop all history and start over from `graph`.
    pub fn reset(&mut self, graph: &ScriptGraph) {
        self.history.clear();
        self.history.push(graph.clone());
        self.current_index = 0;
    }

    pub fn push(&mut self, graph: &ScriptGraph) {
        // Recording after an undo discards the redo branch
        if self.current_index + 1 < self.history.len() {
            self.history.truncate(self.current_index + 1);
        }

        self.history.push(graph.clone());
        self.current_index = self.history.len() - 1;

        if self.history.len() > self.max_records {
            self.history.remove(0);
            self.current_index = self.current_index.saturating_sub(1);
        }
    }

    pub fn undo(&mut self) -> Option<ScriptGraph> {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.history.get(self.current_index).cloned()
        } else {
            None
        }
    }

    pub fn redo(&mut self) -> Option<ScriptGraph> {
        if self.current_index + 1 < self.history.len() {
            self.current_index += 1;
            self.history.get(self.current_index).cloned()
        } else {
            None
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.history.len()
    }
}
