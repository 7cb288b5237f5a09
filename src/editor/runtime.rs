//! State fed back by the execution collaborator while a script runs.
//! None of it is part of the script: it is never saved, never enters the
//! undo history and never marks the editor dirty.

use super::ScriptEditor;
use crate::catalog;
use crate::value::{NodeData, NodeValue};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One value observed by a debug node.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DebugSample {
    pub value: NodeValue,
    pub timestamp: DateTime<Utc>,
}

impl ScriptEditor {
    /// Append a value to a debug node's history, dropping the oldest sample
    /// beyond the configured limit. Non-debug nodes are ignored.
    pub fn record_debug_value(&mut self, id: Uuid, value: NodeValue) -> bool {
        if !self.graph.node(id).is_some_and(|n| n.node_type == catalog::DEBUG) {
            return false;
        }
        let limit = self.config.debug_history_limit.max(1);
        let samples = self.debug_samples.entry(id).or_default();
        samples.push(DebugSample {
            value,
            timestamp: Utc::now(),
        });
        if samples.len() > limit {
            let excess = samples.len() - limit;
            samples.drain(..excess);
        }
        true
    }

    /// Samples for a debug node, oldest first.
    pub fn debug_history(&self, id: Uuid) -> &[DebugSample] {
        self.debug_samples.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn latest_debug_value(&self, id: Uuid) -> Option<&NodeValue> {
        self.debug_history(id).last().map(|s| &s.value)
    }

    pub fn clear_debug_values(&mut self, id: Uuid) {
        self.debug_samples.remove(&id);
    }

    /// Turn the inline output preview of a node on or off. Returns the new
    /// state; a missing node stays off.
    pub fn toggle_preview(&mut self, id: Uuid) -> bool {
        if self.graph.node(id).is_none() {
            return false;
        }
        if self.preview_nodes.remove(&id) {
            return false;
        }
        self.preview_nodes.insert(id);
        true
    }

    pub fn is_preview_enabled(&self, id: Uuid) -> bool {
        self.preview_nodes.contains(&id)
    }

    /// Replace the output values shown in a node's preview.
    pub fn update_preview_value(&mut self, id: Uuid, outputs: NodeData) -> bool {
        if self.graph.node(id).is_none() {
            return false;
        }
        self.preview_values.insert(id, outputs);
        true
    }

    pub fn preview_value(&self, id: Uuid) -> Option<&NodeData> {
        self.preview_values.get(&id)
    }

    /// Forget runtime state of nodes that no longer exist.
    pub(super) fn prune_runtime_state(&mut self) {
        let graph = &self.graph;
        self.debug_samples.retain(|id, _| graph.node(*id).is_some());
        self.preview_nodes.retain(|id| graph.node(*id).is_some());
        self.preview_values.retain(|id, _| graph.node(*id).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add, editor};
    use super::*;
    use crate::builtin_nodes::standard_catalog;
    use crate::config::EditorConfig;
    use std::sync::Arc;

    #[test]
    fn debug_history_keeps_the_newest_samples() {
        let config = EditorConfig {
            debug_history_limit: 3,
            ..EditorConfig::default()
        };
        let mut ed = ScriptEditor::new(Arc::new(standard_catalog()), config);
        let debug = add(&mut ed, catalog::DEBUG, 0.0, 0.0);
        let num = add(&mut ed, "data.number", 0.0, 100.0);
        ed.mark_saved();

        for n in 0..5 {
            assert!(ed.record_debug_value(debug, NodeValue::Number(n as f64)));
        }
        let values: Vec<_> = ed.debug_history(debug).iter().map(|s| s.value.clone()).collect();
        assert_eq!(values, vec![NodeValue::Number(2.0), NodeValue::Number(3.0), NodeValue::Number(4.0)]);
        assert_eq!(ed.latest_debug_value(debug), Some(&NodeValue::Number(4.0)));
        assert!(!ed.record_debug_value(num, NodeValue::Null));
        assert!(!ed.is_dirty());

        ed.clear_debug_values(debug);
        assert!(ed.debug_history(debug).is_empty());
    }

    #[test]
    fn deleting_a_node_drops_its_runtime_state() {
        let mut ed = editor();
        let debug = add(&mut ed, catalog::DEBUG, 0.0, 0.0);
        ed.record_debug_value(debug, NodeValue::Boolean(true));
        assert!(ed.toggle_preview(debug));
        ed.update_preview_value(debug, NodeData::new().with("out", 1.0));

        ed.delete_node(debug);
        assert!(ed.debug_history(debug).is_empty());
        assert!(!ed.is_preview_enabled(debug));
        assert!(ed.preview_value(debug).is_none());
    }

    #[test]
    fn preview_toggles() {
        let mut ed = editor();
        let num = add(&mut ed, "data.number", 0.0, 0.0);
        assert!(ed.toggle_preview(num));
        assert!(ed.is_preview_enabled(num));
        assert!(!ed.toggle_preview(num));
        assert!(!ed.is_preview_enabled(num));
        assert!(!ed.toggle_preview(Uuid::new_v4()));
        assert!(!ed.update_preview_value(Uuid::new_v4(), NodeData::new()));
    }
}
