use crate::error::DocumentError;
use crate::graph::Position;
use crate::history::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Editor settings. Every field has a default, so a partial settings file
/// is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Offset applied to duplicated nodes so the originals stay visible.
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: Position,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Placement of the group-input proxy relative to the group origin.
    #[serde(default = "default_group_input_offset")]
    pub group_input_offset: Position,
    #[serde(default = "default_group_output_offset")]
    pub group_output_offset: Position,
    /// Margin around the members of a newly created frame.
    #[serde(default = "default_frame_padding")]
    pub frame_padding: f32,
    /// Offer deprecated definitions in quick-add.
    #[serde(default)]
    pub include_deprecated: bool,
    /// Samples kept per debug node.
    #[serde(default = "default_debug_history_limit")]
    pub debug_history_limit: usize,
    /// Where an edge leaves its source node and enters its target node,
    /// relative to the node position. Used for link cutting and edge
    /// picking.
    #[serde(default = "default_edge_source_anchor")]
    pub edge_source_anchor: Position,
    #[serde(default = "default_edge_target_anchor")]
    pub edge_target_anchor: Position,
}

fn default_duplicate_offset() -> Position {
    Position::new(50.0, 50.0)
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_group_input_offset() -> Position {
    Position::new(-200.0, 0.0)
}

fn default_group_output_offset() -> Position {
    Position::new(200.0, 0.0)
}

fn default_frame_padding() -> f32 {
    40.0
}

fn default_debug_history_limit() -> usize {
    50
}

fn default_edge_source_anchor() -> Position {
    Position::new(80.0, 40.0)
}

fn default_edge_target_anchor() -> Position {
    Position::new(0.0, 40.0)
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            duplicate_offset: default_duplicate_offset(),
            history_limit: default_history_limit(),
            group_input_offset: default_group_input_offset(),
            group_output_offset: default_group_output_offset(),
            frame_padding: default_frame_padding(),
            include_deprecated: false,
            debug_history_limit: default_debug_history_limit(),
            edge_source_anchor: default_edge_source_anchor(),
            edge_target_anchor: default_edge_target_anchor(),
        }
    }
}

impl EditorConfig {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        log::info!("Loaded editor settings from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `<config dir>/script-graph/editor.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("script-graph").join("editor.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"history_limit": 20, "include_deprecated": true}"#).unwrap();
        assert_eq!(config.history_limit, 20);
        assert!(config.include_deprecated);
        assert_eq!(config.duplicate_offset, Position::new(50.0, 50.0));
        assert_eq!(config.group_input_offset, Position::new(-200.0, 0.0));
        assert_eq!(config.debug_history_limit, 50);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = EditorConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("editor.json");
        let config = EditorConfig {
            frame_padding: 12.0,
            ..EditorConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }
}
