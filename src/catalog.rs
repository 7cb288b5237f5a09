//! The node definition catalog.
//!
//! Definitions arrive once per editing session (from the backend, a JSON
//! file, or [`crate::builtin_nodes::standard_catalog`]). The catalog always
//! carries the layout definitions on top of whatever it was given.

use crate::error::DocumentError;
use crate::node_types::{NodeDefinition, PortDefinition, PortDirection, PortType};
use crate::value::NodeData;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const LAYOUT_PREFIX: &str = "layout.";
pub const LAYOUT_CATEGORY: &str = "layout";

pub const REROUTE: &str = "layout.reroute";
pub const FRAME: &str = "layout.frame";
pub const NOTE: &str = "layout.note";
pub const GROUP: &str = "layout.group";
pub const GROUP_INPUT: &str = "layout.group_input";
pub const GROUP_OUTPUT: &str = "layout.group_output";
pub const DEBUG: &str = "layout.debug";

/// Reroute port ids.
pub const REROUTE_IN: &str = "in";
pub const REROUTE_OUT: &str = "out";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
}

impl CategoryInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            description: String::new(),
            sort_order,
        }
    }
}

/// On-disk shape of a catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<CategoryInfo>,
    #[serde(default)]
    pub node_types: Vec<NodeDefinition>,
}

#[derive(Clone, Debug)]
pub struct NodeCatalog {
    definitions: IndexMap<String, NodeDefinition>,
    categories: Vec<CategoryInfo>,
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl NodeCatalog {
    pub fn new(definitions: Vec<NodeDefinition>, categories: Vec<CategoryInfo>) -> Self {
        let mut map = IndexMap::new();
        for def in definitions {
            if map.contains_key(&def.node_type) {
                log::warn!("Duplicate node definition '{}', keeping the last one", def.node_type);
            }
            map.insert(def.node_type.clone(), def);
        }
        for def in layout_definitions() {
            map.insert(def.node_type.clone(), def);
        }

        let mut categories = categories;
        categories.retain(|c| c.id != LAYOUT_CATEGORY);
        categories.sort_by_key(|c| c.sort_order);
        let mut layout = CategoryInfo::new(LAYOUT_CATEGORY, "Layout", 1000);
        layout.description = "Nodes for organizing your script visually".into();
        categories.push(layout);

        Self {
            definitions: map,
            categories,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::new(file.node_types, file.categories))
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!(
            "Loaded {} node definitions from {}",
            catalog.definitions.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeDefinition> {
        self.definitions.get(node_type)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.definitions.contains_key(node_type)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Categories in display order; the layout category is always last.
    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a NodeDefinition> {
        self.definitions.values().filter(move |d| d.category == category)
    }

    /// Default data of `node_type` with `overrides` merged on top.
    pub fn create_node_data(&self, node_type: &str, overrides: NodeData) -> Option<NodeData> {
        let def = self.get(node_type)?;
        let mut data = def.default_data.clone();
        data.merge(overrides);
        Some(data)
    }

    pub fn port_type(&self, node_type: &str, direction: PortDirection, port_id: &str) -> Option<PortType> {
        self.get(node_type)?
            .port(direction, port_id)
            .map(|p| p.port_type)
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            categories: self
                .categories
                .iter()
                .filter(|c| c.id != LAYOUT_CATEGORY)
                .cloned()
                .collect(),
            node_types: self
                .definitions
                .values()
                .filter(|d| !d.is_layout())
                .cloned()
                .collect(),
        }
    }
}

fn layout_definition(
    node_type: &str,
    label: &str,
    icon: &str,
    description: &str,
    keywords: &[&str],
) -> NodeDefinition {
    let mut def = NodeDefinition::new(node_type, label, LAYOUT_CATEGORY);
    def.icon = icon.into();
    def.description = description.into();
    def.keywords = keywords.iter().map(|k| k.to_string()).collect();
    def
}

/// Layout node types. Their ports are dynamic (reroute, group boundary)
/// or absent (frame, note); the definitions here only describe them for
/// the palette.
pub fn layout_definitions() -> Vec<NodeDefinition> {
    let mut reroute = layout_definition(
        REROUTE,
        "Reroute",
        "Circle",
        "A pass-through node for organizing connections",
        &["reroute", "redirect", "organize", "passthrough"],
    );
    reroute.inputs = vec![PortDefinition::new(REROUTE_IN, "", PortType::Any)];
    reroute.outputs = vec![PortDefinition::new(REROUTE_OUT, "", PortType::Any)];

    let mut debug = layout_definition(
        DEBUG,
        "Debug",
        "Bug",
        "Debug node for inspecting values during execution",
        &["debug", "viewer", "inspect", "watch", "log"],
    );
    debug.inputs = vec![PortDefinition::new("in", "In", PortType::Any)];
    debug.outputs = vec![PortDefinition::new("out", "Out", PortType::Any)];

    vec![
        reroute,
        layout_definition(
            FRAME,
            "Frame",
            "Square",
            "A visual container for grouping related nodes",
            &["frame", "group", "organize", "container"],
        ),
        layout_definition(
            GROUP,
            "Node Group",
            "Layers",
            "A reusable composite node containing a sub-graph",
            &["group", "subgraph", "reusable", "composite"],
        ),
        layout_definition(
            GROUP_INPUT,
            "Group Input",
            "ArrowRightFromLine",
            "Defines inputs for a node group (inside the group)",
            &["input", "group"],
        ),
        layout_definition(
            GROUP_OUTPUT,
            "Group Output",
            "ArrowLeftFromLine",
            "Defines outputs for a node group (inside the group)",
            &["output", "group"],
        ),
        debug,
        layout_definition(
            NOTE,
            "Note",
            "StickyNote",
            "A sticky note for adding comments and annotations",
            &["note", "comment", "annotation", "sticky", "text"],
        ),
    ]
}
