//! Port types, port definitions and node definitions.
//!
//! This module is the type system of the script graph: which port types
//! exist, which implicit conversions are allowed between them, and how
//! pass-through ports (reroutes, group boundaries) pick up a type from
//! whatever they are wired to.

use crate::value::NodeData;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data type carried by a port.
///
/// `Execution` is the control-flow rail and never mixes with data types.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Execution,
    Number,
    Boolean,
    String,
    Vector3,
    Entity,
    Bot,
    Block,
    Item,
    List,
    Any,
}

impl PortType {
    pub const ALL: [PortType; 11] = [
        PortType::Execution,
        PortType::Number,
        PortType::Boolean,
        PortType::String,
        PortType::Vector3,
        PortType::Entity,
        PortType::Bot,
        PortType::Block,
        PortType::Item,
        PortType::List,
        PortType::Any,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PortType::Execution => "execution",
            PortType::Number => "number",
            PortType::Boolean => "boolean",
            PortType::String => "string",
            PortType::Vector3 => "vector3",
            PortType::Entity => "entity",
            PortType::Bot => "bot",
            PortType::Block => "block",
            PortType::Item => "item",
            PortType::List => "list",
            PortType::Any => "any",
        }
    }

    pub fn is_execution(self) -> bool {
        self == PortType::Execution
    }

    /// Anything but `Any`.
    pub fn is_concrete(self) -> bool {
        self != PortType::Any
    }

    /// Targets this type converts to implicitly. One hop only: the table
    /// is not closed transitively.
    pub fn implicit_conversions(self) -> &'static [PortType] {
        match self {
            PortType::Number => &[PortType::String, PortType::Boolean],
            PortType::Boolean => &[PortType::String, PortType::Number],
            PortType::String => &[PortType::Number, PortType::Boolean],
            PortType::Vector3 => &[PortType::List],
            PortType::List => &[PortType::String],
            PortType::Bot
            | PortType::Entity
            | PortType::Block
            | PortType::Item
            | PortType::Execution
            | PortType::Any => &[],
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        // "exec" is the short form used in port ids
        if lower == "exec" {
            return Ok(PortType::Execution);
        }
        PortType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("unknown port type '{}'", s))
    }
}

/// Decide whether an output of type `source` may feed an input of type
/// `target`.
///
/// Pure predicate: it is checked before any mutation is attempted.
pub fn can_connect(source: PortType, target: PortType) -> bool {
    if source == target {
        return true;
    }
    // Execution isolation wins over the `any` wildcard.
    if source.is_execution() || target.is_execution() {
        return false;
    }
    if source == PortType::Any || target == PortType::Any {
        return true;
    }
    source.implicit_conversions().contains(&target)
}

/// Effective type of a pass-through port given the types attached to it
/// through existing connections: the first concrete type wins, otherwise
/// `Any`.
pub fn resolve_passthrough<I>(attached: I) -> PortType
where
    I: IntoIterator<Item = PortType>,
{
    attached
        .into_iter()
        .find(|t| t.is_concrete())
        .unwrap_or(PortType::Any)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn opposite(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PortDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub port_type: PortType,
    /// String-encoded default, parsed against `port_type` when read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Element type for list ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<PortType>,
    /// Data input that accepts several inbound edges.
    #[serde(default)]
    pub multi_input: bool,
}

impl PortDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            port_type,
            default_value: None,
            required: false,
            description: None,
            element_type: None,
            multi_input: false,
        }
    }

    pub fn exec(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, PortType::Execution)
    }

    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default_value = Some(raw.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multi_input(mut self) -> Self {
        self.multi_input = true;
        self
    }

    pub fn list_of(mut self, element: PortType) -> Self {
        self.element_type = Some(element);
        self
    }
}

/// Template for node instances. Supplied once per session and never
/// mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeDefinition {
    #[serde(rename = "type")]
    pub node_type: String,
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<PortDefinition>,
    #[serde(default)]
    pub outputs: Vec<PortDefinition>,
    #[serde(default)]
    pub default_data: NodeData,
    #[serde(default)]
    pub trigger: bool,
    /// Deprecation notice; `Some` marks the definition as deprecated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl NodeDefinition {
    pub fn new(
        node_type: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            category: category.into(),
            icon: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            default_data: NodeData::default(),
            trigger: false,
            deprecated: None,
        }
    }

    pub fn input(&self, port_id: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&PortDefinition> {
        self.outputs.iter().find(|p| p.id == port_id)
    }

    pub fn port(&self, direction: PortDirection, port_id: &str) -> Option<&PortDefinition> {
        match direction {
            PortDirection::Input => self.input(port_id),
            PortDirection::Output => self.output(port_id),
        }
    }

    pub fn ports(&self, direction: PortDirection) -> &[PortDefinition] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    pub fn is_layout(&self) -> bool {
        self.node_type.starts_with(crate::catalog::LAYOUT_PREFIX)
    }

    /// Loop-style nodes expose an execution output called `loop`.
    pub fn is_loop(&self) -> bool {
        self.outputs
            .iter()
            .any(|p| p.port_type.is_execution() && (p.id == "loop" || p.id == "exec_loop"))
    }
}
