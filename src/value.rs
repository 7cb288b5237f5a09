//! Node data payloads.
//!
//! Node data is a map from field key to [`NodeValue`]. It is stored as
//! written and validated against the owning [`NodeDefinition`] when read,
//! so a catalog change never invalidates a loaded script wholesale.

use crate::error::FieldError;
use crate::node_types::{NodeDefinition, PortType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NodeValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Vector3(Vector3),
    List(Vec<NodeValue>),
    Map(BTreeMap<String, NodeValue>),
}

impl NodeValue {
    /// Port type this value naturally belongs to, if any.
    pub fn value_type(&self) -> Option<PortType> {
        match self {
            NodeValue::Boolean(_) => Some(PortType::Boolean),
            NodeValue::Number(_) => Some(PortType::Number),
            NodeValue::String(_) => Some(PortType::String),
            NodeValue::Vector3(_) => Some(PortType::Vector3),
            NodeValue::List(_) => Some(PortType::List),
            NodeValue::Null | NodeValue::Map(_) => None,
        }
    }

    /// Whether the value can be stored as-is in a field of type `ty`.
    /// `Null` always conforms: it means "unset".
    pub fn conforms_to(&self, ty: PortType) -> bool {
        match (self, ty) {
            (NodeValue::Null, _) => true,
            (_, PortType::Any) => true,
            (_, PortType::Execution) => false,
            // Runtime references are identified by name or uuid.
            (
                NodeValue::String(_) | NodeValue::Map(_),
                PortType::Entity | PortType::Bot | PortType::Block | PortType::Item,
            ) => true,
            (value, ty) => value.value_type() == Some(ty),
        }
    }

    /// Apply the implicit conversions of the type system to a stored value.
    pub fn coerce(&self, ty: PortType) -> Option<NodeValue> {
        if self.conforms_to(ty) {
            return Some(self.clone());
        }
        let from = self.value_type()?;
        if !from.implicit_conversions().contains(&ty) {
            return None;
        }
        match ty {
            PortType::String => Some(NodeValue::String(self.to_string())),
            PortType::Boolean => Some(NodeValue::Boolean(self.as_bool())),
            PortType::Number => self.as_number().map(NodeValue::Number),
            PortType::List => match self {
                NodeValue::Vector3(v) => Some(NodeValue::List(vec![
                    NodeValue::Number(v.x),
                    NodeValue::Number(v.y),
                    NodeValue::Number(v.z),
                ])),
                _ => None,
            },
            _ => None,
        }
    }

    /// Parse a string-encoded port default against its declared type.
    pub fn parse(raw: &str, ty: PortType) -> Option<NodeValue> {
        let trimmed = raw.trim();
        match ty {
            PortType::Execution => None,
            PortType::Number => trimmed.parse::<f64>().ok().map(NodeValue::Number),
            PortType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(NodeValue::Boolean(true)),
                "false" | "0" | "" => Some(NodeValue::Boolean(false)),
                _ => None,
            },
            PortType::String
            | PortType::Entity
            | PortType::Bot
            | PortType::Block
            | PortType::Item => Some(NodeValue::String(raw.to_string())),
            PortType::Vector3 => {
                let parts: Vec<f64> = trimmed
                    .trim_matches(|c| c == '(' || c == ')' || c == '[' || c == ']')
                    .split(',')
                    .map(|p| p.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .ok()?;
                match parts.as_slice() {
                    [x, y, z] => Some(NodeValue::Vector3(Vector3 { x: *x, y: *y, z: *z })),
                    _ => None,
                }
            }
            PortType::List => match serde_json::from_str::<NodeValue>(trimmed) {
                Ok(list @ NodeValue::List(_)) => Some(list),
                _ if trimmed.is_empty() => Some(NodeValue::List(Vec::new())),
                _ => None,
            },
            PortType::Any => Some(
                serde_json::from_str::<NodeValue>(trimmed)
                    .unwrap_or_else(|_| NodeValue::String(raw.to_string())),
            ),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            NodeValue::Boolean(b) => *b,
            NodeValue::Number(n) => *n != 0.0,
            NodeValue::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
            NodeValue::List(items) => !items.is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            NodeValue::Number(n) => Some(*n),
            NodeValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            NodeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Null => f.write_str("null"),
            NodeValue::Boolean(b) => write!(f, "{}", b),
            NodeValue::Number(n) => write!(f, "{}", n),
            NodeValue::String(s) => f.write_str(s),
            NodeValue::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            NodeValue::List(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            NodeValue::Map(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for NodeValue {
    fn from(b: bool) -> Self {
        NodeValue::Boolean(b)
    }
}

impl From<f64> for NodeValue {
    fn from(n: f64) -> Self {
        NodeValue::Number(n)
    }
}

impl From<&str> for NodeValue {
    fn from(s: &str) -> Self {
        NodeValue::String(s.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(s: String) -> Self {
        NodeValue::String(s)
    }
}

/// Field map of a node instance. Fields keep the order they were first
/// set in, which is the definition's default order for catalog nodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct NodeData(IndexMap<String, NodeValue>);

impl NodeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<NodeValue>) -> Option<NodeValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<NodeValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeValue)> {
        self.0.iter()
    }

    /// Shallow merge: keys in `other` overwrite keys in `self`.
    pub fn merge(&mut self, other: NodeData) {
        self.0.extend(other.0);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<NodeValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Read a field through the definition's schema.
    ///
    /// Input-port fields fall back to the port's string default and are
    /// coerced to the port type. Other fields must appear in the
    /// definition's default data and keep the type of that default.
    pub fn read(&self, key: &str, definition: &NodeDefinition) -> Result<NodeValue, FieldError> {
        if let Some(port) = definition.input(key) {
            let value = match self.get(key) {
                Some(NodeValue::Null) | None => match &port.default_value {
                    Some(raw) => NodeValue::parse(raw, port.port_type).ok_or_else(|| {
                        FieldError::TypeMismatch {
                            key: key.to_string(),
                            expected: port.port_type,
                            found: raw.clone(),
                        }
                    })?,
                    None if port.required => {
                        return Err(FieldError::Missing { key: key.to_string() });
                    }
                    None => NodeValue::Null,
                },
                Some(value) => value.clone(),
            };
            return value
                .coerce(port.port_type)
                .ok_or_else(|| FieldError::TypeMismatch {
                    key: key.to_string(),
                    expected: port.port_type,
                    found: value.to_string(),
                });
        }

        let Some(default) = definition.default_data.get(key) else {
            return Err(FieldError::UnknownField { key: key.to_string() });
        };
        let value = self.get(key).unwrap_or(default).clone();
        match default.value_type() {
            Some(expected) => value.coerce(expected).ok_or_else(|| FieldError::TypeMismatch {
                key: key.to_string(),
                expected,
                found: value.to_string(),
            }),
            None => Ok(value),
        }
    }
}

impl FromIterator<(String, NodeValue)> for NodeData {
    fn from_iter<T: IntoIterator<Item = (String, NodeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_types::PortDefinition;

    fn wait_definition() -> NodeDefinition {
        let mut def = NodeDefinition::new("action.wait", "Wait", "action");
        def.inputs = vec![
            PortDefinition::exec("exec_in", "Exec"),
            PortDefinition::new("duration", "Duration (ms)", PortType::Number).with_default("1000"),
            PortDefinition::new("target", "Target", PortType::Bot).required(),
        ];
        def.default_data = NodeData::new().with("unit", "ms");
        def
    }

    #[test]
    fn merge_keeps_field_order() {
        let mut data = NodeData::new().with("zeta", 1.0).with("alpha", 2.0);
        data.merge(NodeData::new().with("zeta", 3.0).with("mid", 4.0));
        let keys: Vec<_> = data.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(data.get("zeta"), Some(&NodeValue::Number(3.0)));
    }

    #[test]
    fn reads_port_default_lazily() {
        let data = NodeData::new();
        let value = data.read("duration", &wait_definition()).unwrap();
        assert_eq!(value, NodeValue::Number(1000.0));
    }

    #[test]
    fn coerces_stored_value_to_port_type() {
        let data = NodeData::new().with("duration", "250");
        assert_eq!(
            data.read("duration", &wait_definition()).unwrap(),
            NodeValue::Number(250.0)
        );
    }

    #[test]
    fn rejects_non_conforming_values() {
        let mut data = NodeData::new();
        data.insert(
            "duration",
            NodeValue::Vector3(Vector3 { x: 1.0, y: 2.0, z: 3.0 }),
        );
        assert!(matches!(
            data.read("duration", &wait_definition()),
            Err(FieldError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn required_field_without_default_is_missing() {
        let data = NodeData::new();
        assert!(matches!(
            data.read("target", &wait_definition()),
            Err(FieldError::Missing { .. })
        ));
    }

    #[test]
    fn non_port_fields_follow_default_data() {
        let def = wait_definition();
        assert_eq!(
            NodeData::new().read("unit", &def).unwrap(),
            NodeValue::String("ms".into())
        );
        assert!(matches!(
            NodeData::new().read("nope", &def),
            Err(FieldError::UnknownField { .. })
        ));
    }

    #[test]
    fn parses_vector_and_list_defaults() {
        assert_eq!(
            NodeValue::parse("1, 2.5, -3", PortType::Vector3),
            Some(NodeValue::Vector3(Vector3 { x: 1.0, y: 2.5, z: -3.0 }))
        );
        assert_eq!(
            NodeValue::parse("[1, \"a\"]", PortType::List),
            Some(NodeValue::List(vec![NodeValue::Number(1.0), NodeValue::String("a".into())]))
        );
        assert_eq!(NodeValue::parse("yes", PortType::Boolean), None);
    }

    #[test]
    fn untagged_json_round_trip() {
        let json = r#"{"flag": true, "pos": {"x": 1.0, "y": 2.0, "z": 3.0}, "opts": {"w": 1.0}}"#;
        let data: NodeData = serde_json::from_str(json).unwrap();
        assert!(matches!(data.get("pos"), Some(NodeValue::Vector3(_))));
        assert!(matches!(data.get("opts"), Some(NodeValue::Map(_))));
        let back: NodeData = serde_json::from_str(&serde_json::to_string(&data).unwrap()).unwrap();
        assert_eq!(back, data);
    }
}
