//! Error types for the script graph.

use crate::node_types::{PortDirection, PortType};
use thiserror::Error;
use uuid::Uuid;

/// Why an editing command was refused. A refused command leaves the
/// graph exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("node {0} does not exist")]
    NodeNotFound(Uuid),

    #[error("edge {0} does not exist")]
    EdgeNotFound(Uuid),

    #[error("node {node} has no {direction:?} port '{port}'")]
    PortNotFound {
        node: Uuid,
        port: String,
        direction: PortDirection,
    },

    #[error("cannot connect node {0} to itself")]
    SelfConnection(Uuid),

    #[error("nodes {from} and {to} live in different groups")]
    DifferentLevels { from: Uuid, to: Uuid },

    #[error("cannot connect {output} output to {input} input")]
    Incompatible { output: PortType, input: PortType },

    #[error("node {0} has no port compatible with the requested connection")]
    NoCompatiblePort(Uuid),

    #[error("'{0}' nodes only exist inside a group")]
    GroupBoundaryNode(String),
}

/// Reading a node data field through its definition failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("field '{key}' is not declared by the node definition")]
    UnknownField { key: String },

    #[error("required field '{key}' has no value")]
    Missing { key: String },

    #[error("field '{key}' expects {expected}, found '{found}'")]
    TypeMismatch {
        key: String,
        expected: PortType,
        found: String,
    },
}

/// Loading or saving scripts, catalogs, settings and clipboard text.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("clipboard text does not contain script graph data")]
    NotClipboardData,
}
