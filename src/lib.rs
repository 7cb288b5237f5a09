//! Graph engine behind the bot-swarm visual script editor.
//!
//! The crate holds the in-memory model of a node-based script (nodes,
//! typed ports, edges, nested groups, layout-only nodes) and the commands
//! that edit it. Rendering is somebody else's job: everything here works
//! in logical 2D positions and plain ids.

pub mod algorithms;
pub mod builtin_nodes;
pub mod catalog;
pub mod clipboard;
pub mod config;
pub mod diff;
pub mod document;
pub mod editor;
pub mod error;
pub mod graph;
pub mod history;
pub mod node_types;
pub mod quick_add;
pub mod value;

pub use algorithms::{AlignEdge, DistributeAxis, LinkDirection};
pub use catalog::NodeCatalog;
pub use clipboard::Snapshot;
pub use config::EditorConfig;
pub use document::{ScriptDocument, ScriptMetadata};
pub use editor::{ScriptEditor, SocketRef};
pub use error::{DocumentError, EditError, FieldError};
pub use graph::{Connection, Edge, EdgeKind, Node, NodeKind, Position, ScriptGraph};
pub use node_types::{NodeDefinition, PortDefinition, PortDirection, PortType, can_connect};
pub use value::{NodeData, NodeValue};
