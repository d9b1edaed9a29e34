//! Error types for tree operations.

use thiserror::Error;

use crate::key::NodeKey;

/// Errors raised by the editor engine.
///
/// Only construction-time and structural invariant violations end up here.
/// Render comparisons and missing theme entries never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorError {
    /// A node factory or tree mutation was called outside an update transaction.
    #[error("nodes can only be created or mutated inside an update transaction")]
    OutsideTransaction,

    /// The key does not name a node in the current state.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeKey),

    /// The operation needs a node that can hold children.
    #[error("node {0} cannot have children")]
    NotAnElement(NodeKey),

    /// The operation needs a node with text content.
    #[error("node {0} does not hold text")]
    NotText(NodeKey),

    /// The node is not attached to a parent.
    #[error("node {0} has no parent")]
    Detached(NodeKey),

    /// Attaching the node would make it its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeKey, child: NodeKey },

    /// The root node cannot be moved, removed or replaced.
    #[error("the root node cannot be moved or removed")]
    RootImmutable,

    /// An attribute value was rejected by a node factory or setter.
    #[error("invalid {attribute}: {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        reason: String,
    },

    /// Imported or configured data does not describe a valid document.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Serialization(e.to_string())
    }
}
