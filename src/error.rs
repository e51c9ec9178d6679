//! Error types for the display layer and render sessions.
//!
//! There is no recovery taxonomy here. A reconciliation pass either completes
//! or the first fault aborts it and propagates to the caller unchanged.

use thiserror::Error;

use crate::engine::NodeId;

/// Faults raised by the display layer ([`Document`](crate::engine::Document)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Tag names must be non-empty and made of ASCII alphanumerics, `-` or `_`,
    /// starting with a letter.
    #[error("invalid tag name `{0}`")]
    InvalidTagName(String),

    /// The node was removed (or never belonged to this document).
    #[error("node {0:?} is not part of the document")]
    StaleNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} is not a text node")]
    NotAText(NodeId),

    /// Replacing or detaching a node that has no parent.
    #[error("node {0:?} has no parent")]
    NoParent(NodeId),

    /// Inserting a node into itself, one of its descendants, or into a text node.
    #[error("cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}

/// Faults raised by a [`RenderSession`](crate::pipeline::RenderSession) pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("render container {0:?} is not part of the document")]
    ContainerMissing(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}
