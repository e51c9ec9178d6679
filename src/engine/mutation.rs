//! Mutation journal entries.
//!
//! The document records every write that changes live state. Tests read the
//! journal to check that a pass did only what it had to; hosts can replay it
//! onto a real display backend.

use super::NodeId;
use crate::types::BoolProp;

/// One effective change to the display tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId, text: String },
    AppendChild { parent: NodeId, child: NodeId },
    /// `new` took the position of `old`; `old` was discarded.
    ReplaceChild { parent: NodeId, old: NodeId, new: NodeId },
    Remove { node: NodeId },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    SetProperty { node: NodeId, prop: BoolProp, value: bool },
    SetText { node: NodeId, text: String },
    SetHandler { node: NodeId, event: String },
    RemoveHandler { node: NodeId, event: String },
}

impl Mutation {
    /// True for writes that touch attributes or properties of an existing node.
    pub fn is_attribute_write(&self) -> bool {
        matches!(
            self,
            Mutation::SetAttribute { .. }
                | Mutation::RemoveAttribute { .. }
                | Mutation::SetProperty { .. }
        )
    }

    /// True for writes that create, move or discard nodes.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::CreateElement { .. }
                | Mutation::CreateText { .. }
                | Mutation::AppendChild { .. }
                | Mutation::ReplaceChild { .. }
                | Mutation::Remove { .. }
        )
    }

    /// True for handler slot table changes.
    pub fn is_handler_change(&self) -> bool {
        matches!(
            self,
            Mutation::SetHandler { .. } | Mutation::RemoveHandler { .. }
        )
    }
}
