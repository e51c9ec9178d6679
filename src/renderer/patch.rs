//! Patcher - the pass-scoped context shared by the materializer and the reconciler.

use std::collections::HashMap;

use crate::engine::{Document, NodeId};

// =============================================================================
// Node Refs
// =============================================================================

/// Side table of published live nodes: ref name → [`NodeId`].
///
/// Virtual elements stay pure descriptions; an element built with
/// [`Element::node_ref`](crate::types::Element::node_ref) is recorded here when
/// it is materialized or updated in place.
#[derive(Debug, Clone, Default)]
pub struct NodeRefs {
    nodes: HashMap<String, NodeId>,
}

impl NodeRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name).copied()
    }

    pub fn record(&mut self, name: &str, node: NodeId) {
        self.nodes.insert(name.to_string(), node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// =============================================================================
// Patcher
// =============================================================================

/// Borrowed document and ref table for the duration of one pass.
///
/// See `materialize.rs` for building nodes and `diff.rs` for reconciliation.
pub struct Patcher<'a> {
    pub(super) doc: &'a mut Document,
    pub(super) refs: &'a mut NodeRefs,
}

impl<'a> Patcher<'a> {
    pub fn new(doc: &'a mut Document, refs: &'a mut NodeRefs) -> Self {
        Self { doc, refs }
    }
}
