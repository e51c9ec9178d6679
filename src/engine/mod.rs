//! Display engine - the live node tree the renderer patches.
//!
//! - Document: generational node arena, attributes, properties, handler slots
//! - Mutation: journal of effective writes
//!
//! # Architecture
//!
//! Display nodes are NOT objects owned by the virtual tree. They are keys into
//! one arena owned by the [`Document`]:
//!
//! ```text
//! NodeId(1v1): <div>      parent=None   children=[2v1, 3v1]
//! NodeId(2v1): <button>   parent=1v1    handlers={click}
//! NodeId(3v1): "hello"    parent=1v1
//! ```
//!
//! Discarding a node frees its slot and bumps the slot's version, so stale
//! handles held by external code resolve to nothing instead of a new node.

mod document;
mod mutation;

pub use document::*;
pub use mutation::*;
