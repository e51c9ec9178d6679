//! Renderer - materializer and reconciler.
//!
//! - [`Patcher::materialize`] builds a fresh display subtree from a [`VNode`](crate::VNode)
//! - [`Patcher::reconcile`] patches an existing subtree from an old tree to a new one
//!
//! Both run inside a [`Patcher`], which borrows the document and the node-ref
//! side table for one pass. Passes are synchronous and run to completion.

mod diff;
mod materialize;
mod patch;

pub use patch::{NodeRefs, Patcher};
