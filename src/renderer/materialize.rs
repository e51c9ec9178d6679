//! Tree materializer - builds fresh display nodes from virtual nodes.
//!
//! Used for the first paint and whenever the reconciler decides a subtree has
//! to be rebuilt instead of updated.

use log::warn;

use super::patch::Patcher;
use crate::engine::NodeId;
use crate::error::DomError;
use crate::types::{AttrKind, AttrValue, Element, VNode};

impl Patcher<'_> {
    /// Build a detached display subtree for `vnode`.
    ///
    /// - `Empty` becomes an empty text node that holds the position.
    /// - `Text` becomes a text node.
    /// - `Element` becomes an element with attributes, handler slots and
    ///   children (empty children skipped).
    pub fn materialize(&mut self, vnode: &VNode) -> Result<NodeId, DomError> {
        match vnode {
            VNode::Empty => Ok(self.doc.create_text("")),
            VNode::Text(text) => Ok(self.doc.create_text(text)),
            VNode::Element(el) => self.materialize_element(el),
        }
    }

    fn materialize_element(&mut self, el: &Element) -> Result<NodeId, DomError> {
        let node = self.doc.create_element(&el.tag)?;
        if let Err(err) = self.fill_element(node, el) {
            // Drop the partial subtree; it was never attached.
            if let Err(cleanup) = self.doc.remove(node) {
                warn!("could not discard partial <{}> subtree: {cleanup}", el.tag);
            }
            return Err(err);
        }
        if let Some(name) = &el.node_ref {
            self.refs.record(name, node);
        }
        Ok(node)
    }

    fn fill_element(&mut self, node: NodeId, el: &Element) -> Result<(), DomError> {
        for (key, value) in &el.attrs {
            self.apply_initial_attr(node, key, value)?;
        }
        for child in el.rendered_children() {
            let child_node = self.materialize(child)?;
            self.doc.append_child(node, child_node)?;
        }
        Ok(())
    }

    fn apply_initial_attr(&mut self, node: NodeId, key: &str, value: &AttrValue) -> Result<(), DomError> {
        match AttrKind::classify(key) {
            AttrKind::Event(event) => match value.as_handler() {
                Some(handler) => self.doc.set_handler(node, &event, handler.clone()),
                None => {
                    warn!("ignoring non-handler value for event attribute `{key}`");
                    Ok(())
                }
            },
            // Falsy properties are never written on creation
            AttrKind::Property(prop) if value.is_truthy() => self.doc.set_property(node, prop, true),
            AttrKind::Property(_) => Ok(()),
            AttrKind::Plain => match value.as_attribute() {
                Some(text) => self.doc.set_attribute(node, key, &text),
                None => {
                    warn!("ignoring handler value for plain attribute `{key}`");
                    Ok(())
                }
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
