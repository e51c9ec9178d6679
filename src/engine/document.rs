//! Document - the live display tree.
//!
//! Nodes live in a generational arena. A [`NodeId`] is a stable handle: once a
//! node is discarded its id stops resolving and is never handed to a newer node.
//!
//! Each element owns:
//! - string attributes (insertion order preserved)
//! - boolean properties (`checked`, `disabled`, `selected`)
//! - a handler slot table (event name → handler), read by delegated dispatch
//! - native listeners, invoked while an event bubbles from its target to the root
//!
//! The mutation journal is off unless requested with [`Document::with_journal`]
//! or [`Document::set_journal`]. It is document-wide and only drained by
//! [`Document::take_mutations`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write;
use std::rc::Rc;

use indexmap::IndexMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use super::mutation::Mutation;
use crate::error::DomError;
use crate::types::{BoolProp, Event, EventHandler, EventKind, EventKinds, Properties};

slotmap::new_key_type! {
    /// Handle to a live display node.
    pub struct NodeId;
}

/// Native listener attached to a node.
///
/// Receives the document cell rather than a borrow so it can read the tree
/// and still let handlers re-render afterwards.
pub type Listener = Rc<dyn Fn(&RefCell<Document>, &Event)>;

// =============================================================================
// Node Storage
// =============================================================================

struct Node {
    parent: Option<NodeId>,
    data: NodeData,
    listeners: SmallVec<[(EventKind, Listener); 2]>,
    /// Kinds with a delegating root listener on this node.
    delegated: EventKinds,
}

enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    properties: Properties,
    handlers: HashMap<String, EventHandler>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            data,
            listeners: SmallVec::new(),
            delegated: EventKinds::empty(),
        }
    }

    fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Element(el) => &el.children,
            NodeData::Text(_) => &[],
        }
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// =============================================================================
// Document
// =============================================================================

/// Arena-backed display tree with a mutation journal.
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    journal_enabled: bool,
    journal: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document. Mutations are not recorded.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            journal_enabled: false,
            journal: Vec::new(),
        }
    }

    /// Create an empty document that records mutations.
    pub fn with_journal() -> Self {
        Self {
            journal_enabled: true,
            ..Self::new()
        }
    }

    /// Number of live nodes (attached or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    // -------------------------------------------------------------------------
    // Journal
    // -------------------------------------------------------------------------

    /// Turn mutation recording on or off. Turning it off clears the journal.
    pub fn set_journal(&mut self, enabled: bool) {
        self.journal_enabled = enabled;
        if !enabled {
            self.journal.clear();
        }
    }

    pub fn journal_enabled(&self) -> bool {
        self.journal_enabled
    }

    /// Mutations recorded since the last [`take_mutations`](Self::take_mutations).
    pub fn mutations(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the journal.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, mutation: Mutation) {
        if self.journal_enabled {
            self.journal.push(mutation);
        }
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id).ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id).ok_or(DomError::StaleNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.node(id)?.data {
            NodeData::Element(el) => Ok(el),
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children of an element. Empty for text nodes and stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|el| el.tag.as_str())
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(Node { data: NodeData::Text(_), .. }))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Pre-order list of `root` and all its descendants.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First element under `root` (inclusive) whose attribute `name` equals `value`.
    pub fn find_by_attribute(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.attribute(id, name) == Some(value))
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if !is_valid_tag(tag) {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        let id = self.nodes.insert(Node::new(NodeData::Element(ElementData {
            tag: tag.to_string(),
            ..Default::default()
        })));
        self.record(Mutation::CreateElement {
            node: id,
            tag: tag.to_string(),
        });
        Ok(id)
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.nodes.insert(Node::new(NodeData::Text(text.to_string())));
        self.record(Mutation::CreateText {
            node: id,
            text: text.to_string(),
        });
        id
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    fn is_inclusive_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink `id` from its parent's child list. The node stays alive.
    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.element_mut(parent)?.children.retain(|&c| c != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Free `id` and its whole subtree. Handler tables and listeners go with it.
    fn discard(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                stack.extend_from_slice(node.children());
            }
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        self.element_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.record(Mutation::AppendChild { parent, child });
        Ok(())
    }

    /// Put `new` at the position of `old` and discard `old` with its subtree.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.node(old)?.parent.ok_or(DomError::NoParent(old))?;
        if old == new {
            return Ok(());
        }
        self.check_insert(parent, new)?;
        self.detach(new)?;

        let children = &mut self.element_mut(parent)?.children;
        let Some(position) = children.iter().position(|&c| c == old) else {
            return Err(DomError::NoParent(old));
        };
        children[position] = new;
        self.node_mut(new)?.parent = Some(parent);
        self.discard(old);

        self.record(Mutation::ReplaceChild { parent, old, new });
        Ok(())
    }

    /// Detach `id` from its parent (if any) and discard its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.detach(id)?;
        self.discard(id);
        self.record(Mutation::Remove { node: id });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Attributes and Properties
    // -------------------------------------------------------------------------

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.record(Mutation::SetAttribute {
            node: id,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        if self.element_mut(id)?.attributes.shift_remove(name).is_some() {
            self.record(Mutation::RemoveAttribute {
                node: id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.attributes.get(name).map(String::as_str)
    }

    /// Attributes of an element in insertion order.
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.element(id)
            .map(|el| {
                el.attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set a live boolean property. Writing the current value is not a change.
    pub fn set_property(&mut self, id: NodeId, prop: BoolProp, value: bool) -> Result<(), DomError> {
        let properties = &mut self.element_mut(id)?.properties;
        if properties.contains(prop.flag()) == value {
            return Ok(());
        }
        properties.set(prop.flag(), value);
        self.record(Mutation::SetProperty {
            node: id,
            prop,
            value,
        });
        Ok(())
    }

    pub fn property(&self, id: NodeId, prop: BoolProp) -> bool {
        self.element(id)
            .is_ok_and(|el| el.properties.contains(prop.flag()))
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(current) => {
                current.clear();
                current.push_str(text);
            }
            NodeData::Element(_) => return Err(DomError::NotAText(id)),
        }
        self.record(Mutation::SetText {
            node: id,
            text: text.to_string(),
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Handler Slot Table
    // -------------------------------------------------------------------------

    /// Put `handler` in the slot for `event`, replacing what was there.
    pub fn set_handler(&mut self, id: NodeId, event: &str, handler: EventHandler) -> Result<(), DomError> {
        let previous = self
            .element_mut(id)?
            .handlers
            .insert(event.to_string(), handler.clone());
        let unchanged = previous.is_some_and(|prev| Rc::ptr_eq(&prev, &handler));
        if !unchanged {
            self.record(Mutation::SetHandler {
                node: id,
                event: event.to_string(),
            });
        }
        Ok(())
    }

    pub fn remove_handler(&mut self, id: NodeId, event: &str) -> Result<(), DomError> {
        if self.element_mut(id)?.handlers.remove(event).is_some() {
            self.record(Mutation::RemoveHandler {
                node: id,
                event: event.to_string(),
            });
        }
        Ok(())
    }

    pub fn handler(&self, id: NodeId, event: &str) -> Option<EventHandler> {
        self.element(id).ok()?.handlers.get(event).cloned()
    }

    /// Event names with a registered handler, sorted.
    pub fn handler_names(&self, id: NodeId) -> Vec<String> {
        let mut names: Vec<String> = self
            .element(id)
            .map(|el| el.handlers.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    // -------------------------------------------------------------------------
    // Native Listeners
    // -------------------------------------------------------------------------

    pub fn add_event_listener(&mut self, id: NodeId, kind: EventKind, listener: Listener) -> Result<(), DomError> {
        self.node_mut(id)?.listeners.push((kind, listener));
        Ok(())
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.listeners.len())
    }

    /// Kinds marked as delegated on `id`. Empty for stale ids.
    pub fn delegated_events(&self, id: NodeId) -> EventKinds {
        self.nodes.get(id).map_or(EventKinds::empty(), |node| node.delegated)
    }

    /// Record that `id` now carries delegating listeners for `kinds`.
    pub fn mark_delegated(&mut self, id: NodeId, kinds: EventKinds) -> Result<(), DomError> {
        self.node_mut(id)?.delegated.insert(kinds);
        Ok(())
    }

    /// Deliver `event` to native listeners from its target up to the root.
    ///
    /// The propagation path and listeners are collected first; the borrow is
    /// released before any listener runs.
    pub fn dispatch_event(doc: &RefCell<Self>, event: &Event) -> Result<(), DomError> {
        let listeners: SmallVec<[Listener; 4]> = {
            let doc = doc.borrow();
            let mut listeners = SmallVec::new();
            let mut current = Some(event.target);
            while let Some(id) = current {
                let node = doc.node(id)?;
                listeners.extend(
                    node.listeners
                        .iter()
                        .filter(|(kind, _)| *kind == event.kind)
                        .map(|(_, listener)| listener.clone()),
                );
                current = node.parent;
            }
            listeners
        };

        for listener in listeners {
            listener(doc, event);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Deterministic markup for `id` and its subtree.
    ///
    /// Truthy properties are written as bare attributes after the string
    /// attributes. Handlers and listeners are not serialized.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(&escape(text, false)),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
                }
                for prop in BoolProp::ALL {
                    if el.properties.contains(prop.flag()) {
                        out.push(' ');
                        out.push_str(prop.name());
                    }
                }
                out.push('>');
                for &child in &el.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
