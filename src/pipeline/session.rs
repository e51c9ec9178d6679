//! Render session - the "currently displayed tree" for one container.
//!
//! A session owns what a single render line needs between passes: the last
//! rendered virtual tree and the node-ref side table. Root listeners belong to
//! the container node, so a later session on the same container reuses them.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::engine::{Document, NodeId};
use crate::error::RenderError;
use crate::renderer::{NodeRefs, Patcher};
use crate::state::delegation;
use crate::types::{EventKinds, VNode};

/// Session options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Install delegating root listeners on the container.
    pub delegate_events: bool,
    /// Turn on the document journal when the session is created. The journal
    /// is document-wide; a session never turns it off.
    pub journal: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            delegate_events: true,
            journal: false,
        }
    }
}

#[derive(Debug)]
pub struct RenderSession {
    doc: Rc<RefCell<Document>>,
    container: NodeId,
    options: RenderOptions,
    current: Option<VNode>,
    refs: NodeRefs,
    passes: u64,
}

impl RenderSession {
    pub fn new(doc: Rc<RefCell<Document>>, container: NodeId) -> Self {
        Self::with_options(doc, container, RenderOptions::default())
    }

    pub fn with_options(doc: Rc<RefCell<Document>>, container: NodeId, options: RenderOptions) -> Self {
        if options.journal {
            doc.borrow_mut().set_journal(true);
        }
        Self {
            doc,
            container,
            options,
            current: None,
            refs: NodeRefs::new(),
            passes: 0,
        }
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.doc
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// The tree of the last completed pass.
    pub fn current_tree(&self) -> Option<&VNode> {
        self.current.as_ref()
    }

    /// Live node published under `name` by the last completed pass.
    pub fn node_ref(&self, name: &str) -> Option<NodeId> {
        self.refs.get(name)
    }

    /// Kinds with a delegating listener on the container.
    pub fn installed_events(&self) -> EventKinds {
        self.doc.borrow().delegated_events(self.container)
    }

    /// Number of completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Display `vnode` in the container.
    ///
    /// The first pass (or any pass after the container lost its content)
    /// materializes the tree and appends it. Later passes reconcile the
    /// container's first child against the remembered tree. The remembered
    /// tree and refs are replaced only when the pass succeeds.
    pub fn render(&mut self, vnode: VNode) -> Result<(), RenderError> {
        let mut doc = self.doc.borrow_mut();
        if !doc.contains(self.container) {
            return Err(RenderError::ContainerMissing(self.container));
        }
        if self.options.delegate_events {
            delegation::install_root_listeners(&mut doc, self.container)?;
        }

        let mut refs = NodeRefs::new();
        let root = doc.first_child(self.container);
        match (self.current.as_ref(), root) {
            (Some(old), Some(root)) => {
                debug!("pass {}: reconcile {root:?}", self.passes + 1);
                Patcher::new(&mut doc, &mut refs).reconcile(Some(root), &vnode, old)?;
            }
            _ => {
                debug!("pass {}: materialize into {:?}", self.passes + 1, self.container);
                let node = Patcher::new(&mut doc, &mut refs).materialize(&vnode)?;
                doc.append_child(self.container, node)?;
            }
        }

        self.current = Some(vnode);
        self.refs = refs;
        self.passes += 1;
        Ok(())
    }

    /// Remove whatever the session displayed and forget the remembered tree.
    /// Root listeners stay installed.
    pub fn clear(&mut self) -> Result<(), RenderError> {
        let mut doc = self.doc.borrow_mut();
        if let Some(root) = doc.first_child(self.container) {
            doc.remove(root)?;
        }
        self.current = None;
        self.refs.clear();
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
