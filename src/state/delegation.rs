//! Delegation Module - One root listener per event kind
//!
//! Elements never get native listeners of their own. The materializer and the
//! reconciler write handlers into each element's handler slot table; the root
//! container carries one native listener per supported kind which, on firing,
//! walks from the event target up to the container and calls every handler
//! registered for that kind.
//!
//! # API
//!
//! - `install_root_listeners(doc, container)` - Attach missing root listeners
//! - `collect_handlers(doc, container, event)` - Handlers along the propagation path
//! - `dispatch(doc, event)` - Fire a native event at its target
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::state::delegation;
//!
//! delegation::install_root_listeners(&mut doc.borrow_mut(), container)?;
//!
//! // Later, from the host's input layer
//! delegation::dispatch(&doc, &Event::click(button))?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use smallvec::SmallVec;

use crate::engine::{Document, Listener, NodeId};
use crate::error::DomError;
use crate::types::{Event, EventHandler, EventKind, EventKinds};

// =============================================================================
// INSTALLATION
// =============================================================================

/// Attach a delegating listener on `container` for every supported kind it
/// does not carry yet. Returns the kinds attached by this call.
///
/// The guard lives on the container node, so any number of sessions rendering
/// into the same container share one listener per kind.
pub fn install_root_listeners(doc: &mut Document, container: NodeId) -> Result<EventKinds, DomError> {
    let installed = doc.delegated_events(container);
    let mut added = EventKinds::empty();
    for kind in EventKind::ALL {
        if installed.contains(kind.flag()) {
            continue;
        }
        doc.add_event_listener(container, kind, delegated_listener(container))?;
        doc.mark_delegated(container, kind.flag())?;
        added.insert(kind.flag());
    }
    if !added.is_empty() {
        debug!("root listeners installed on {container:?}: {added:?}");
    }
    Ok(added)
}

fn delegated_listener(container: NodeId) -> Listener {
    Rc::new(move |doc: &RefCell<Document>, event: &Event| {
        // Borrow ends before handlers run; they may re-render
        let handlers = collect_handlers(&doc.borrow(), container, event);
        for handler in handlers {
            handler(event);
        }
    })
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Handlers for `event.kind` from the target up to `container`, inclusive,
/// innermost first. Every match is collected; there is no early stop.
pub fn collect_handlers(doc: &Document, container: NodeId, event: &Event) -> SmallVec<[EventHandler; 4]> {
    let name = event.kind.name();
    let mut handlers = SmallVec::new();
    let mut current = Some(event.target);
    while let Some(node) = current {
        if let Some(handler) = doc.handler(node, name) {
            handlers.push(handler);
        }
        if node == container {
            break;
        }
        current = doc.parent(node);
    }
    handlers
}

/// Fire `event` at its target, running native listeners along the way.
pub fn dispatch(doc: &RefCell<Document>, event: &Event) -> Result<(), DomError> {
    Document::dispatch_event(doc, event)
}

// =============================================================================
// TESTS
// =============================================================================
