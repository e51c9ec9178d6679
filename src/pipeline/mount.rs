//! Mount API - Wire a store, a view and a render session together.
//!
//! After mounting, every accepted state mutation re-runs the view with the new
//! snapshot and renders the result synchronously.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::pipeline::{mount, RenderSession};
//!
//! let store = Store::new(AppState::default());
//! let handle = mount(&store, RenderSession::new(doc, container), |state| view(state));
//!
//! store.set_state(|s| s.todos.push("milk".into())); // re-renders
//!
//! handle.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use log::error;

use super::session::RenderSession;
use crate::state::Store;
use crate::types::VNode;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds the store (to detach the renderer on unmount) and the session.
pub struct MountHandle<S: Clone + PartialEq + 'static> {
    store: Store<S>,
    session: Rc<RefCell<RenderSession>>,
}

impl<S: Clone + PartialEq + 'static> MountHandle<S> {
    pub fn session(&self) -> &Rc<RefCell<RenderSession>> {
        &self.session
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Stop rendering and remove the displayed tree from the container.
    pub fn unmount(self) {
        self.store.clear_renderer();
        let result = self.session.borrow_mut().clear();
        if let Err(err) = result {
            error!("unmount failed: {err}");
        }
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Install a renderer on `store` that renders `view(state)` into `session`,
/// then perform the initial render.
///
/// Render failures are logged and stop that pass. A render requested while a
/// pass is still running (e.g. a view that mutates state) is skipped.
pub fn mount<S, V>(store: &Store<S>, session: RenderSession, view: V) -> MountHandle<S>
where
    S: Clone + PartialEq + 'static,
    V: Fn(&S) -> VNode + 'static,
{
    let session = Rc::new(RefCell::new(session));
    let target = session.clone();

    store.set_renderer(move |state: &S| {
        let vnode = view(state);
        let Ok(mut session) = target.try_borrow_mut() else {
            error!("render requested during a running pass; skipped");
            return;
        };
        if let Err(err) = session.render(vnode) {
            error!("render failed: {err}");
        }
    });
    store.render_app();

    MountHandle {
        store: store.clone(),
        session,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Document;
    use crate::state::dispatch;
    use crate::types::{Element, Event, EventKind};

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i32,
    }

    fn setup() -> (Store<Counter>, RenderSession) {
        let mut doc = Document::new();
        let container = doc.create_element("div").unwrap();
        let session = RenderSession::new(Rc::new(RefCell::new(doc)), container);
        (Store::new(Counter { count: 0 }), session)
    }

    fn view(state: &Counter) -> VNode {
        Element::new("span").child(state.count).into()
    }

    fn html(handle: &MountHandle<Counter>) -> String {
        let session = handle.session().borrow();
        let doc = session.document().borrow();
        doc.to_html(session.container())
    }

    #[test]
    fn test_mount_renders_initial_state() {
        let (store, session) = setup();
        let handle = mount(&store, session, view);
        assert_eq!(html(&handle), "<div><span>0</span></div>");
    }

    #[test]
    fn test_state_change_rerenders() {
        let (store, session) = setup();
        let handle = mount(&store, session, view);

        store.set_state(|s| s.count = 2);
        assert_eq!(html(&handle), "<div><span>2</span></div>");
        assert_eq!(handle.session().borrow().passes(), 2);
    }

    #[test]
    fn test_unmount_stops_rendering() {
        let (store, session) = setup();
        let handle = mount(&store, session, view);
        let session = handle.session().clone();
        handle.unmount();

        store.set_state(|s| s.count = 9);
        let session = session.borrow();
        assert_eq!(session.passes(), 1);
        assert_eq!(session.document().borrow().to_html(session.container()), "<div></div>");
    }

    #[test]
    fn test_remount_fires_handlers_once() {
        let (store, session) = setup();
        let doc = session.document().clone();
        let container = session.container();
        mount(&store, session, view).unmount();

        let weak = store.downgrade();
        let handle = mount(&store, RenderSession::new(doc.clone(), container), move |state: &Counter| {
            let weak = weak.clone();
            Element::new("button")
                .node_ref("inc")
                .on("click", move |_| {
                    weak.set_state(|s| s.count += 1);
                })
                .child(state.count)
                .into()
        });

        assert_eq!(doc.borrow().listener_count(container), EventKind::ALL.len());
        let button = handle.session().borrow().node_ref("inc").unwrap();
        dispatch(&doc, &Event::click(button)).unwrap();
        assert_eq!(store.get_state().count, 1);
        assert_eq!(html(&handle), "<div><button>1</button></div>");
    }
}
