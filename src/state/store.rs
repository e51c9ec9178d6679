//! Store Module - Application state snapshot and re-render trigger
//!
//! The store holds one immutable snapshot of application state. Mutations go
//! through [`Store::set_state`], which applies the update and then calls the
//! installed renderer synchronously, so every accepted mutation is followed by
//! exactly one render pass before `set_state` returns.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::state::Store;
//!
//! let store = Store::new(Counter { count: 0 });
//! store.set_renderer(|state| println!("count = {}", state.count));
//!
//! store.set_state(|s| s.count += 1); // prints "count = 1"
//! store.set_state_silent(|s| s.count += 1); // no render
//! ```
//!
//! Handlers stored in the display tree should capture a [`WeakStore`] so the
//! tree does not keep the store (and through it, the renderer) alive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;
use spark_signals::{signal, Signal};

/// Callback run after each accepted mutation with the new snapshot.
pub type StateRenderer<S> = Rc<dyn Fn(&S)>;

struct StoreInner<S: Clone + PartialEq + 'static> {
    state: Signal<S>,
    renderer: RefCell<Option<StateRenderer<S>>>,
}

/// Shared handle to an application state container.
pub struct Store<S: Clone + PartialEq + 'static> {
    inner: Rc<StoreInner<S>>,
}

impl<S: Clone + PartialEq + 'static> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Clone + PartialEq + 'static> Store<S> {
    /// Create a store holding `initial`. No renderer is installed yet.
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: signal(initial),
                renderer: RefCell::new(None),
            }),
        }
    }

    /// Current snapshot.
    pub fn get_state(&self) -> S {
        self.inner.state.get()
    }

    /// Apply `update` to a copy of the snapshot, store it, then re-render.
    pub fn set_state<F>(&self, update: F)
    where
        F: FnOnce(&mut S),
    {
        self.apply(update);
        self.render_app();
    }

    /// Apply `update` without re-rendering.
    pub fn set_state_silent<F>(&self, update: F)
    where
        F: FnOnce(&mut S),
    {
        self.apply(update);
    }

    fn apply<F>(&self, update: F)
    where
        F: FnOnce(&mut S),
    {
        let mut next = self.inner.state.get();
        update(&mut next);
        self.inner.state.set(next);
    }

    /// Install the render callback, replacing any previous one.
    pub fn set_renderer<F>(&self, renderer: F)
    where
        F: Fn(&S) + 'static,
    {
        *self.inner.renderer.borrow_mut() = Some(Rc::new(renderer));
    }

    /// Remove the render callback. Later mutations only update the snapshot.
    pub fn clear_renderer(&self) {
        self.inner.renderer.borrow_mut().take();
    }

    pub fn has_renderer(&self) -> bool {
        self.inner.renderer.borrow().is_some()
    }

    /// Run the renderer with the current snapshot.
    pub fn render_app(&self) {
        // Cloned out so the renderer may replace itself
        let renderer = self.inner.renderer.borrow().clone();
        match renderer {
            Some(render) => render(&self.get_state()),
            None => debug!("state changed with no renderer installed"),
        }
    }

    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning store handle for event handlers.
pub struct WeakStore<S: Clone + PartialEq + 'static> {
    inner: Weak<StoreInner<S>>,
}

impl<S: Clone + PartialEq + 'static> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Clone + PartialEq + 'static> WeakStore<S> {
    pub fn upgrade(&self) -> Option<Store<S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }

    /// [`Store::set_state`] if the store is still alive. Returns whether it was.
    pub fn set_state<F>(&self, update: F) -> bool
    where
        F: FnOnce(&mut S),
    {
        match self.upgrade() {
            Some(store) => {
                store.set_state(update);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i32,
        label: String,
    }

    fn setup() -> Store<Counter> {
        Store::new(Counter {
            count: 0,
            label: "clicks".into(),
        })
    }

    #[test]
    fn test_initial_state() {
        let store = setup();
        assert_eq!(store.get_state().count, 0);
        assert!(!store.has_renderer());
    }

    #[test]
    fn test_set_state_merges_and_renders() {
        let store = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        store.set_renderer(move |state: &Counter| seen_clone.borrow_mut().push(state.count));

        store.set_state(|s| s.count += 1);
        store.set_state(|s| s.count += 1);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        // Untouched fields survive
        assert_eq!(store.get_state().label, "clicks");
    }

    #[test]
    fn test_silent_update_skips_render() {
        let store = setup();
        let renders = Rc::new(Cell::new(0));
        let renders_clone = renders.clone();
        store.set_renderer(move |_: &Counter| renders_clone.set(renders_clone.get() + 1));

        store.set_state_silent(|s| s.count = 5);
        assert_eq!(renders.get(), 0);
        assert_eq!(store.get_state().count, 5);

        store.render_app();
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_clear_renderer() {
        let store = setup();
        let renders = Rc::new(Cell::new(0));
        let renders_clone = renders.clone();
        store.set_renderer(move |_: &Counter| renders_clone.set(renders_clone.get() + 1));
        store.clear_renderer();

        store.set_state(|s| s.count = 1);
        assert_eq!(renders.get(), 0);
    }

    #[test]
    fn test_weak_store() {
        let store = setup();
        let weak = store.downgrade();
        assert!(weak.set_state(|s| s.count = 3));
        assert_eq!(store.get_state().count, 3);

        drop(store);
        assert!(!weak.set_state(|s| s.count = 4));
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_renderer_may_mutate_silently() {
        let store = setup();
        let weak = store.downgrade();
        store.set_renderer(move |state: &Counter| {
            if state.count == 1 {
                if let Some(store) = weak.upgrade() {
                    store.set_state_silent(|s| s.label = "seen".into());
                }
            }
        });

        store.set_state(|s| s.count = 1);
        assert_eq!(store.get_state().label, "seen");
    }
}
