//! Router Module - Location token to route mapping
//!
//! Maps hash-style location tokens (`"#/"`, `"#/active"`, ...) to route values.
//! Unknown and empty tokens fall back to the `"#/"` route. Each accepted
//! location change calls the change callback, which the application maps to a
//! state mutation and re-render. The core renderer knows nothing about routes.
//!
//! # Example
//!
//! ```ignore
//! let router = Router::new([("#/", Filter::All), ("#/active", Filter::Active)]);
//! router.on_change(move |filter| store.set_state(|s| s.filter = *filter));
//! router.navigate("#/active");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use spark_signals::{signal, Signal};

/// Location token used for empty and unknown locations.
pub const DEFAULT_LOCATION: &str = "#/";

/// Callback run with the resolved route after each accepted location change.
pub type RouteCallback<R> = Rc<dyn Fn(&R)>;

pub struct Router<R: Clone + PartialEq + 'static> {
    routes: HashMap<String, R>,
    location: Signal<String>,
    current: Signal<Option<R>>,
    on_change: RefCell<Option<RouteCallback<R>>>,
}

impl<R: Clone + PartialEq + 'static> Router<R> {
    pub fn new<I, K>(routes: I) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(|(k, r)| (k.into(), r)).collect(),
            location: signal(String::new()),
            current: signal(None),
            on_change: RefCell::new(None),
        }
    }

    /// Install the change callback, replacing any previous one.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&R) + 'static,
    {
        *self.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    /// Route for `token`, falling back to the default route.
    pub fn resolve(&self, token: &str) -> Option<&R> {
        let token = if token.is_empty() { DEFAULT_LOCATION } else { token };
        self.routes
            .get(token)
            .or_else(|| self.routes.get(DEFAULT_LOCATION))
    }

    /// React to a location change. Returns `false` (and changes nothing) when
    /// neither `token` nor the default location has a route.
    pub fn handle_location(&self, token: &str) -> bool {
        let Some(route) = self.resolve(token).cloned() else {
            debug!("no route for {token:?}");
            return false;
        };
        let token = if token.is_empty() { DEFAULT_LOCATION } else { token };
        self.location.set(token.to_string());
        self.current.set(Some(route.clone()));

        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback(&route);
        }
        true
    }

    /// Move to `token`. Same as a location-change notification for it.
    pub fn navigate(&self, token: &str) -> bool {
        self.handle_location(token)
    }

    /// Last accepted location token (empty before the first change).
    pub fn location(&self) -> String {
        self.location.get()
    }

    /// Route for the last accepted location.
    pub fn current(&self) -> Option<R> {
        self.current.get()
    }
}

// =============================================================================
// TESTS
// =============================================================================
