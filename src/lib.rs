//! # spark-vdom
//!
//! Virtual tree reconciler with delegated event dispatch.
//!
//! Views describe the UI as a fresh [`VNode`] tree on every render. The
//! renderer turns the first tree into live display nodes and, on later
//! renders, patches the live tree with the minimal set of changes needed to
//! match the new description.
//!
//! ## Architecture
//!
//! ```text
//! Store → view(state) → RenderSession → Patcher (materialize / reconcile) → Document
//!                                                                         ↑
//!                     Event → root listener → handler slots along the path
//! ```
//!
//! - Display nodes live in a generational arena ([`Document`]); handles are [`NodeId`]s.
//! - Each element keeps a handler slot table. Only the root container carries
//!   native listeners, one per supported event kind.
//! - Children are diffed by position. There is no keyed reordering.
//!
//! ## Modules
//!
//! - [`types`] - Virtual nodes, attribute classification, events
//! - [`engine`] - Live display tree and mutation journal
//! - [`renderer`] - Materializer and reconciler
//! - [`state`] - Event delegation, store, router
//! - [`pipeline`] - Render sessions and mounting

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{Document, Listener, Mutation, NodeId};

pub use error::{DomError, RenderError};

pub use renderer::{NodeRefs, Patcher};

pub use state::{
    collect_handlers, dispatch, install_root_listeners,
    Router, RouteCallback, StateRenderer, Store, WeakStore, DEFAULT_LOCATION,
};

pub use pipeline::{mount, MountHandle, RenderOptions, RenderSession};
