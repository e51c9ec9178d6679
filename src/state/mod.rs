//! State Module - Event delegation and application-facing state
//!
//! - **Delegation** - Root listeners, handler lookup along the propagation path
//! - **Store** - State snapshot with a mutate-and-rerender entry point
//! - **Router** - Location token to route mapping, change notification

pub mod delegation;
mod router;
mod store;

pub use delegation::{collect_handlers, dispatch, install_root_listeners};
pub use router::*;
pub use store::*;
