//! Render Pipeline
//!
//! Connects application state to the display tree.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Store::set_state → view(state) → RenderSession::render → Patcher → Document
//! ```
//!
//! ## Data Flow
//!
//! 1. **Store** - applies the mutation and calls the installed renderer
//! 2. **view** - builds a fresh virtual tree from the snapshot
//! 3. **RenderSession** - materializes (first pass) or reconciles (later passes)
//!
//! Passes are synchronous: a mutation returns only after its render completed.

pub mod mount;
pub mod session;

pub use mount::{mount, MountHandle};
pub use session::{RenderOptions, RenderSession};
