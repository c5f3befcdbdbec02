//! Primitives - Region-level building blocks.
//!
//! - [`CodeContext`] - Nested naming scopes that compose path codes
//! - [`InlineRegion`] - One editable region bound to the shared services
//!
//! # Lifecycle
//!
//! A region:
//! 1. Resolves its path code from the enclosing scope
//! 2. Reads and follows its content in the store
//! 3. Reserves a selection slot while edit mode is on
//! 4. Releases everything on `unmount`

mod context;
mod inline;

pub use context::*;
pub use inline::*;
