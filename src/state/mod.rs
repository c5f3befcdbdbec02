//! State Module - Shared coordination state
//!
//! The three process-wide services every editable region talks to, plus the
//! primitives they are built from:
//!
//! - **Channel** - Typed synchronous pub/sub used by everything below
//! - **Keyboard** - Key events, pressed-key tracking, the input source
//! - **Edit mode** - The on/off toggle and its exit guard
//! - **Contents** - Path code -> content store with change broadcast
//! - **Selection** - Slot registry and the focus-advance dispatcher

pub mod channel;
pub mod contents;
pub mod edit_mode;
pub mod keyboard;
pub mod selection;

pub use channel::*;
pub use contents::*;
pub use edit_mode::*;
pub use keyboard::*;
pub use selection::*;
