//! # inline-cms
//!
//! Inline content editing for rendered UI trees.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! reactive edit-mode flag.
//!
//! ## Architecture
//!
//! A single [`Cms`] service object, built once at startup, owns three pieces of
//! shared coordination state:
//!
//! ```text
//! EditMode ──set──▶ Selection::setup/destroy + ExitGuard
//! ContentStore ──ContentChange──▶ every region (filters by its code)
//! Selection ──focus(bool)──▶ the region owning the slot
//! InputSource ──KeyInput──▶ Selection dispatcher, region highlight
//! ```
//!
//! Renderers mount one [`InlineRegion`] per editable piece of text. Each
//! region resolves a dot-separated path code from nested [`CodeContext`]
//! scopes, follows its content in the store, and holds a selection slot while
//! edit mode is on. Holding Ctrl and pressing Shift moves keyboard focus to the
//! next region.
//!
//! Everything is single-threaded: handles are `Rc`-based and notifications
//! are delivered synchronously in subscription order.
//!
//! ## Modules
//!
//! - [`state`] - Channel, keyboard, edit mode, contents, selection
//! - [`primitives`] - Code contexts and inline regions
//! - [`cms`] - The service object
//! - [`config`] - Key bindings, prompts, export file name
//! - [`error`] - Errors for JSON and file IO

pub mod cms;
pub mod config;
pub mod error;
pub mod primitives;
pub mod state;

pub use cms::Cms;
pub use config::{AdvanceCombo, CmsConfig};
pub use error::{CmsError, Result};

pub use primitives::{CodeContext, InlineProps, InlineRegion, RegionView, simplify};

pub use state::{
    // Channel
    Channel, Subscription,
    // Keyboard
    InputSource, KeyInput, KeyPressState, KeyState, KEY_CTRL, KEY_SHIFT,
    // Edit mode
    EditMode, ExitGuard,
    // Contents
    ContentChange, ContentStore,
    // Selection
    FocusHandler, SelectTarget, Selection, Slot, SlotState,
};
