//! Edit Mode Module - The process-wide edit-mode toggle
//!
//! Turning edit mode on:
//! - attaches the selection dispatcher to the input source
//! - installs the exit guard (hosts ask `confirmation()` before quitting)
//!
//! Turning it off undoes both. Either transition is safe to repeat.
//!
//! The flag lives in a `Signal<bool>` so reactive renderers can track it,
//! and every `set` is also broadcast synchronously to subscribers, even
//! when the value did not change.
//!
//! # Example
//!
//! ```ignore
//! let sub = cms.edit_mode().subscribe(|enabled| println!("editing: {enabled}"));
//! cms.edit_mode().set(true);
//! assert!(cms.edit_mode().get());
//! ```

use std::cell::Cell;
use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::debug;

use super::channel::{Channel, Subscription};
use super::keyboard::InputSource;
use super::selection::Selection;
use crate::config::DEFAULT_EXIT_PROMPT;

// =============================================================================
// EXIT GUARD
// =============================================================================

/// Navigation-exit confirmation guard.
#[derive(Clone)]
pub struct ExitGuard {
    prompt: Rc<str>,
    installed: Rc<Cell<bool>>,
}

impl ExitGuard {
    pub fn new(prompt: impl Into<String>) -> Self {
        let prompt: String = prompt.into();
        Self {
            prompt: Rc::from(prompt),
            installed: Rc::new(Cell::new(false)),
        }
    }

    pub fn install(&self) {
        self.installed.set(true);
    }

    pub fn remove(&self) {
        self.installed.set(false);
    }

    pub fn is_installed(&self) -> bool {
        self.installed.get()
    }

    /// The question to ask before leaving, if the guard is installed.
    pub fn confirmation(&self) -> Option<String> {
        self.is_installed().then(|| self.prompt.to_string())
    }
}

impl Default for ExitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_EXIT_PROMPT)
    }
}

// =============================================================================
// EDIT MODE
// =============================================================================

#[derive(Clone)]
pub struct EditMode {
    flag: Signal<bool>,
    changes: Channel<bool>,
    selection: Selection,
    input: InputSource,
    guard: ExitGuard,
}

impl EditMode {
    pub fn new(selection: Selection, input: InputSource, guard: ExitGuard) -> Self {
        Self {
            flag: signal(false),
            changes: Channel::new(),
            selection,
            input,
            guard,
        }
    }

    pub fn get(&self) -> bool {
        self.flag.get()
    }

    /// The flag as a signal, for reactive tracking.
    pub fn signal(&self) -> Signal<bool> {
        self.flag.clone()
    }

    /// Switch edit mode, run the transition side effects, then notify.
    /// Returns `value`.
    pub fn set(&self, value: bool) -> bool {
        if value {
            self.selection.setup(&self.input);
            self.guard.install();
        } else {
            self.selection.destroy();
            self.guard.remove();
        }

        self.flag.set(value);
        debug!(enabled = value, "edit mode set");
        self.changes.emit(&value);
        value
    }

    /// Receive every `set`, including redundant ones.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + 'static,
    {
        self.changes.subscribe(listener)
    }

    pub fn guard(&self) -> &ExitGuard {
        &self.guard
    }

    pub(crate) fn clear_listeners(&self) {
        self.changes.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
