//! Keyboard Module - Key events, pressed-key tracking and the input source
//!
//! Key events carry DOM-style numeric key codes (`16` = Shift, `17` = Ctrl),
//! which is what the selection dispatcher and the region highlight react to.
//!
//! - `KeyInput` - One key transition (press, repeat, release)
//! - `KeyPressState` - Which key codes are currently held
//! - `InputSource` - The process-wide stream of key events handlers attach to
//! - `KeyInput::from_crossterm` - Terminal events into key inputs
//!
//! # Example
//!
//! ```ignore
//! use inline_cms::state::{InputSource, KeyInput, KEY_CTRL};
//!
//! let input = InputSource::new();
//! let sub = input.on(|key| {
//!     println!("code {}", key.code);
//!     false // Don't consume
//! });
//!
//! input.dispatch(KeyInput::press(KEY_CTRL));
//! sub.unsubscribe();
//! ```

use std::cell::Cell;
use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, ModifierKeyCode};

use super::channel::{Channel, Subscription};

// =============================================================================
// KEY CODES
// =============================================================================

pub const KEY_BACKSPACE: u32 = 8;
pub const KEY_TAB: u32 = 9;
pub const KEY_ENTER: u32 = 13;
pub const KEY_SHIFT: u32 = 16;
pub const KEY_CTRL: u32 = 17;
pub const KEY_ALT: u32 = 18;
pub const KEY_ESCAPE: u32 = 27;
pub const KEY_SPACE: u32 = 32;
pub const KEY_DELETE: u32 = 46;

// =============================================================================
// TYPES
// =============================================================================

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A single key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub code: u32,
    pub state: KeyState,
}

impl KeyInput {
    pub fn press(code: u32) -> Self {
        Self {
            code,
            state: KeyState::Press,
        }
    }

    pub fn repeat(code: u32) -> Self {
        Self {
            code,
            state: KeyState::Repeat,
        }
    }

    pub fn release(code: u32) -> Self {
        Self {
            code,
            state: KeyState::Release,
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    pub fn is_release(&self) -> bool {
        self.state == KeyState::Release
    }

    /// Convert a crossterm key event.
    ///
    /// Bare modifier keys are only reported by terminals running with the
    /// keyboard enhancement flags `REPORT_EVENT_TYPES` and
    /// `REPORT_ALL_KEYS_AS_ESCAPE_CODES`. Returns `None` for keys that have
    /// no key code mapping.
    pub fn from_crossterm(event: &KeyEvent) -> Option<Self> {
        let code = match event.code {
            KeyCode::Modifier(modifier) => match modifier {
                ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => KEY_SHIFT,
                ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => KEY_CTRL,
                ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => KEY_ALT,
                _ => return None,
            },
            KeyCode::Char(' ') => KEY_SPACE,
            KeyCode::Char(c) if c.is_ascii_alphanumeric() => c.to_ascii_uppercase() as u32,
            KeyCode::Enter => KEY_ENTER,
            KeyCode::Tab | KeyCode::BackTab => KEY_TAB,
            KeyCode::Backspace => KEY_BACKSPACE,
            KeyCode::Delete => KEY_DELETE,
            KeyCode::Esc => KEY_ESCAPE,
            _ => return None,
        };

        let state = match event.kind {
            KeyEventKind::Press => KeyState::Press,
            KeyEventKind::Repeat => KeyState::Repeat,
            KeyEventKind::Release => KeyState::Release,
        };

        Some(Self { code, state })
    }
}

// =============================================================================
// PRESSED KEYS
// =============================================================================

/// Key code -> pressed.
///
/// `Repeat` never changes the map: a key that is held stays in whatever
/// state the last press/release (or an explicit `release`) left it in.
#[derive(Clone, Debug, Default)]
pub struct KeyPressState {
    pressed: HashMap<u32, bool>,
}

impl KeyPressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, input: &KeyInput) {
        match input.state {
            KeyState::Press => {
                self.pressed.insert(input.code, true);
            }
            KeyState::Release => {
                self.pressed.insert(input.code, false);
            }
            KeyState::Repeat => {}
        }
    }

    pub fn is_pressed(&self, code: u32) -> bool {
        self.pressed.get(&code).copied().unwrap_or(false)
    }

    /// Forget a press without a physical release.
    pub fn release(&mut self, code: u32) {
        self.pressed.insert(code, false);
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

// =============================================================================
// INPUT SOURCE
// =============================================================================

/// The global stream of key events.
///
/// Every handler sees every event; consumption is only reported back to
/// the caller of `dispatch`.
#[derive(Clone, Default)]
pub struct InputSource {
    events: Channel<DispatchedKey>,
}

struct DispatchedKey {
    input: KeyInput,
    consumed: Cell<bool>,
}

impl InputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler.
    pub fn on<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&KeyInput) -> bool + 'static,
    {
        self.events.subscribe(move |event: &DispatchedKey| {
            if handler(&event.input) {
                event.consumed.set(true);
            }
        })
    }

    /// Deliver a key event to all handlers.
    /// Returns true if any handler consumed it.
    pub fn dispatch(&self, input: KeyInput) -> bool {
        let event = DispatchedKey {
            input,
            consumed: Cell::new(false),
        };
        self.events.emit(&event);
        event.consumed.get()
    }

    pub fn handler_count(&self) -> usize {
        self.events.listener_count()
    }

    /// Detach every handler.
    pub fn clear(&self) {
        self.events.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
