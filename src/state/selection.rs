//! Selection Module - Slot registry and keyboard-driven focus traversal
//!
//! Every mounted editable region owns one slot in an ordered sequence:
//! - `presubscribe` reserves a slot (reusing the lowest free one first)
//! - `subscribe` installs the region's focus handler, making it active
//! - `unsubscribe` frees the slot; only the tail is ever removed
//!
//! Indices are stable for as long as a region holds them. Freed interior
//! slots stay in place as holes until a later `presubscribe` reuses them.
//!
//! The registry also owns the keyboard dispatcher: holding the advance
//! combo's hold key (Ctrl) and pressing its trigger key (Shift) moves focus
//! to the next slot. The trigger must be released and pressed again before
//! the combo fires a second time.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use inline_cms::state::Selection;
//!
//! let selection = Selection::default();
//! let index = selection.presubscribe();
//! selection.subscribe(Rc::new(|focused| println!("focused: {focused}")), Some(index));
//!
//! selection.select(index);
//! selection.unsubscribe(index);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::channel::Subscription;
use super::keyboard::{InputSource, KeyInput, KeyPressState};
use crate::config::AdvanceCombo;

// =============================================================================
// TYPES
// =============================================================================

/// Focus callback: `true` grants focus, `false` revokes it.
pub type FocusHandler = Rc<dyn Fn(bool)>;

/// One region's reservation.
#[derive(Clone, Default)]
pub enum Slot {
    /// Free for reuse.
    #[default]
    Unreserved,
    /// Claimed by a mounting region that has no handler yet.
    ReservedEmpty,
    /// Holds the region's focus handler.
    Active(FocusHandler),
}

impl Slot {
    pub fn state(&self) -> SlotState {
        match self {
            Slot::Unreserved => SlotState::Unreserved,
            Slot::ReservedEmpty => SlotState::ReservedEmpty,
            Slot::Active(_) => SlotState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Slot::Active(_))
    }

    fn handler(&self) -> Option<FocusHandler> {
        match self {
            Slot::Active(handler) => Some(Rc::clone(handler)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.state(), f)
    }
}

/// Handler-free view of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Unreserved,
    ReservedEmpty,
    Active,
}

/// What `select` moves focus to.
#[derive(Clone)]
pub enum SelectTarget {
    Index(usize),
    /// The slot holding this handler, found by pointer identity.
    Handler(FocusHandler),
}

impl From<usize> for SelectTarget {
    fn from(index: usize) -> Self {
        SelectTarget::Index(index)
    }
}

impl From<FocusHandler> for SelectTarget {
    fn from(handler: FocusHandler) -> Self {
        SelectTarget::Handler(handler)
    }
}

impl std::fmt::Debug for SelectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectTarget::Index(index) => f.debug_tuple("Index").field(index).finish(),
            SelectTarget::Handler(handler) => f
                .debug_tuple("Handler")
                .field(&Rc::as_ptr(handler).cast::<()>())
                .finish(),
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

struct SelectionState {
    slots: Vec<Slot>,
    current: Option<usize>,
    keys: KeyPressState,
    combo: AdvanceCombo,
    dispatcher: Option<Subscription>,
}

/// Cloneable handle to the process-wide slot registry.
#[derive(Clone)]
pub struct Selection {
    state: Rc<RefCell<SelectionState>>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(AdvanceCombo::default())
    }
}

impl Selection {
    pub fn new(combo: AdvanceCombo) -> Self {
        Self {
            state: Rc::new(RefCell::new(SelectionState {
                slots: Vec::new(),
                current: None,
                keys: KeyPressState::new(),
                combo,
                dispatcher: None,
            })),
        }
    }

    // -------------------------------------------------------------------------
    // Slot lifecycle
    // -------------------------------------------------------------------------

    /// Reserve a slot: the first unreserved one, or a new one at the tail.
    pub fn presubscribe(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let free = state
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Unreserved));

        let index = match free {
            Some(index) => {
                state.slots[index] = Slot::ReservedEmpty;
                index
            }
            None => {
                state.slots.push(Slot::ReservedEmpty);
                state.slots.len() - 1
            }
        };

        trace!(index, reused = free.is_some(), "slot reserved");
        index
    }

    /// Install a focus handler.
    ///
    /// With `Some(index)` the slot (normally obtained from `presubscribe`)
    /// becomes active. With `None` a new active slot is appended. Returns the
    /// index the handler now lives at.
    pub fn subscribe(&self, handler: FocusHandler, index: Option<usize>) -> usize {
        let mut state = self.state.borrow_mut();

        let Some(index) = index else {
            state.slots.push(Slot::Active(handler));
            let index = state.slots.len() - 1;
            trace!(index, "slot appended active");
            return index;
        };

        if index >= state.slots.len() {
            warn!(index, len = state.slots.len(), "subscribe past the tail, padding");
            state.slots.resize_with(index + 1, Slot::default);
        } else if matches!(state.slots[index], Slot::Unreserved) {
            warn!(index, "subscribe into an unreserved slot");
        }

        state.slots[index] = Slot::Active(handler);
        trace!(index, "slot active");
        index
    }

    /// Free a slot. The sequence shrinks by one only when `index` is the tail.
    ///
    /// Out-of-range or already unreserved indices are ignored.
    pub fn unsubscribe(&self, index: usize) {
        let mut state = self.state.borrow_mut();

        match state.slots.get(index) {
            None => {
                debug!(index, "unsubscribe out of range ignored");
                return;
            }
            Some(Slot::Unreserved) => {
                debug!(index, "unsubscribe of a free slot ignored");
                return;
            }
            Some(_) => {}
        }

        state.slots[index] = Slot::Unreserved;
        if index == state.slots.len() - 1 {
            state.slots.pop();
        }
        trace!(index, len = state.slots.len(), "slot released");
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    /// Move focus to a slot, given by index or by the handler it holds.
    ///
    /// No-op when the target is already current or the handler is not
    /// registered. Otherwise the previous focus is revoked and the target
    /// becomes current; an index that is not active falls back to slot 0,
    /// which is granted focus only if it is itself active.
    pub fn select(&self, target: impl Into<SelectTarget>) {
        let index = match target.into() {
            SelectTarget::Index(index) => index,
            SelectTarget::Handler(handler) => match self.position_of(&handler) {
                Some(index) => index,
                None => {
                    debug!("select target not registered");
                    return;
                }
            },
        };

        if self.current_index() == Some(index) {
            return;
        }

        self.unselect();

        let granted = {
            let mut state = self.state.borrow_mut();
            state.current = Some(index);

            let active = state.slots.get(index).is_some_and(Slot::is_active);
            if !state.slots.is_empty() && !active {
                state.current = Some(0);
            }

            let current = state.current.unwrap_or(index);
            debug!(requested = index, current, "selection moved");
            state.slots.get(current).and_then(Slot::handler)
        };

        if let Some(handler) = granted {
            handler(true);
        }
    }

    /// Revoke focus from the current slot, if it is active.
    ///
    /// `current_index` is left untouched.
    pub fn unselect(&self) {
        let revoked = {
            let state = self.state.borrow();
            state
                .current
                .and_then(|current| state.slots.get(current))
                .and_then(Slot::handler)
        };

        if let Some(handler) = revoked {
            handler(false);
        }
    }

    fn position_of(&self, handler: &FocusHandler) -> Option<usize> {
        self.state.borrow().slots.iter().position(|slot| match slot {
            Slot::Active(existing) => Rc::ptr_eq(existing, handler),
            _ => false,
        })
    }

    // -------------------------------------------------------------------------
    // Keyboard dispatcher
    // -------------------------------------------------------------------------

    /// Feed one key event to the dispatcher.
    /// Returns true if it advanced the selection.
    pub fn on_key(&self, input: &KeyInput) -> bool {
        {
            let mut state = self.state.borrow_mut();
            state.keys.apply(input);

            let combo = state.combo;
            if !(state.keys.is_pressed(combo.hold) && state.keys.is_pressed(combo.trigger)) {
                return false;
            }
            // Trigger must be pressed again before the next advance.
            state.keys.release(combo.trigger);
        }

        self.unselect();
        let next = self.current_index().map_or(0, |current| current.saturating_add(1));
        debug!(next, "advance combo");
        self.select(next);
        true
    }

    /// Attach the dispatcher to `input`. Attaching twice is a no-op.
    pub fn setup(&self, input: &InputSource) {
        if self.is_attached() {
            return;
        }

        let weak = Rc::downgrade(&self.state);
        let subscription = input.on(move |key| match weak.upgrade() {
            Some(state) => Selection { state }.on_key(key),
            None => false,
        });

        self.state.borrow_mut().dispatcher = Some(subscription);
        debug!("selection dispatcher attached");
    }

    /// Detach the dispatcher. Detaching twice is a no-op.
    pub fn destroy(&self) {
        let dispatcher = self.state.borrow_mut().dispatcher.take();
        if let Some(subscription) = dispatcher {
            subscription.unsubscribe();
            debug!("selection dispatcher detached");
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn current_index(&self) -> Option<usize> {
        self.state.borrow().current
    }

    pub fn len(&self) -> usize {
        self.state.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().slots.is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().dispatcher.is_some()
    }

    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.state.borrow().slots.get(index).map(Slot::state)
    }

    pub fn slot_states(&self) -> Vec<SlotState> {
        self.state.borrow().slots.iter().map(Slot::state).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keyboard::{KEY_CTRL, KEY_SHIFT};
    use std::cell::RefCell;

    type CallLog = Rc<RefCell<Vec<(usize, bool)>>>;

    fn recorder(log: &CallLog, id: usize) -> FocusHandler {
        let log = log.clone();
        Rc::new(move |focused| log.borrow_mut().push((id, focused)))
    }

    fn three_regions() -> (Selection, CallLog) {
        let selection = Selection::default();
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let index = selection.presubscribe();
            selection.subscribe(recorder(&log, id), Some(index));
        }
        (selection, log)
    }

    fn press_combo(selection: &Selection) -> bool {
        selection.on_key(&KeyInput::press(KEY_CTRL));
        selection.on_key(&KeyInput::press(KEY_SHIFT))
    }

    #[test]
    fn test_presubscribe_appends() {
        let selection = Selection::default();
        assert_eq!(selection.presubscribe(), 0);
        assert_eq!(selection.presubscribe(), 1);
        assert_eq!(selection.presubscribe(), 2);
        assert_eq!(
            selection.slot_states(),
            vec![SlotState::ReservedEmpty; 3]
        );
    }

    #[test]
    fn test_presubscribe_reuses_lowest_hole() {
        let selection = Selection::default();
        for _ in 0..4 {
            selection.presubscribe();
        }
        selection.unsubscribe(2);
        selection.unsubscribe(1);

        assert_eq!(selection.len(), 4);
        assert_eq!(selection.presubscribe(), 1);
        assert_eq!(selection.presubscribe(), 2);
        assert_eq!(selection.presubscribe(), 4);
    }

    #[test]
    fn test_unsubscribe_tail_shrinks_by_one() {
        let selection = Selection::default();
        for _ in 0..3 {
            selection.presubscribe();
        }
        selection.unsubscribe(1);
        assert_eq!(selection.len(), 3);

        selection.unsubscribe(2);
        // Only the tail goes; the hole at 1 stays.
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.slot_state(1), Some(SlotState::Unreserved));
    }

    #[test]
    fn test_unsubscribe_ignores_free_and_out_of_range() {
        let selection = Selection::default();
        selection.presubscribe();
        selection.presubscribe();
        selection.unsubscribe(0);

        selection.unsubscribe(0);
        selection.unsubscribe(9);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_reserved_empty_can_unsubscribe() {
        let selection = Selection::default();
        let index = selection.presubscribe();
        selection.unsubscribe(index);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_subscribe_without_index_appends_active() {
        let selection = Selection::default();
        selection.presubscribe();
        let index = selection.subscribe(Rc::new(|_: bool| {}), None);
        assert_eq!(index, 1);
        assert_eq!(selection.slot_state(1), Some(SlotState::Active));
    }

    #[test]
    fn test_subscribe_index_zero_installs() {
        let selection = Selection::default();
        let index = selection.presubscribe();
        assert_eq!(selection.subscribe(Rc::new(|_: bool| {}), Some(index)), 0);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.slot_state(0), Some(SlotState::Active));
    }

    #[test]
    fn test_subscribe_past_tail_pads() {
        let selection = Selection::default();
        selection.subscribe(Rc::new(|_: bool| {}), Some(2));
        assert_eq!(
            selection.slot_states(),
            vec![SlotState::Unreserved, SlotState::Unreserved, SlotState::Active]
        );
        assert_eq!(selection.presubscribe(), 0);
    }

    #[test]
    fn test_select_moves_focus_in_order() {
        let (selection, log) = three_regions();

        selection.select(0);
        selection.select(1);

        assert_eq!(*log.borrow(), vec![(0, true), (0, false), (1, true)]);
        assert_eq!(selection.current_index(), Some(1));
    }

    #[test]
    fn test_select_same_target_twice_is_noop() {
        let (selection, log) = three_regions();

        selection.select(2);
        selection.select(2);

        assert_eq!(*log.borrow(), vec![(2, true)]);
    }

    #[test]
    fn test_select_inactive_falls_back_to_zero() {
        let (selection, log) = three_regions();
        selection.unsubscribe(1);

        selection.select(1);

        assert_eq!(selection.current_index(), Some(0));
        assert_eq!(*log.borrow(), vec![(0, true)]);
    }

    #[test]
    fn test_fallback_to_inactive_zero_focuses_nothing() {
        let (selection, log) = three_regions();
        selection.unsubscribe(0);

        selection.select(7);

        assert_eq!(selection.current_index(), Some(0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_select_on_empty_registry_keeps_target() {
        let selection = Selection::default();
        selection.select(3);
        assert_eq!(selection.current_index(), Some(3));
    }

    #[test]
    fn test_select_by_handler_identity() {
        let selection = Selection::default();
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let first = recorder(&log, 0);
        let second = recorder(&log, 1);
        selection.subscribe(first, None);
        selection.subscribe(second.clone(), None);

        selection.select(second.clone());
        assert_eq!(selection.current_index(), Some(1));
        assert_eq!(*log.borrow(), vec![(1, true)]);

        // Same handler again resolves to the current slot.
        selection.select(second);
        assert_eq!(*log.borrow(), vec![(1, true)]);

        // Never registered: no-op.
        let stranger: FocusHandler = Rc::new(|_: bool| {});
        selection.select(stranger);
        assert_eq!(selection.current_index(), Some(1));
        assert_eq!(*log.borrow(), vec![(1, true)]);
    }

    #[test]
    fn test_select_target_conversions() {
        assert!(matches!(SelectTarget::from(4), SelectTarget::Index(4)));

        let handler: FocusHandler = Rc::new(|_: bool| {});
        match SelectTarget::from(handler.clone()) {
            SelectTarget::Handler(inner) => assert!(Rc::ptr_eq(&inner, &handler)),
            SelectTarget::Index(_) => panic!("expected a handler target"),
        }
    }

    #[test]
    fn test_unselect_keeps_current_index() {
        let (selection, log) = three_regions();
        selection.select(1);
        selection.unselect();

        assert_eq!(selection.current_index(), Some(1));
        assert_eq!(log.borrow().last(), Some(&(1, false)));
    }

    #[test]
    fn test_combo_advances_from_none_to_zero() {
        let (selection, log) = three_regions();

        assert!(press_combo(&selection));
        assert_eq!(selection.current_index(), Some(0));
        assert_eq!(*log.borrow(), vec![(0, true)]);
    }

    #[test]
    fn test_combo_is_edge_triggered() {
        let (selection, _log) = three_regions();

        press_combo(&selection);
        // Shift auto-repeat while both are held does not advance.
        assert!(!selection.on_key(&KeyInput::repeat(KEY_SHIFT)));
        assert!(!selection.on_key(&KeyInput::repeat(KEY_CTRL)));
        assert_eq!(selection.current_index(), Some(0));

        selection.on_key(&KeyInput::release(KEY_SHIFT));
        assert!(selection.on_key(&KeyInput::press(KEY_SHIFT)));
        assert_eq!(selection.current_index(), Some(1));
    }

    #[test]
    fn test_combo_needs_hold_key() {
        let (selection, _log) = three_regions();
        assert!(!selection.on_key(&KeyInput::press(KEY_SHIFT)));
        selection.on_key(&KeyInput::release(KEY_SHIFT));
        assert_eq!(selection.current_index(), None);
    }

    #[test]
    fn test_combo_past_last_slot_falls_back_to_zero() {
        let (selection, log) = three_regions();
        selection.select(2);
        log.borrow_mut().clear();

        press_combo(&selection);

        assert_eq!(selection.current_index(), Some(0));
        assert_eq!(log.borrow().last(), Some(&(0, true)));
    }

    #[test]
    fn test_combo_from_max_index_does_not_overflow() {
        let selection = Selection::default();
        selection.select(usize::MAX);
        assert_eq!(selection.current_index(), Some(usize::MAX));

        // Saturates onto the current index, so the advance is a no-op.
        assert!(press_combo(&selection));
        assert_eq!(selection.current_index(), Some(usize::MAX));
    }

    #[test]
    fn test_resubscribe_active_slot_replaces_handler() {
        let selection = Selection::default();
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let index = selection.presubscribe();
        selection.subscribe(recorder(&log, 1), Some(index));
        selection.subscribe(recorder(&log, 2), Some(index));

        assert_eq!(selection.len(), 1);
        selection.select(index);
        assert_eq!(*log.borrow(), vec![(2, true)]);
    }

    #[test]
    fn test_setup_is_idempotent() {
        let (selection, log) = three_regions();
        let input = InputSource::new();

        selection.setup(&input);
        selection.setup(&input);
        assert_eq!(input.handler_count(), 1);

        input.dispatch(KeyInput::press(KEY_CTRL));
        assert!(input.dispatch(KeyInput::press(KEY_SHIFT)));
        assert_eq!(*log.borrow(), vec![(0, true)]);

        selection.destroy();
        selection.destroy();
        assert!(!selection.is_attached());
        assert_eq!(input.handler_count(), 0);
    }

    #[test]
    fn test_handler_may_reenter_registry() {
        let selection = Selection::default();
        let inner = selection.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        selection.subscribe(
            Rc::new(move |focused| seen_clone.borrow_mut().push((focused, inner.current_index()))),
            None,
        );

        selection.select(0);
        assert_eq!(*seen.borrow(), vec![(true, Some(0))]);
    }
}
