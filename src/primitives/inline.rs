//! Inline Region - The per-region binding a renderer drives
//!
//! One `InlineRegion` per editable piece of text. It wires the region into
//! the shared services for its whole mount lifecycle:
//!
//! 1. Resolves its path code from the enclosing [`CodeContext`]
//! 2. Reads its content from the store and follows every change to that code
//! 3. Holds a selection slot while edit mode is on and it is visible
//! 4. Tracks the highlight key while edit mode is on and it is visible
//!
//! The renderer reads [`InlineRegion::view`] and forwards host events
//! (`set_content`, `focus`, `blur`, `set_visible`).
//!
//! # Example
//!
//! ```ignore
//! let app = CodeContext::for_component("App");
//! let title = InlineRegion::mount(&cms, &app, InlineProps::new("Example title").code("Title"));
//!
//! title.set_content("New title");
//! assert_eq!(cms.contents().get("App.Title").as_deref(), Some("New title"));
//!
//! title.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use super::context::CodeContext;
use crate::cms::Cms;
use crate::state::{FocusHandler, KeyInput, Subscription};

// =============================================================================
// Props
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineProps {
    /// Leaf code. Derived from `default_content` when absent.
    pub code: Option<String>,
    /// Ignore enclosing scopes when resolving the path code.
    pub context_free: bool,
    /// Shown when the store has nothing for this code.
    pub default_content: String,
}

impl InlineProps {
    pub fn new(default_content: impl Into<String>) -> Self {
        Self {
            default_content: default_content.into(),
            ..Default::default()
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn context_free(mut self) -> Self {
        self.context_free = true;
        self
    }
}

/// What a renderer needs to draw the region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionView {
    pub code: String,
    pub content: String,
    /// Render as editable markup.
    pub editable: bool,
    /// Owns keyboard focus.
    pub selected: bool,
    /// Highlight key is held.
    pub highlighted: bool,
}

// =============================================================================
// Region state
// =============================================================================

struct RegionState {
    cms: Cms,
    code: String,
    content: RefCell<String>,
    enabled: Cell<bool>,
    visible: Cell<bool>,
    selected: Cell<bool>,
    highlighted: Cell<bool>,
    reserved: Cell<Option<usize>>,
}

impl RegionState {
    fn is_live(&self) -> bool {
        self.enabled.get() && self.visible.get()
    }

    /// Hold a slot exactly while live.
    fn sync_selection(self: &Rc<Self>) {
        let selection = self.cms.selection();

        match (self.is_live(), self.reserved.get()) {
            (true, None) => {
                let index = selection.presubscribe();
                self.reserved.set(Some(index));

                let weak = Rc::downgrade(self);
                let handler: FocusHandler = Rc::new(move |focused| {
                    if let Some(state) = weak.upgrade() {
                        state.selected.set(focused);
                    }
                });
                selection.subscribe(handler, Some(index));
                trace!(code = %self.code, index, "region holds slot");
            }
            (false, Some(index)) => {
                self.release_slot(index);
                self.highlighted.set(false);
            }
            _ => {}
        }
    }

    fn release_slot(&self, index: usize) {
        self.reserved.set(None);
        self.selected.set(false);
        self.cms.selection().unsubscribe(index);
        trace!(code = %self.code, index, "region released slot");
    }

    fn on_key(&self, input: &KeyInput) {
        if !self.is_live() {
            return;
        }
        if input.is_release() {
            self.highlighted.set(false);
        } else if input.is_press() && input.code == self.cms.config().highlight_key {
            self.highlighted.set(true);
        }
    }
}

// =============================================================================
// Inline region
// =============================================================================

/// A mounted editable region.
///
/// Must be released with [`InlineRegion::unmount`]; dropping it keeps its
/// slot and listeners registered.
pub struct InlineRegion {
    state: Rc<RegionState>,
    subscriptions: Vec<Subscription>,
}

impl InlineRegion {
    pub fn mount(cms: &Cms, context: &CodeContext, props: InlineProps) -> Self {
        let code = context.resolve(props.code.as_deref(), props.context_free, &props.default_content);
        let content = cms.contents().get(&code).unwrap_or(props.default_content);

        let state = Rc::new(RegionState {
            cms: cms.clone(),
            code,
            content: RefCell::new(content),
            enabled: Cell::new(cms.is_enabled()),
            visible: Cell::new(true),
            selected: Cell::new(false),
            highlighted: Cell::new(false),
            reserved: Cell::new(None),
        });

        let weak = Rc::downgrade(&state);
        let content_sub = cms.contents().subscribe(move |change| {
            if let Some(state) = weak.upgrade() {
                if change.code == state.code {
                    *state.content.borrow_mut() = change.content.clone();
                }
            }
        });

        let weak = Rc::downgrade(&state);
        let mode_sub = cms.edit_mode().subscribe(move |enabled| {
            if let Some(state) = weak.upgrade() {
                state.enabled.set(*enabled);
                state.sync_selection();
            }
        });

        let weak = Rc::downgrade(&state);
        let key_sub = cms.input().on(move |input| {
            if let Some(state) = weak.upgrade() {
                state.on_key(input);
            }
            false
        });

        state.sync_selection();
        trace!(code = %state.code, "region mounted");

        Self {
            state,
            subscriptions: vec![content_sub, mode_sub, key_sub],
        }
    }

    /// Release the slot and every listener.
    pub fn unmount(self) {
        if let Some(index) = self.state.reserved.get() {
            self.state.release_slot(index);
        }
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
        trace!(code = %self.state.code, "region unmounted");
    }

    // -------------------------------------------------------------------------
    // Host events
    // -------------------------------------------------------------------------

    /// Write edited content for every region sharing this code.
    ///
    /// The first empty-content placeholder is stripped before storing.
    pub fn set_content(&self, value: &str) {
        let placeholder = &self.state.cms.config().empty_placeholder;
        let cleaned = if placeholder.is_empty() {
            value.to_string()
        } else {
            value.replacen(placeholder.as_str(), "", 1)
        };
        self.state.cms.contents().set(self.state.code.clone(), cleaned);
    }

    /// Ask for focus (`true`) or give it up (`false`).
    pub fn set_selected(&self, value: bool) {
        let Some(index) = self.state.reserved.get() else {
            if !value {
                self.state.selected.set(false);
            }
            return;
        };

        let selection = self.state.cms.selection();
        if value {
            if selection.current_index() == Some(index) {
                // Blurred but still current: select() would be a no-op.
                self.state.selected.set(true);
            } else {
                selection.select(index);
            }
        } else if self.state.selected.get() {
            if selection.current_index() == Some(index) {
                selection.unselect();
            } else {
                self.state.selected.set(false);
            }
        }
    }

    /// Host focus landed on this region.
    pub fn focus(&self) {
        if !self.state.selected.get() {
            self.set_selected(true);
        }
    }

    /// Host focus left this region.
    pub fn blur(&self) {
        if self.state.selected.get() {
            self.set_selected(false);
        }
    }

    /// Visibility as reported by the renderer. Hidden regions give up their slot.
    pub fn set_visible(&self, visible: bool) {
        self.state.visible.set(visible);
        self.state.sync_selection();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn code(&self) -> &str {
        &self.state.code
    }

    /// Content as displayed: empty content shows the placeholder while editing.
    pub fn content(&self) -> String {
        let content = self.state.content.borrow();
        if content.is_empty() && self.state.enabled.get() {
            self.state.cms.config().empty_placeholder.clone()
        } else {
            content.clone()
        }
    }

    pub fn is_editable(&self) -> bool {
        self.state.enabled.get()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn is_selected(&self) -> bool {
        self.state.selected.get()
    }

    pub fn is_highlighted(&self) -> bool {
        self.state.highlighted.get()
    }

    /// Slot held in the selection registry, if any.
    pub fn slot(&self) -> Option<usize> {
        self.state.reserved.get()
    }

    pub fn view(&self) -> RegionView {
        RegionView {
            code: self.state.code.clone(),
            content: self.content(),
            editable: self.is_editable(),
            selected: self.is_selected(),
            highlighted: self.is_highlighted(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
