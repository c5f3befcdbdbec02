//! Code Context - Hierarchical path codes for content entries
//!
//! Nested naming scopes compose into dot-separated path codes:
//!
//! ```text
//! CodeContext::root()
//!   .nested("App")            -> "App"
//!   .nested("Section1")       -> "App.Section1"
//!   .resolve(Some("Title"))   -> "App.Section1.Title"
//! ```
//!
//! A region without an explicit code falls back to a code derived from its
//! default content (see [`simplify`]).

/// An immutable naming scope. `root()` has no path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeContext {
    path: Option<String>,
}

impl CodeContext {
    pub fn root() -> Self {
        Self::default()
    }

    /// Scope named after a component, for wrapping whole components.
    pub fn for_component(name: &str) -> Self {
        Self::root().nested(name)
    }

    /// Child scope `segment` below this one.
    ///
    /// An empty parent path counts as no parent.
    pub fn nested(&self, segment: &str) -> Self {
        let path = match self.path.as_deref() {
            Some(parent) if !parent.is_empty() => format!("{parent}.{segment}"),
            _ => segment.to_string(),
        };
        Self { path: Some(path) }
    }

    /// Run `f` inside child scope `segment`.
    pub fn scope<R>(&self, segment: &str, f: impl FnOnce(&CodeContext) -> R) -> R {
        f(&self.nested(segment))
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Full path code for a region in this scope.
    ///
    /// `code` falls back to `simplify(default_content)` when absent or
    /// empty. `context_free` ignores this scope entirely.
    pub fn resolve(&self, code: Option<&str>, context_free: bool, default_content: &str) -> String {
        let leaf = match code {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => simplify(default_content),
        };

        match self.path.as_deref() {
            Some(path) if !path.is_empty() && !context_free => format!("{path}.{leaf}"),
            _ => leaf,
        }
    }
}

/// Turn display text into a code segment.
///
/// Only the first space and the first dot are replaced with `_`; codes
/// already stored under this rule must keep resolving to the same entry.
pub fn simplify(text: &str) -> String {
    text.replacen(' ', "_", 1).replacen('.', "_", 1)
}
