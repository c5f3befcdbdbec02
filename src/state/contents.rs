//! Contents Module - Path code -> content store with change notification
//!
//! Holds every region's content keyed by its path code (`App.Section1.Title`).
//! Entries are only ever overwritten, never removed. Every `set` is broadcast
//! as a `ContentChange` to all subscribers; filtering by code is up to them,
//! which is how several regions sharing one code stay in sync.
//!
//! # Example
//!
//! ```ignore
//! use inline_cms::state::ContentStore;
//!
//! let store = ContentStore::new();
//! store.init([("A".to_string(), "hi".to_string())]);
//!
//! let sub = store.subscribe(|change| println!("{} = {}", change.code, change.content));
//! store.set("A", "bye");
//! assert_eq!(store.get("A").as_deref(), Some("bye"));
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::channel::{Channel, Subscription};
use crate::error::{CmsError, Result};

/// Broadcast on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    pub code: String,
    pub content: String,
}

#[derive(Clone, Default)]
pub struct ContentStore {
    data: Rc<RefCell<BTreeMap<String, String>>>,
    changes: Channel<ContentChange>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole store with `initial`. No merge with prior state.
    pub fn init<I, K, V>(&self, initial: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data: BTreeMap<String, String> = initial
            .into_iter()
            .map(|(code, content)| (code.into(), content.into()))
            .collect();
        debug!(entries = data.len(), "contents initialized");
        *self.data.borrow_mut() = data;
    }

    /// Replace the whole store from a JSON object of strings.
    pub fn init_from_json(&self, json: &str) -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = match value {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(CmsError::InvalidContents(format!(
                    "expected an object, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut entries = BTreeMap::new();
        for (code, content) in object {
            match content {
                serde_json::Value::String(content) => {
                    entries.insert(code, content);
                }
                other => {
                    return Err(CmsError::InvalidContents(format!(
                        "'{code}' holds {}, not a string",
                        json_kind(&other)
                    )));
                }
            }
        }

        self.init(entries);
        Ok(())
    }

    /// Stored content for `code`. `None` means absent; `Some("")` is a
    /// valid stored value.
    pub fn get(&self, code: &str) -> Option<String> {
        self.data.borrow().get(code).cloned()
    }

    /// Upsert and notify every subscriber, changed or not.
    pub fn set(&self, code: impl Into<String>, content: impl Into<String>) {
        let change = ContentChange {
            code: code.into(),
            content: content.into(),
        };
        self.data
            .borrow_mut()
            .insert(change.code.clone(), change.content.clone());
        trace!(code = %change.code, len = change.content.len(), "content set");
        self.changes.emit(&change);
    }

    /// Receive every `set`, for every code.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ContentChange) + 'static,
    {
        self.changes.subscribe(listener)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.data.borrow().contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Copy of the full mapping.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.data.borrow().clone()
    }

    /// The full mapping as compact JSON text.
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string(&*self.data.borrow())?)
    }

    pub(crate) fn clear_listeners(&self) {
        self.changes.clear();
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
