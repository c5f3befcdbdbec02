//! The application-wide service object.
//!
//! Build one `Cms` at startup and hand clones of it to everything that
//! renders editable regions. Clones share the same state.
//!
//! ```ignore
//! let cms = Cms::new(CmsConfig::default());
//! cms.init([("App.H1", "Hello")]);
//! cms.set_enabled(true);
//!
//! // Feed the host's key events:
//! cms.handle_key(KeyInput::press(KEY_CTRL));
//!
//! let json = cms.export()?;
//! cms.teardown();
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

use crate::config::CmsConfig;
use crate::error::{CmsError, Result};
use crate::state::{ContentStore, EditMode, ExitGuard, InputSource, KeyInput, Selection};

#[derive(Clone)]
pub struct Cms {
    config: Rc<CmsConfig>,
    edit_mode: EditMode,
    contents: ContentStore,
    selection: Selection,
    input: InputSource,
}

impl Default for Cms {
    fn default() -> Self {
        Self::new(CmsConfig::default())
    }
}

impl Cms {
    pub fn new(config: CmsConfig) -> Self {
        let selection = Selection::new(config.advance_combo);
        let input = InputSource::new();
        let guard = ExitGuard::new(config.exit_prompt.clone());
        let edit_mode = EditMode::new(selection.clone(), input.clone(), guard);

        Self {
            config: Rc::new(config),
            edit_mode,
            contents: ContentStore::new(),
            selection,
            input,
        }
    }

    // -------------------------------------------------------------------------
    // Contents
    // -------------------------------------------------------------------------

    /// Seed the content store. Replaces anything seeded before.
    pub fn init<I, K, V>(&self, contents: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.contents.init(contents);
    }

    pub fn init_from_json(&self, json: &str) -> Result<()> {
        self.contents.init_from_json(json)
    }

    /// Seed the content store from a JSON file (usually a previous export).
    pub fn load_contents(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| CmsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.contents.init_from_json(&json)?;
        info!(path = %path.display(), entries = self.contents.len(), "contents loaded");
        Ok(())
    }

    /// Every edited content as JSON text.
    pub fn export(&self) -> Result<String> {
        self.contents.export_snapshot()
    }

    /// Write the export into `dir` under the configured file name.
    pub fn export_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.config.export_file_name);
        let json = self.export()?;
        fs::write(&path, json).map_err(|source| CmsError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), entries = self.contents.len(), "contents exported");
        Ok(path)
    }

    // -------------------------------------------------------------------------
    // Edit mode
    // -------------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.edit_mode.get()
    }

    pub fn set_enabled(&self, value: bool) -> bool {
        self.edit_mode.set(value)
    }

    /// Feed one key event from the host.
    /// Returns true if a handler consumed it.
    pub fn handle_key(&self, input: KeyInput) -> bool {
        self.input.dispatch(input)
    }

    /// What to ask before the host quits, while edit mode is on.
    pub fn exit_confirmation(&self) -> Option<String> {
        self.edit_mode.guard().confirmation()
    }

    /// Leave edit mode and drop every listener.
    ///
    /// Regions still mounted keep their slots; unmount them first.
    pub fn teardown(&self) {
        if self.is_enabled() {
            self.edit_mode.set(false);
        }
        self.selection.destroy();
        self.edit_mode.guard().remove();
        self.edit_mode.clear_listeners();
        self.contents.clear_listeners();
        self.input.clear();
        debug!("cms torn down");
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    pub fn edit_mode(&self) -> &EditMode {
        &self.edit_mode
    }

    pub fn contents(&self) -> &ContentStore {
        &self.contents
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn input(&self) -> &InputSource {
        &self.input
    }
}
