//! Configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock behavior: Ctrl+Shift advances the selection, Ctrl
//! highlights regions, contents export to `contents.json`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CmsError, Result};
use crate::state::keyboard::{KEY_CTRL, KEY_SHIFT};

pub const DEFAULT_EXIT_PROMPT: &str = "Are you sure to leave?";
pub const DEFAULT_EMPTY_PLACEHOLDER: &str = "\u{2b1c}";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "contents.json";

// ============================================
// ADVANCE COMBO
// ============================================

/// Key pair that advances the selection: `trigger` pressed while `hold` is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceCombo {
    #[serde(default = "default_hold")]
    pub hold: u32,
    #[serde(default = "default_trigger")]
    pub trigger: u32,
}

fn default_hold() -> u32 {
    KEY_CTRL
}
fn default_trigger() -> u32 {
    KEY_SHIFT
}

impl Default for AdvanceCombo {
    fn default() -> Self {
        AdvanceCombo {
            hold: KEY_CTRL,
            trigger: KEY_SHIFT,
        }
    }
}

// ============================================
// CMS CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsConfig {
    #[serde(default)]
    pub advance_combo: AdvanceCombo,
    /// Key that highlights every editable region while held.
    #[serde(default = "default_highlight_key")]
    pub highlight_key: u32,
    /// Question a host should ask before quitting while edit mode is on.
    #[serde(default = "default_exit_prompt")]
    pub exit_prompt: String,
    /// Shown in place of empty content while edit mode is on.
    #[serde(default = "default_empty_placeholder")]
    pub empty_placeholder: String,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
}

fn default_highlight_key() -> u32 {
    KEY_CTRL
}
fn default_exit_prompt() -> String {
    DEFAULT_EXIT_PROMPT.to_string()
}
fn default_empty_placeholder() -> String {
    DEFAULT_EMPTY_PLACEHOLDER.to_string()
}
fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

impl Default for CmsConfig {
    fn default() -> Self {
        CmsConfig {
            advance_combo: AdvanceCombo::default(),
            highlight_key: KEY_CTRL,
            exit_prompt: default_exit_prompt(),
            empty_placeholder: default_empty_placeholder(),
            export_file_name: default_export_file_name(),
        }
    }
}

impl CmsConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| CmsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = CmsConfig::from_json("{}").unwrap();
        assert_eq!(config, CmsConfig::default());
        assert_eq!(config.advance_combo.hold, 17);
        assert_eq!(config.advance_combo.trigger, 16);
        assert_eq!(config.empty_placeholder, "⬜");
        assert_eq!(config.export_file_name, "contents.json");
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{"advanceCombo": {"trigger": 9}, "exitPrompt": "Leave?"}"#;
        let config = CmsConfig::from_json(json).unwrap();
        assert_eq!(config.advance_combo.hold, KEY_CTRL);
        assert_eq!(config.advance_combo.trigger, 9);
        assert_eq!(config.exit_prompt, "Leave?");
        assert_eq!(config.highlight_key, KEY_CTRL);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = CmsConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, CmsError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"highlightKey": 18}}"#).unwrap();

        let config = CmsConfig::load(file.path()).unwrap();
        assert_eq!(config.highlight_key, 18);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CmsConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CmsError::Read { .. }));
    }
}
