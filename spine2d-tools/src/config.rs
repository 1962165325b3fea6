//! Editor location, timing and the JSON export descriptor handed to the editor.

use crate::{Result, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// Where the Spine executable lives and how long to wait for its output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Path to the Spine executable.
    pub editor: PathBuf,
    /// Export settings file passed to the editor with `-e`.
    pub export_settings: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl EditorConfig {
    pub fn new(editor: impl Into<PathBuf>, export_settings: impl Into<PathBuf>) -> Self {
        Self {
            editor: editor.into(),
            export_settings: export_settings.into(),
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| ToolError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Spine's JSON export settings file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    pub class: String,
    pub name: String,
    pub open: bool,
    pub extension: String,
    pub format: String,
    pub pretty_print: bool,
    pub nonessential: bool,
    pub clean_up: bool,
    /// Atlas packing settings; `null` disables packing.
    pub pack_atlas: Option<Value>,
    pub pack_source: String,
    pub pack_target: String,
    pub warnings: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            class: "export-json".to_string(),
            name: "JSON".to_string(),
            open: false,
            extension: ".json".to_string(),
            format: "JSON".to_string(),
            pretty_print: true,
            nonessential: true,
            clean_up: true,
            pack_atlas: None,
            pack_source: "attachments".to_string(),
            pack_target: "perskeleton".to_string(),
            warnings: true,
            extra: Map::new(),
        }
    }
}

impl ExportSettings {
    pub fn write_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|e| ToolError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
