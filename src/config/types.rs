use serde::Deserialize;

use crate::host::scripts::ContentScriptEntry;
use crate::types::{ImportMode, Placement};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub extension: ExtensionConfig,
    pub backend: BackendConfig,
    pub detector: DetectorConfig,
    pub content_scripts: Vec<ContentScriptEntry>,
}

// ---------------------------------------------------------------------------
// Extension identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Product name shown on the import button ("Import X to <name>").
    pub name: String,
    pub version: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            name: "Orchestra".to_owned(),
            version: "0.1.0".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_owned(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// The API base URL without a trailing slash, ready for `{base}{path}`.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Placement and mode used when an import is started from the page button.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub default_project: Option<String>,
    pub default_epic: Option<String>,
    pub default_story: Option<String>,
    pub import_mode: ImportMode,
}

impl DetectorConfig {
    pub fn placement(&self) -> Placement {
        Placement {
            project: self.default_project.clone(),
            epic: self.default_epic.clone(),
            story: self.default_story.clone(),
        }
    }
}
