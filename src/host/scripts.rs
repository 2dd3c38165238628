use std::future::Future;

use serde::{Deserialize, Serialize};

/// When the host injects a content script into a matching page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    DocumentStart,
    DocumentEnd,
    /// Also used for unrecognised values.
    #[default]
    #[serde(other)]
    DocumentIdle,
}

/// A content script the background process registers with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentScriptEntry {
    pub id: String,
    /// Host match patterns, e.g. `https://github.com/*`.
    pub matches: Vec<String>,
    pub js: Vec<String>,
    #[serde(default)]
    pub run_at: RunAt,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("host rejected content script registration: {0}")]
    Rejected(String),
    #[error("scripting API unavailable")]
    Unavailable,
}

/// The host's dynamic content-script API.
pub trait ScriptRegistry {
    fn unregister_all(&mut self) -> impl Future<Output = Result<(), RegistrationError>> + Send;

    fn register(
        &mut self,
        scripts: &[ContentScriptEntry],
    ) -> impl Future<Output = Result<(), RegistrationError>> + Send;
}

/// Replace every registered content script with `scripts`.
///
/// Does nothing when `scripts` is empty. Failures are logged, never
/// returned: a registration problem must not stop the background process.
/// Returns the number of scripts registered.
pub async fn register_content_scripts<R: ScriptRegistry>(
    registry: &mut R,
    scripts: &[ContentScriptEntry],
) -> usize {
    if scripts.is_empty() {
        return 0;
    }
    let result = match registry.unregister_all().await {
        Ok(()) => registry.register(scripts).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            tracing::debug!("host: registered {} content scripts", scripts.len());
            scripts.len()
        }
        Err(e) => {
            tracing::error!("host: failed to register content scripts: {e}");
            0
        }
    }
}
