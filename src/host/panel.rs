use std::future::Future;

/// Keyboard command that toggles the side panel (bound to Cmd/Ctrl+Shift+O).
pub const TOGGLE_COMMAND: &str = "toggle-ide";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u32);

#[derive(Debug, thiserror::Error)]
#[error("opening side panel for tab {}: {reason}", .tab.0)]
pub struct PanelError {
    pub tab: TabId,
    pub reason: String,
}

/// The host's tab and side-panel API.
pub trait PanelHost {
    /// The active tab in the current window, if any.
    fn active_tab(&self) -> impl Future<Output = Option<TabId>> + Send;

    fn open_side_panel(&self, tab: TabId) -> impl Future<Output = Result<(), PanelError>> + Send;
}

/// Handle a host keyboard command. Returns whether a panel was opened.
pub async fn handle_command<H: PanelHost>(host: &H, command: &str) -> bool {
    if command != TOGGLE_COMMAND {
        return false;
    }
    let Some(tab) = host.active_tab().await else {
        tracing::debug!("host: {TOGGLE_COMMAND} with no active tab");
        return false;
    };
    open(host, tab).await
}

/// The toolbar action icon was clicked on `tab`.
pub async fn handle_action_click<H: PanelHost>(host: &H, tab: TabId) -> bool {
    open(host, tab).await
}

async fn open<H: PanelHost>(host: &H, tab: TabId) -> bool {
    match host.open_side_panel(tab).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("host: {e}");
            false
        }
    }
}
