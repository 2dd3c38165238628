// host module: the browser-facing surfaces of the background process

pub mod panel;
pub mod scripts;

pub use panel::{PanelHost, TabId, handle_action_click, handle_command};
pub use scripts::{ContentScriptEntry, RunAt, ScriptRegistry, register_content_scripts};
