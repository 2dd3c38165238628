use serde::{Deserialize, Serialize};

/// A project, epic, or story as returned by the backend.
///
/// The bridge never interprets these; they are relayed to the caller as-is.
pub type Record = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Create a new task from the issue.
    #[default]
    Create,
    /// Link the issue to an existing task.
    Link,
}

/// Where an imported issue lands in the backend's project hierarchy.
///
/// Every level is optional; the backend picks its own defaults for the
/// levels left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
}
