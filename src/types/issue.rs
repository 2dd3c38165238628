use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Issue tracker services
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Github,
    Gitlab,
    Bitbucket,
    Jira,
    Linear,
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Jira => "jira",
            Self::Linear => "linear",
        }
    }

    /// Brand colour used for the import button on this service's pages.
    pub fn accent_color(self) -> &'static str {
        match self {
            Self::Github => "#24292e",
            Self::Gitlab => "#fc6d26",
            Self::Bitbucket | Self::Jira => "#0052CC",
            Self::Linear => "#5E6AD2",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Detected issue
// ---------------------------------------------------------------------------

/// An issue recognised from a page location.
///
/// Recomputed on every location change and never persisted. The shape of
/// `issue_id` depends only on `service`:
///
/// - github / bitbucket: `owner/repo#123`
/// - gitlab: `group/project#123` (nested groups keep their slashes)
/// - jira / linear: `PROJ-123`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIssue {
    pub service: Service,
    pub issue_id: String,
    /// The exact location string the issue was derived from.
    #[serde(rename = "url")]
    pub source_url: String,
}

impl DetectedIssue {
    /// Whether `other` names the same logical issue.
    ///
    /// Only the identifier is compared: a location change that keeps the
    /// identifier (an anchor, a query parameter) is the same issue.
    pub fn is_same_issue(&self, other: &DetectedIssue) -> bool {
        self.issue_id == other.issue_id
    }
}
