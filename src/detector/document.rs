use crate::types::DetectedIssue;

/// Id of the floating container holding the import button.
pub const CONTAINER_ID: &str = "orchestra-import-helper";
/// Id of the import button inside the container.
pub const BUTTON_ID: &str = "orchestra-import-btn";

#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("document has no body to attach to")]
    NoBody,
    #[error("attaching affordance: {0}")]
    Rejected(String),
}

/// The page a detector runs in, reduced to what the detector needs.
///
/// Implemented by the host binding for real pages and by recording fakes in
/// tests.
pub trait Document {
    /// Handle to a mounted affordance; given back to `unmount`.
    type Handle;

    /// Current location (`window.location.href`).
    fn location(&self) -> String;

    fn mount(&mut self, view: &AffordanceView) -> Result<Self::Handle, AttachError>;

    fn unmount(&mut self, handle: Self::Handle);
}

/// Everything needed to render the import button for one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffordanceView {
    pub container_id: &'static str,
    pub button_id: &'static str,
    pub label: String,
    pub accent: &'static str,
    pub issue_id: String,
}

impl AffordanceView {
    pub fn for_issue(issue: &DetectedIssue, product: &str) -> Self {
        Self {
            container_id: CONTAINER_ID,
            button_id: BUTTON_ID,
            label: format!("Import {} to {product}", issue.issue_id),
            accent: issue.service.accent_color(),
            issue_id: issue.issue_id.clone(),
        }
    }

    /// Inline style for the fixed-position container.
    pub fn container_style(&self) -> String {
        [
            "position:fixed",
            "bottom:20px",
            "right:20px",
            "z-index:2147483647",
            "font-family:-apple-system,BlinkMacSystemFont,Segoe UI,Roboto,sans-serif",
            "font-size:13px",
        ]
        .join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Service;

    #[test]
    fn view_for_linear_issue() {
        let issue = DetectedIssue {
            service: Service::Linear,
            issue_id: "ENG-77".to_owned(),
            source_url: "https://linear.app/acme/issue/ENG-77".to_owned(),
        };
        let view = AffordanceView::for_issue(&issue, "Orchestra");
        assert_eq!(view.label, "Import ENG-77 to Orchestra");
        assert_eq!(view.accent, "#5E6AD2");
        assert_eq!(view.container_id, "orchestra-import-helper");
        assert!(view.container_style().starts_with("position:fixed;"));
    }
}
