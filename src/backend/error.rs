use http::StatusCode;

/// Failure talking to the task backend.
///
/// The `Display` form is what an import caller sees as its failure message,
/// so the status variant keeps the `API <code>: <reason>` shape.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("API request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API {}: {reason}", .status.as_u16())]
    Status { status: StatusCode, reason: String },

    #[error("API returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl BackendError {
    pub(crate) fn from_status(status: StatusCode) -> Self {
        Self::Status {
            status,
            reason: status.canonical_reason().unwrap_or("HTTP error").to_owned(),
        }
    }
}
