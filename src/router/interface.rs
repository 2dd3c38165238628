use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::types::{DetectedIssue, ImportMode, Placement, Record};

/// Name of the liveness port the side panel opens for as long as it is shown.
pub const SIDEPANEL_PORT: &str = "sidepanel";

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Every operation a client (page detector or side panel) can ask the router
/// for. The tag alone determines the shape of the [`Response`].
///
/// The JSON wire form is tagged by `type`:
/// `{"type":"GET_EPICS","project":"p1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Ping,
    #[serde(rename = "GET_PROJECTS")]
    ListProjects,
    #[serde(rename = "GET_EPICS")]
    ListEpics { project: String },
    #[serde(rename = "GET_STORIES")]
    ListStories { project: String, epic: String },
    ImportIssue(ImportRequest),
}

impl Message {
    /// Wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::ListProjects => "GET_PROJECTS",
            Self::ListEpics { .. } => "GET_EPICS",
            Self::ListStories { .. } => "GET_STORIES",
            Self::ImportIssue(_) => "IMPORT_ISSUE",
        }
    }

    /// The response a caller receives when this operation cannot be served.
    pub fn failure_response(&self, error: impl fmt::Display) -> Response {
        match self {
            Self::Ping => Response::pong(),
            Self::ListProjects => Response::Projects {
                projects: Vec::new(),
            },
            Self::ListEpics { .. } => Response::Epics { epics: Vec::new() },
            Self::ListStories { .. } => Response::Stories {
                stories: Vec::new(),
            },
            Self::ImportIssue(_) => Response::Imported(ImportOutcome::failed(error)),
        }
    }

    /// Failure shape for a raw wire tag, for a message whose body did not
    /// parse. `None` when the tag is not one of ours.
    pub fn failure_for_tag(tag: &str, error: impl fmt::Display) -> Option<Response> {
        let response = match tag {
            "PING" => Response::pong(),
            "GET_PROJECTS" => Response::Projects {
                projects: Vec::new(),
            },
            "GET_EPICS" => Response::Epics { epics: Vec::new() },
            "GET_STORIES" => Response::Stories {
                stories: Vec::new(),
            },
            "IMPORT_ISSUE" => Response::Imported(ImportOutcome::failed(error)),
            _ => return None,
        };
        Some(response)
    }
}

/// Payload of an import: the issue plus where it should land.
///
/// Placement fields left as `None` are omitted from the backend request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub issue: DetectedIssue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(default)]
    pub mode: ImportMode,
}

impl ImportRequest {
    pub fn new(issue: DetectedIssue, placement: Placement, mode: ImportMode) -> Self {
        Self {
            issue,
            project: placement.project,
            epic: placement.epic,
            story: placement.story,
            mode,
        }
    }
}

/// Reply to a [`Message`]. Serialises untagged to the plain JSON shapes
/// (`{"ok":true}`, `{"projects":[...]}`, `{"success":true,"taskId":"T-9"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Pong { ok: bool },
    Projects { projects: Vec<Record> },
    Epics { epics: Vec<Record> },
    Stories { stories: Vec<Record> },
    Imported(ImportOutcome),
}

impl Response {
    pub fn pong() -> Self {
        Self::Pong { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportOutcome {
    pub fn imported(task_id: Option<String>) -> Self {
        Self {
            success: true,
            task_id,
            error: None,
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            task_id: None,
            error: Some(error.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// What travels over the router's inbound channel.
pub enum Request {
    /// A protocol message with its single-use reply slot.
    Dispatch {
        message: Message,
        reply_tx: oneshot::Sender<Response>,
    },
    /// A liveness port was opened. The port is closed when the sender side
    /// of `closed_rx` is dropped.
    Connect {
        name: String,
        closed_rx: oneshot::Receiver<()>,
    },
    Shutdown,
}

/// Handle to a running router held by detectors and panel clients.
///
/// Cheaply cloneable. When the last handle is dropped the channel closes and
/// the router shuts down once in-flight requests have replied.
#[derive(Clone)]
pub struct RouterHandle {
    tx: mpsc::UnboundedSender<Request>,
    open_panels: Arc<AtomicUsize>,
}

impl RouterHandle {
    pub(super) fn new(tx: mpsc::UnboundedSender<Request>, open_panels: Arc<AtomicUsize>) -> Self {
        Self { tx, open_panels }
    }

    /// Send a message without waiting. The returned receiver resolves with
    /// exactly one response, or errors if the router is gone.
    pub fn send(&self, message: Message) -> oneshot::Receiver<Response> {
        let (reply_tx, reply_rx) = oneshot::channel();
        // Ignore errors: if the receiver is gone the router has already shut
        // down and dropping `reply_tx` tells the caller so.
        let _ = self.tx.send(Request::Dispatch { message, reply_tx });
        reply_rx
    }

    /// Send a message and wait for its response.
    ///
    /// `None` means no response will ever arrive: the router is gone, or it
    /// dropped the message.
    pub async fn request(&self, message: Message) -> Option<Response> {
        self.send(message).await.ok()
    }

    /// Route a raw JSON message as received from an extension context.
    ///
    /// A message whose `type` is not recognised is dropped without a
    /// response. A recognised tag whose fields do not fit gets that tag's
    /// failure shape.
    pub async fn dispatch_json(&self, raw: serde_json::Value) -> Option<Response> {
        let tag = raw
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        match serde_json::from_value::<Message>(raw) {
            Ok(message) => self.request(message).await,
            Err(e) => match tag.as_deref() {
                Some(tag) => {
                    let response =
                        Message::failure_for_tag(tag, format!("invalid {tag} message: {e}"));
                    match &response {
                        Some(_) => tracing::warn!("router: malformed {tag} message: {e}"),
                        None => tracing::debug!("router: ignoring unrecognised {tag} message"),
                    }
                    response
                }
                None => {
                    tracing::debug!("router: ignoring untyped message: {e}");
                    None
                }
            },
        }
    }

    /// Open a liveness port. The router sees it close when the [`Port`] is
    /// dropped or disconnected.
    pub fn connect(&self, name: &str) -> Port {
        let (closed_tx, closed_rx) = oneshot::channel();
        let _ = self.tx.send(Request::Connect {
            name: name.to_owned(),
            closed_rx,
        });
        Port {
            name: name.to_owned(),
            _closed_tx: closed_tx,
        }
    }

    /// Number of side-panel ports the router currently sees as open.
    pub fn open_panels(&self) -> usize {
        self.open_panels.load(Ordering::SeqCst)
    }

    /// Ask the router to stop accepting requests.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Request::Shutdown);
    }
}

/// Client side of a liveness connection.
pub struct Port {
    name: String,
    _closed_tx: oneshot::Sender<()>,
}

impl Port {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn disconnect(self) {}
}
