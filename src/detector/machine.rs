use tokio::sync::{mpsc, oneshot};

use crate::config::types::BridgeConfig;
use crate::router::{ImportOutcome, ImportRequest, Message, Response, RouterHandle};
use crate::types::{DetectedIssue, ImportMode, Placement};
use crate::url::detect_issue;

use super::document::{AffordanceView, Document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorState {
    /// No issue on the current page; no affordance mounted.
    Idle,
    /// The affordance is mounted for this issue.
    Showing(DetectedIssue),
}

/// Everything the page feeds into its detector.
pub enum PageEvent {
    /// The DOM changed. Client-side routers rewrite the location alongside,
    /// so this is the catch-all navigation signal.
    Mutated,
    /// A history navigation (`popstate`).
    HistoryPopped,
    /// The user clicked the import button.
    Activated,
    /// A message addressed to this page's content script.
    Message {
        message: Message,
        reply_tx: oneshot::Sender<Response>,
    },
    /// The page is being torn down.
    Unloaded,
}

/// Result of an import started from the page, for the transient
/// acknowledgment next to the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAck {
    pub issue_id: String,
    pub outcome: ImportOutcome,
}

/// Per-page detection state machine.
///
/// Owns the page's single affordance. Every observed location change funnels
/// into [`Detector::check_location`], which recomputes the detected issue and
/// applies the difference.
pub struct Detector<D: Document> {
    document: D,
    router: RouterHandle,
    product: String,
    placement: Placement,
    mode: ImportMode,
    state: DetectorState,
    affordance: Option<D::Handle>,
    last_url: String,
    ack_tx: Option<mpsc::UnboundedSender<ImportAck>>,
}

impl<D: Document> Detector<D> {
    pub fn new(document: D, router: RouterHandle, config: &BridgeConfig) -> Self {
        let last_url = document.location();
        Self {
            document,
            router,
            product: config.extension.name.clone(),
            placement: config.detector.placement(),
            mode: config.detector.import_mode,
            state: DetectorState::Idle,
            affordance: None,
            last_url,
            ack_tx: None,
        }
    }

    /// Report import outcomes on `tx`. A closed receiver is ignored.
    pub fn with_acknowledgments(mut self, tx: mpsc::UnboundedSender<ImportAck>) -> Self {
        self.ack_tx = Some(tx);
        self
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Drive the detector until the page unloads or the event source closes.
    ///
    /// Events are applied one at a time, so a re-check triggered by a
    /// mutation finishes before the next mutation is looked at.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<PageEvent>) -> D {
        tracing::debug!("detector: loaded at {}", self.last_url);
        self.check_location();

        while let Some(event) = events.recv().await {
            match event {
                PageEvent::Mutated => self.on_mutation(),
                PageEvent::HistoryPopped => self.on_history_pop(),
                PageEvent::Activated => {
                    self.activate();
                }
                PageEvent::Message { message, reply_tx } => {
                    if let Some(response) = self.handle_message(&message) {
                        let _ = reply_tx.send(response);
                    }
                }
                PageEvent::Unloaded => break,
            }
        }

        self.hide();
        self.document
    }

    /// DOM mutation: re-check only if the location moved since last time.
    pub fn on_mutation(&mut self) {
        let location = self.document.location();
        if location != self.last_url {
            self.last_url = location;
            self.check_location();
        }
    }

    /// History navigation: always re-check.
    pub fn on_history_pop(&mut self) {
        self.last_url = self.document.location();
        self.check_location();
    }

    /// Recompute the detected issue for the current location and apply it.
    ///
    /// Idempotent: a location that maps to the issue already shown leaves the
    /// affordance untouched.
    pub fn check_location(&mut self) {
        let location = self.document.location();
        let detected = detect_issue(&location);
        let unchanged = matches!(
            (&detected, &self.state),
            (Some(issue), DetectorState::Showing(current)) if current.is_same_issue(issue)
        );
        if unchanged {
            return;
        }
        match detected {
            Some(issue) => self.show(issue),
            None => self.hide(),
        }
    }

    /// Replace whatever is mounted with an affordance for `issue`.
    ///
    /// Teardown and mount happen in this one call, so at most one affordance
    /// is ever attached.
    fn show(&mut self, issue: DetectedIssue) {
        if let Some(old) = self.affordance.take() {
            self.document.unmount(old);
        }

        let view = AffordanceView::for_issue(&issue, &self.product);
        match self.document.mount(&view) {
            Ok(handle) => {
                tracing::debug!("detector: showing {} ({})", issue.issue_id, issue.service);
                self.affordance = Some(handle);
                self.state = DetectorState::Showing(issue);
            }
            Err(e) => {
                tracing::warn!("detector: could not show {}: {e}", issue.issue_id);
                self.state = DetectorState::Idle;
            }
        }
    }

    fn hide(&mut self) {
        if let Some(old) = self.affordance.take() {
            self.document.unmount(old);
        }
        if let DetectorState::Showing(issue) = &self.state {
            tracing::debug!("detector: hiding {}", issue.issue_id);
        }
        self.state = DetectorState::Idle;
    }

    /// Send the shown issue to the router for import without waiting.
    ///
    /// Returns `false` when nothing is shown. The outcome is only logged and
    /// reported on the acknowledgment channel.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime: the wait for the import
    /// reply runs on a spawned task.
    pub fn activate(&self) -> bool {
        let DetectorState::Showing(issue) = &self.state else {
            return false;
        };

        let request = ImportRequest::new(issue.clone(), self.placement.clone(), self.mode);
        let reply = self.router.send(Message::ImportIssue(request));
        let issue_id = issue.issue_id.clone();
        let ack_tx = self.ack_tx.clone();

        tokio::spawn(async move {
            let outcome = match reply.await {
                Ok(Response::Imported(outcome)) => outcome,
                Ok(_) => ImportOutcome::failed("unexpected response to import"),
                Err(_) => ImportOutcome::failed("router unavailable"),
            };
            if outcome.success {
                tracing::info!("detector: imported {issue_id} as {:?}", outcome.task_id);
            } else {
                tracing::warn!(
                    "detector: import of {issue_id} failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
            if let Some(tx) = ack_tx {
                let _ = tx.send(ImportAck { issue_id, outcome });
            }
        });
        true
    }

    /// Messages addressed to the page itself. Only `PING` is answered.
    pub fn handle_message(&self, message: &Message) -> Option<Response> {
        match message {
            Message::Ping => Some(Response::pong()),
            _ => None,
        }
    }
}
