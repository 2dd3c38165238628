//! Typed client for the side panel.
//!
//! Wraps a [`RouterHandle`] with one method per operation and keeps the
//! panel's liveness port open for as long as the client lives. Every method
//! resolves to the operation's success value or its empty/failure value;
//! none of them can fail at the protocol level.

use crate::router::{
    ImportOutcome, ImportRequest, Message, Port, Response, RouterHandle, SIDEPANEL_PORT,
};
use crate::types::Record;

pub struct PanelClient {
    router: RouterHandle,
    port: Port,
}

impl PanelClient {
    /// Open the panel's liveness port and return a client bound to it.
    pub fn connect(router: RouterHandle) -> Self {
        let port = router.connect(SIDEPANEL_PORT);
        Self { router, port }
    }

    pub fn port(&self) -> &Port {
        &self.port
    }

    /// Whether the router answers at all.
    pub async fn ping(&self) -> bool {
        matches!(
            self.router.request(Message::Ping).await,
            Some(Response::Pong { ok: true })
        )
    }

    pub async fn list_projects(&self) -> Vec<Record> {
        match self.router.request(Message::ListProjects).await {
            Some(Response::Projects { projects }) => projects,
            _ => Vec::new(),
        }
    }

    pub async fn list_epics(&self, project: &str) -> Vec<Record> {
        let message = Message::ListEpics {
            project: project.to_owned(),
        };
        match self.router.request(message).await {
            Some(Response::Epics { epics }) => epics,
            _ => Vec::new(),
        }
    }

    pub async fn list_stories(&self, project: &str, epic: &str) -> Vec<Record> {
        let message = Message::ListStories {
            project: project.to_owned(),
            epic: epic.to_owned(),
        };
        match self.router.request(message).await {
            Some(Response::Stories { stories }) => stories,
            _ => Vec::new(),
        }
    }

    pub async fn import_issue(&self, request: ImportRequest) -> ImportOutcome {
        match self.router.request(Message::ImportIssue(request)).await {
            Some(Response::Imported(outcome)) => outcome,
            Some(_) => ImportOutcome::failed("unexpected response to import"),
            None => ImportOutcome::failed("router unavailable"),
        }
    }

    /// Close the panel. The router observes the port closing.
    pub fn close(self) {
        self.port.disconnect();
    }
}
