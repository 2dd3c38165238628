use crate::types::Record;

use super::Router;
use super::interface::{ImportOutcome, Message, Response};

/// A stub router that serves pre-loaded fixture data without any network
/// calls.
///
/// Useful for tests and demos that must not require a running backend.
/// Imports succeed with `task_id` when it is set and fail otherwise.
#[derive(Debug, Clone, Default)]
pub struct StubRouter {
    pub projects: Vec<Record>,
    pub epics: Vec<Record>,
    pub stories: Vec<Record>,
    pub task_id: Option<String>,
}

impl Router for StubRouter {
    async fn handle(&self, message: Message) -> Response {
        match message {
            Message::Ping => Response::pong(),
            Message::ListProjects => Response::Projects {
                projects: self.projects.clone(),
            },
            Message::ListEpics { .. } => Response::Epics {
                epics: self.epics.clone(),
            },
            Message::ListStories { .. } => Response::Stories {
                stories: self.stories.clone(),
            },
            Message::ImportIssue(_) => Response::Imported(match &self.task_id {
                Some(id) => ImportOutcome::imported(Some(id.clone())),
                None => ImportOutcome::failed("stub: import unavailable"),
            }),
        }
    }
}
