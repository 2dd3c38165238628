use serde::Deserialize;
use serde_json::Value;

use crate::backend::client::segment;
use crate::backend::{ApiClient, BackendError};
use crate::config::types::BackendConfig;
use crate::types::Record;

use super::Router;
use super::interface::{ImportOutcome, ImportRequest, Message, Response};

/// The real router: one HTTP call to the task backend per message.
///
/// Stateless between messages. No retries, no caching, no coalescing of
/// identical in-flight requests.
pub struct BackendRouter {
    client: ApiClient,
}

impl BackendRouter {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Router for BackendRouter {
    async fn handle(&self, message: Message) -> Response {
        match message {
            Message::Ping => Response::pong(),

            Message::ListProjects => Response::Projects {
                projects: self.fetch_list("/projects", "projects").await,
            },

            Message::ListEpics { project } => {
                let path = format!("/projects/{}/epics", segment(&project));
                Response::Epics {
                    epics: self.fetch_list(&path, "epics").await,
                }
            }

            Message::ListStories { project, epic } => {
                let path = format!(
                    "/projects/{}/epics/{}/stories",
                    segment(&project),
                    segment(&epic)
                );
                Response::Stories {
                    stories: self.fetch_list(&path, "stories").await,
                }
            }

            Message::ImportIssue(req) => Response::Imported(self.import(&req).await),
        }
    }
}

#[derive(Deserialize)]
struct ImportBody {
    #[serde(default, rename = "taskId")]
    task_id: Option<String>,
}

impl BackendRouter {
    /// GET `path` and pull the array under `key`. Any failure, or a body
    /// without that array, yields an empty list.
    async fn fetch_list(&self, path: &str, key: &str) -> Vec<Record> {
        match self.client.get::<Value>(path).await {
            Ok(body) => take_list(body, key),
            Err(e) => {
                tracing::debug!("router: GET {path} failed: {e}");
                Vec::new()
            }
        }
    }

    async fn import(&self, req: &ImportRequest) -> ImportOutcome {
        match self
            .client
            .post::<_, ImportBody>("/tasks/import", req)
            .await
        {
            Ok(body) => {
                tracing::debug!(
                    "router: imported {} as {:?}",
                    req.issue.issue_id,
                    body.task_id
                );
                ImportOutcome::imported(body.task_id)
            }
            Err(e) => {
                tracing::warn!("router: import of {} failed: {e}", req.issue.issue_id);
                ImportOutcome::failed(e)
            }
        }
    }
}

fn take_list(mut body: Value, key: &str) -> Vec<Record> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
