use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use orchestra_bridge::config::types::BackendConfig;
use orchestra_bridge::router::{
    BackendRouter, ImportOutcome, ImportRequest, Message, Response, Router, RouterHandle,
};
use orchestra_bridge::types::{DetectedIssue, ImportMode, Placement, Service};

fn start(base_url: String) -> RouterHandle {
    let config = BackendConfig {
        api_base_url: base_url,
        timeout_secs: 5,
    };
    BackendRouter::new(&config)
        .expect("backend client builds")
        .spawn()
}

async fn start_with_mock() -> (MockServer, RouterHandle) {
    let server = MockServer::start().await;
    let handle = start(format!("{}/api", server.uri()));
    (server, handle)
}

fn widgets_issue() -> DetectedIssue {
    DetectedIssue {
        service: Service::Github,
        issue_id: "acme/widgets#42".to_owned(),
        source_url: "https://github.com/acme/widgets/issues/42".to_owned(),
    }
}

fn placement(project: &str, epic: &str, story: &str) -> Placement {
    Placement {
        project: Some(project.to_owned()),
        epic: Some(epic.to_owned()),
        story: Some(story.to_owned()),
    }
}

#[tokio::test]
async fn ping_never_touches_the_backend() {
    let (server, handle) = start_with_mock().await;

    let response = handle.request(Message::Ping).await;

    assert_eq!(response, Some(Response::pong()));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_projects_relays_backend_items() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"slug": "p1", "name": "Platform"}, {"slug": "p2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = handle.request(Message::ListProjects).await;

    assert_eq!(
        response,
        Some(Response::Projects {
            projects: vec![json!({"slug": "p1", "name": "Platform"}), json!({"slug": "p2"})],
        })
    );
}

#[tokio::test]
async fn list_projects_without_key_is_empty() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let response = handle.request(Message::ListProjects).await;

    assert_eq!(response, Some(Response::Projects { projects: vec![] }));
}

#[tokio::test]
async fn list_projects_with_backend_down_resolves_empty() {
    // Nothing listens on this port: every call is a network error.
    let handle = start("http://127.0.0.1:9/api".to_owned());

    let response = tokio::time::timeout(Duration::from_secs(10), handle.request(Message::ListProjects))
        .await
        .expect("router must answer even when the backend is down");

    assert_eq!(response, Some(Response::Projects { projects: vec![] }));
}

#[tokio::test]
async fn list_epics_not_found_resolves_empty() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/missing/epics"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let response = handle
        .request(Message::ListEpics {
            project: "missing".to_owned(),
        })
        .await;

    assert_eq!(response, Some(Response::Epics { epics: vec![] }));
}

#[tokio::test]
async fn list_stories_uses_both_slugs() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/p1/epics/e1/stories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"stories": [{"slug": "s1"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = handle
        .request(Message::ListStories {
            project: "p1".to_owned(),
            epic: "e1".to_owned(),
        })
        .await;

    assert_eq!(
        response,
        Some(Response::Stories {
            stories: vec![json!({"slug": "s1"})],
        })
    );
}

#[tokio::test]
async fn import_posts_issue_and_returns_task_id() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/import"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "issue": {
                "service": "github",
                "issueId": "acme/widgets#42",
                "url": "https://github.com/acme/widgets/issues/42",
            },
            "project": "p1",
            "epic": "e1",
            "story": "s1",
            "mode": "create",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskId": "T-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = ImportRequest::new(
        widgets_issue(),
        placement("p1", "e1", "s1"),
        ImportMode::Create,
    );
    let response = handle.request(Message::ImportIssue(request)).await;

    assert_eq!(
        response,
        Some(Response::Imported(ImportOutcome::imported(Some("T-9".to_owned()))))
    );
    assert_eq!(
        serde_json::to_value(response.unwrap()).unwrap(),
        json!({"success": true, "taskId": "T-9"})
    );
}

#[tokio::test]
async fn import_failure_carries_status_text() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/import"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let request = ImportRequest::new(widgets_issue(), Placement::default(), ImportMode::Link);
    let response = handle.request(Message::ImportIssue(request)).await;

    assert_eq!(
        response,
        Some(Response::Imported(ImportOutcome::failed(
            "API 500: Internal Server Error"
        )))
    );
}

#[tokio::test]
async fn router_keeps_serving_after_a_failure() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/broken/epics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [1]})))
        .mount(&server)
        .await;

    let failed = handle
        .request(Message::ListEpics {
            project: "broken".to_owned(),
        })
        .await;
    let ok = handle.request(Message::ListProjects).await;

    assert_eq!(failed, Some(Response::Epics { epics: vec![] }));
    assert_eq!(
        ok,
        Some(Response::Projects {
            projects: vec![json!(1)],
        })
    );
}

#[tokio::test]
async fn identical_requests_are_not_coalesced() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"projects": []}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (a, b) = tokio::join!(
        handle.request(Message::ListProjects),
        handle.request(Message::ListProjects)
    );

    assert!(a.is_some());
    assert!(b.is_some());
}

#[tokio::test]
async fn slow_request_does_not_block_fast_one() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/slow/epics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"epics": ["slow"]}))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/fast/epics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"epics": ["fast"]})))
        .mount(&server)
        .await;

    let slow = handle.send(Message::ListEpics {
        project: "slow".to_owned(),
    });
    let fast = handle.send(Message::ListEpics {
        project: "fast".to_owned(),
    });

    let fast = tokio::time::timeout(Duration::from_millis(500), fast)
        .await
        .expect("fast request answered while slow one is in flight")
        .unwrap();
    assert_eq!(
        fast,
        Response::Epics {
            epics: vec![json!("fast")],
        }
    );
    assert_eq!(
        slow.await.unwrap(),
        Response::Epics {
            epics: vec![json!("slow")],
        }
    );
}

#[tokio::test]
async fn unrecognised_json_message_gets_no_response() {
    let (server, handle) = start_with_mock().await;

    assert_eq!(handle.dispatch_json(json!({"type": "OPEN_TAB"})).await, None);
    assert_eq!(handle.dispatch_json(json!({"project": "p1"})).await, None);
    assert!(server.received_requests().await.unwrap().is_empty());

    // Still alive for recognised messages.
    assert_eq!(
        handle.dispatch_json(json!({"type": "PING"})).await,
        Some(Response::pong())
    );
}

#[tokio::test]
async fn malformed_known_message_gets_failure_shape() {
    let (server, handle) = start_with_mock().await;

    assert_eq!(
        handle.dispatch_json(json!({"type": "GET_EPICS"})).await,
        Some(Response::Epics { epics: vec![] })
    );
    assert_eq!(
        handle
            .dispatch_json(json!({"type": "GET_STORIES", "project": "p1"}))
            .await,
        Some(Response::Stories { stories: vec![] })
    );

    let missing_issue = handle
        .dispatch_json(json!({"type": "IMPORT_ISSUE", "project": "p1"}))
        .await;
    let Some(Response::Imported(outcome)) = missing_issue else {
        panic!("expected an import failure, got {missing_issue:?}");
    };
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().starts_with("invalid IMPORT_ISSUE message"));

    let bad_mode = handle
        .dispatch_json(json!({
            "type": "IMPORT_ISSUE",
            "issue": {
                "service": "linear",
                "issueId": "ENG-77",
                "url": "https://linear.app/acme/issue/ENG-77",
            },
            "mode": "merge",
        }))
        .await;
    assert!(matches!(
        bad_mode,
        Some(Response::Imported(ImportOutcome { success: false, error: Some(_), .. }))
    ));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn json_import_from_page_reaches_backend() {
    let (server, handle) = start_with_mock().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/import"))
        .and(body_json(json!({
            "issue": {
                "service": "linear",
                "issueId": "ENG-77",
                "url": "https://linear.app/acme/issue/ENG-77",
            },
            "mode": "create",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"taskId": "T-10"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = handle
        .dispatch_json(json!({
            "type": "IMPORT_ISSUE",
            "issue": {
                "service": "linear",
                "issueId": "ENG-77",
                "url": "https://linear.app/acme/issue/ENG-77",
            },
        }))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({"success": true, "taskId": "T-10"})
    );
}
