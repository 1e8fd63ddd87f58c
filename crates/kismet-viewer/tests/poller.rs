mod common;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kismet_core::Viewport;
use kismet_viewer::app::{App, SyncStatus};
use kismet_viewer::poller::{
    HttpSyncSource, PollOutcome, SyncError, SyncPoller, SyncSource, MIN_POLL_INTERVAL,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replays scripted responses (`None` is a transport failure), then keeps
/// answering `null`.
#[derive(Clone, Default)]
struct Scripted {
    responses: Arc<Mutex<VecDeque<Option<Option<Value>>>>>,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(responses: Vec<Option<Option<Value>>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl SyncSource for Scripted {
    async fn fetch(&self) -> Result<Option<Value>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Some(payload)) => Ok(payload),
            Some(None) => Err(SyncError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            None => Ok(None),
        }
    }
}

fn app() -> Arc<App> {
    Arc::new(App::new(Arc::new(common::FixedGenerator(None)), Viewport::default()))
}

fn poller(source: Scripted, app: &Arc<App>) -> SyncPoller<Scripted> {
    SyncPoller::new(source, app.clone(), Duration::from_secs(2), Duration::from_millis(1500))
}

#[tokio::test(start_paused = true)]
async fn identical_payloads_sync_once() {
    let app = app();
    let source = Scripted::new(vec![Some(Some(common::light_toggle())), Some(Some(common::light_toggle()))]);
    let mut poller = poller(source, &app);

    assert!(matches!(poller.poll_once().await, PollOutcome::Applied(_)));
    assert_eq!(app.status(), SyncStatus::Syncing);
    assert_eq!(app.graph().nodes.len(), 2);
    assert!(app.snapshot().scroll.is_some());

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(app.status(), SyncStatus::Idle);

    assert_eq!(poller.poll_once().await, PollOutcome::Unchanged);
    assert_eq!(app.status(), SyncStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn transport_error_sets_error_and_polling_recovers() {
    let app = app();
    let source = Scripted::new(vec![None, Some(Some(common::light_toggle()))]);
    let mut poller = poller(source, &app);

    assert_eq!(poller.poll_once().await, PollOutcome::Failed);
    assert_eq!(app.status(), SyncStatus::Error);
    assert!(app.graph().is_empty());

    assert!(matches!(poller.poll_once().await, PollOutcome::Applied(_)));
    assert_eq!(app.status(), SyncStatus::Syncing);
}

#[tokio::test(start_paused = true)]
async fn null_and_non_graph_payloads_change_nothing() {
    let app = app();
    let source = Scripted::new(vec![Some(None), Some(Some(json!({"edges": []}))), Some(Some(json!([1, 2])))]);
    let mut poller = poller(source, &app);

    for _ in 0..3 {
        assert_eq!(poller.poll_once().await, PollOutcome::Empty);
    }
    assert_eq!(app.status(), SyncStatus::Idle);
    assert!(app.graph().is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_polls_on_the_interval() {
    let app = app();
    let source = Scripted::new(vec![]);
    let handle = poller(source.clone(), &app).spawn();

    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_raised_to_the_minimum() {
    let app = app();
    let source = Scripted::new(vec![]);
    let handle = SyncPoller::new(source.clone(), app, Duration::ZERO, Duration::from_millis(1500)).spawn();

    tokio::time::sleep(MIN_POLL_INTERVAL * 4 + MIN_POLL_INTERVAL / 2).await;
    assert!(!handle.is_finished());
    assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    handle.abort();
}

#[tokio::test]
async fn http_source_maps_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/graph"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::light_toggle()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetch = |p: &str| HttpSyncSource::new(format!("{}{p}", server.uri()));
    assert_eq!(fetch("/empty").fetch().await.unwrap(), None);
    assert_eq!(fetch("/graph").fetch().await.unwrap(), Some(common::light_toggle()));
    assert!(matches!(fetch("/down").fetch().await, Err(SyncError::Status(_))));
}
