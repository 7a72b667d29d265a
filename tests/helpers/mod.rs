//! Shared fixtures for the integration tests: a stub Slack Web API, a stub
//! workflow webhook, signed request builders and an app wired to both.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

use project_intake::bot::{build_initial_view, build_modal};
use project_intake::catalog::Catalog;
use project_intake::counter::JobCounter;
use project_intake::delivery::{SubmissionSink, WebhookSink};
use project_intake::errors::DeliveryError;
use project_intake::localization::LocalizationManager;
use project_intake::server::{router, AppState};
use project_intake::slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use project_intake::slack::{SignatureVerifier, SlackClient};
use project_intake::submission::SubmissionRecord;
use project_intake::view::block_ids as ids;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const CHANNEL_ID: &str = "C0INTAKE";
pub const USER_ID: &str = "U0TESTER";

/// Bind an ephemeral local port and serve `app` on it
async fn spawn_app(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Wait until `observed` reports at least `count` entries
async fn wait_for<F>(count: usize, observed: F) -> usize
where
    F: Fn() -> usize,
{
    for _ in 0..100 {
        if observed() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    observed()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub body: Value,
}

#[derive(Clone, Default)]
struct SlackStubState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    errors: Arc<HashMap<String, String>>,
}

/// Stub Slack Web API answering `{"ok": true}` unless told to fail a method
pub struct SlackStub {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl SlackStub {
    pub async fn start() -> anyhow::Result<Self> {
        Self::failing(&[]).await
    }

    /// Start a stub where each listed method answers with the given error code
    pub async fn failing(errors: &[(&str, &str)]) -> anyhow::Result<Self> {
        let state = SlackStubState {
            calls: Arc::default(),
            errors: Arc::new(
                errors
                    .iter()
                    .map(|(method, error)| (method.to_string(), error.to_string()))
                    .collect(),
            ),
        };
        let calls = Arc::clone(&state.calls);
        let app = Router::new()
            .route("/{method}", post(slack_method))
            .with_state(state);

        Ok(Self {
            base_url: spawn_app(app).await?,
            calls,
        })
    }

    pub fn calls(&self, method: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// Calls of `method`, waiting briefly for spawned work to catch up
    pub async fn wait_for_calls(&self, method: &str, count: usize) -> Vec<RecordedCall> {
        wait_for(count, || self.calls(method).len()).await;
        self.calls(method)
    }
}

async fn slack_method(
    State(state): State<SlackStubState>,
    Path(method): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.calls.lock().unwrap().push(RecordedCall {
        method: method.clone(),
        body,
    });

    match state.errors.get(&method) {
        Some(error) => Json(json!({ "ok": false, "error": error })),
        None => Json(json!({ "ok": true })),
    }
}

#[derive(Clone)]
struct WebhookStubState {
    received: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
}

/// Stub workflow webhook recording every JSON body it receives
pub struct WebhookStub {
    pub url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl WebhookStub {
    pub async fn start(status: StatusCode) -> anyhow::Result<Self> {
        let state = WebhookStubState {
            received: Arc::default(),
            status,
        };
        let received = Arc::clone(&state.received);
        let app = Router::new()
            .route("/hook", post(webhook))
            .with_state(state);

        Ok(Self {
            url: format!("{}/hook", spawn_app(app).await?),
            received,
        })
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    pub async fn wait_for_deliveries(&self, count: usize) -> Vec<Value> {
        wait_for(count, || self.received().len()).await;
        self.received()
    }
}

async fn webhook(State(state): State<WebhookStubState>, Json(body): Json<Value>) -> (StatusCode, &'static str) {
    state.received.lock().unwrap().push(body);
    let text = if state.status.is_success() { "ok" } else { "rejected" };
    (state.status, text)
}

/// Sink keeping delivered records in memory
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub async fn wait_for_records(&self, count: usize) -> Vec<SubmissionRecord> {
        wait_for(count, || self.records().len()).await;
        self.records()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn deliver(&self, record: &SubmissionRecord) -> Result<(), DeliveryError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// App state wired to `slack` and `sink`, with its counter in a temp dir
pub fn app_state(slack: &SlackStub, sink: Arc<dyn SubmissionSink>) -> anyhow::Result<(AppState, TempDir)> {
    let dir = TempDir::new()?;
    let slack_client = SlackClient::new(reqwest::Client::new(), "xoxb-test", slack.base_url.clone());

    let state = AppState {
        catalog: Arc::new(Catalog::default_catalog()),
        counter: Arc::new(JobCounter::new(dir.path().join("job_counter.json"))),
        slack: Arc::new(slack_client),
        sink,
        localization: Arc::new(LocalizationManager::new()?),
        verifier: Arc::new(SignatureVerifier::new(SIGNING_SECRET)),
        list_name: "Production Board".to_string(),
    };
    Ok((state, dir))
}

pub fn webhook_sink(webhook: &WebhookStub) -> Arc<dyn SubmissionSink> {
    Arc::new(WebhookSink::new(reqwest::Client::new(), webhook.url.clone()))
}

/// A running bot plus the pieces tests inspect
pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
    http: reqwest::Client,
    _counter_dir: TempDir,
}

impl TestApp {
    pub async fn start(slack: &SlackStub, sink: Arc<dyn SubmissionSink>) -> anyhow::Result<Self> {
        let (state, counter_dir) = app_state(slack, sink)?;
        let base_url = spawn_app(router(state.clone())).await?;
        Ok(Self {
            base_url,
            state,
            http: reqwest::Client::new(),
            _counter_dir: counter_dir,
        })
    }

    /// POST a form body signed with the test secret
    pub async fn post_signed(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> anyhow::Result<reqwest::Response> {
        self.post_form(path, form, Some(SIGNING_SECRET)).await
    }

    /// POST a form body, signed with `secret` when given
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
        secret: Option<&str>,
    ) -> anyhow::Result<reqwest::Response> {
        let mut request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .form(form)
            .build()?;

        if let Some(secret) = secret {
            let body = request
                .body()
                .and_then(|body| body.as_bytes())
                .unwrap_or_default()
                .to_vec();
            let timestamp = unix_now().to_string();
            let signature = SignatureVerifier::new(secret).sign(&timestamp, &body);
            let headers = request.headers_mut();
            headers.insert(TIMESTAMP_HEADER, timestamp.parse()?);
            headers.insert(SIGNATURE_HEADER, signature.parse()?);
        }

        Ok(self.http.execute(request).await?)
    }

    pub async fn slash_command(&self) -> anyhow::Result<reqwest::Response> {
        self.post_signed(
            "/slack/commands",
            &[
                ("command", "/newproject"),
                ("trigger_id", "13345224609.738474920.8088930838d88f008e0"),
                ("user_id", USER_ID),
                ("channel_id", CHANNEL_ID),
                ("text", ""),
            ],
        )
        .await
    }

    pub async fn interaction(&self, payload: &Value) -> anyhow::Result<reqwest::Response> {
        let payload = payload.to_string();
        self.post_signed("/slack/interactions", &[("payload", payload.as_str())])
            .await
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// The intake modal as Slack would echo it back in an event
pub fn open_view_payload(job_number: u64) -> anyhow::Result<Value> {
    let localization = LocalizationManager::new()?;
    let view = build_initial_view(&Catalog::default_catalog(), job_number);
    let modal = build_modal(&view, &localization, CHANNEL_ID);

    let mut payload = serde_json::to_value(modal)?;
    payload["id"] = json!("V0INTAKE");
    payload["hash"] = json!("1712345678.abcdef");
    Ok(payload)
}

pub fn selected(value: &str) -> Value {
    json!({
        "text": { "type": "plain_text", "text": value },
        "value": value,
    })
}

/// A `block_actions` payload for one select change inside `view`
pub fn select_action(view: &Value, action_id: &str, value: &str) -> Value {
    json!({
        "type": "block_actions",
        "user": { "id": USER_ID },
        "view": view,
        "actions": [{
            "action_id": action_id,
            "block_id": action_id,
            "type": "static_select",
            "selected_option": selected(value),
        }],
    })
}

/// A `view_submission` payload carrying `values` (block id → value)
pub fn submission(view: &Value, values: &[(&str, &str)], selects: &[(&str, &str)]) -> Value {
    let mut state = serde_json::Map::new();
    for (block_id, value) in values {
        state.insert(
            block_id.to_string(),
            json!({ (*block_id): { "type": "plain_text_input", "value": value } }),
        );
    }
    for (block_id, value) in selects {
        state.insert(
            block_id.to_string(),
            json!({ (*block_id): { "type": "static_select", "selected_option": selected(value) } }),
        );
    }

    let mut view = view.clone();
    view["state"] = json!({ "values": state });

    json!({
        "type": "view_submission",
        "user": { "id": USER_ID },
        "view": view,
    })
}

/// Block ids of the blocks in a modal body, in order
pub fn block_ids(view: &Value) -> Vec<String> {
    view["blocks"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| block["block_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Block id the Description select currently carries in a modal body
pub fn description_id(view: &Value) -> String {
    block_ids(view)
        .into_iter()
        .find(|id| ids::is_description(id))
        .unwrap_or_default()
}

/// Option values of the select in block `block_id`; any Description revision
/// matches `"description"`
pub fn option_values(view: &Value, block_id: &str) -> Vec<String> {
    view["blocks"]
        .as_array()
        .and_then(|blocks| {
            blocks.iter().find(|block| {
                block["block_id"]
                    .as_str()
                    .is_some_and(|id| ids::canonical(id) == block_id)
            })
        })
        .and_then(|block| block["element"]["options"].as_array())
        .map(|options| {
            options
                .iter()
                .filter_map(|option| option["value"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
