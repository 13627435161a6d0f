//! In-process mock of the modeler backend's queue protocol.
//!
//! Boots an axum server on an ephemeral port that answers `/config`,
//! `{prefix}/queue/join`, `{prefix}/queue/data`, `{prefix}/api/predict` and
//! a couple of static files, recording every request it sees along with the
//! `Authorization` header it carried.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tm_domain::config::BackendConfig;
use tokio::net::TcpListener;

pub const STL_BODY: &[u8] = b"solid model\nendsolid model\n";

#[derive(Clone)]
pub struct MockConfig {
    /// Prefix the queue routes are mounted under.
    pub prefix: String,
    /// Whether `/config` advertises `prefix` as `api_prefix`.
    pub advertise_prefix: bool,
    pub config_status: StatusCode,
    pub join_status: StatusCode,
    pub poll_status: StatusCode,
    /// Raw chunks written to the `queue/data` body, in order.
    pub chunks: Vec<String>,
    /// Keep the event stream open after the last chunk.
    pub hold_open: bool,
    pub predict_data: Value,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            prefix: "/gradio_api".into(),
            advertise_prefix: true,
            config_status: StatusCode::OK,
            join_status: StatusCode::OK,
            poll_status: StatusCode::OK,
            chunks: Vec::new(),
            hold_open: false,
            predict_data: json!([]),
        }
    }
}

impl MockConfig {
    /// Stream that completes with `data` after a status event.
    pub fn completing_with(data: Value) -> Self {
        Self {
            chunks: vec![
                sse(&json!({"msg": "estimation", "event_id": "evt-1", "rank": 0})),
                sse(&json!({
                    "msg": "process_completed",
                    "event_id": "evt-1",
                    "success": true,
                    "output": {"data": data}
                })),
            ],
            ..Self::default()
        }
    }
}

/// Render one event as an SSE `data:` block.
pub fn sse(event: &Value) -> String {
    format!("data: {event}\n\n")
}

#[derive(Default)]
pub struct Recorded {
    pub config_hits: AtomicUsize,
    pub join_bodies: Mutex<Vec<Value>>,
    pub poll_sessions: Mutex<Vec<String>>,
    pub predict_bodies: Mutex<Vec<Value>>,
    /// `(route, Authorization header)` for every request, in arrival order.
    pub auth: Mutex<Vec<(&'static str, Option<String>)>>,
}

impl Recorded {
    pub fn joins(&self) -> usize {
        self.join_bodies.lock().len()
    }

    pub fn predicts(&self) -> usize {
        self.predict_bodies.lock().len()
    }

    pub fn config_hits(&self) -> usize {
        self.config_hits.load(Ordering::SeqCst)
    }

    pub fn auth_headers(&self) -> Vec<(&'static str, Option<String>)> {
        self.auth.lock().clone()
    }

    fn saw(&self, route: &'static str, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.auth.lock().push((route, auth));
    }
}

struct Shared {
    cfg: MockConfig,
    recorded: Arc<Recorded>,
}

pub struct MockBackend {
    pub base_url: String,
    pub recorded: Arc<Recorded>,
}

impl MockBackend {
    pub async fn start(cfg: MockConfig) -> Self {
        let recorded = Arc::new(Recorded::default());
        let prefix = cfg.prefix.clone();
        let shared = Arc::new(Shared {
            cfg,
            recorded: recorded.clone(),
        });

        let app = Router::new()
            .route("/config", get(config))
            .route(&format!("{prefix}/queue/join"), post(join))
            .route(&format!("{prefix}/queue/data"), get(data))
            .route(&format!("{prefix}/api/predict"), post(predict))
            .route("/file/model.stl", get(file))
            .route("/file/stalled.stl", get(stalled_file))
            .with_state(shared);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            recorded,
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: 2_000,
            call_timeout_ms: 5_000,
            ..BackendConfig::default()
        }
    }
}

async fn config(State(s): State<Arc<Shared>>, headers: HeaderMap) -> Response {
    s.recorded.saw("config", &headers);
    s.recorded.config_hits.fetch_add(1, Ordering::SeqCst);
    if !s.cfg.config_status.is_success() {
        return s.cfg.config_status.into_response();
    }
    let body = if s.cfg.advertise_prefix {
        json!({"version": "4.44.0", "api_prefix": s.cfg.prefix})
    } else {
        json!({"version": "3.50.2"})
    };
    Json(body).into_response()
}

async fn join(
    State(s): State<Arc<Shared>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.recorded.saw("join", &headers);
    s.recorded.join_bodies.lock().push(body);
    if !s.cfg.join_status.is_success() {
        return s.cfg.join_status.into_response();
    }
    Json(json!({"event_id": "evt-1"})).into_response()
}

async fn data(
    State(s): State<Arc<Shared>>,
    Query(q): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    s.recorded.saw("data", &headers);
    s.recorded
        .poll_sessions
        .lock()
        .push(q.get("session_hash").cloned().unwrap_or_default());
    if !s.cfg.poll_status.is_success() {
        return s.cfg.poll_status.into_response();
    }

    let chunks: Vec<Result<Bytes, std::io::Error>> = s
        .cfg
        .chunks
        .iter()
        .map(|c| Ok(Bytes::from(c.clone())))
        .collect();
    let head = futures_util::stream::iter(chunks);
    let body = if s.cfg.hold_open {
        Body::from_stream(head.chain(futures_util::stream::pending()))
    } else {
        Body::from_stream(head)
    };

    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn predict(
    State(s): State<Arc<Shared>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.recorded.saw("predict", &headers);
    s.recorded.predict_bodies.lock().push(body);
    Json(json!({"data": s.cfg.predict_data, "duration": 0.1})).into_response()
}

async fn file(State(s): State<Arc<Shared>>, headers: HeaderMap) -> &'static [u8] {
    s.recorded.saw("file", &headers);
    STL_BODY
}

/// Never answers within any test's timeout.
async fn stalled_file() -> &'static [u8] {
    tokio::time::sleep(Duration::from_secs(60)).await;
    STL_BODY
}
