//! Queue-protocol client for the modeler backend.
//!
//! `RpcClient` wraps a `reqwest::Client` and turns one capability call into
//! the backend's two-phase protocol: a `queue/join` submission followed by a
//! streamed `queue/data` poll that is scanned until the job's completion
//! event arrives.  When the queue refuses the submission the call is retried
//! once through the synchronous `api/predict` endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tm_domain::capability::Capability;
use tm_domain::config::BackendConfig;
use tm_domain::error::{Error, Result};
use tm_domain::trace::TraceEvent;

use crate::session::SessionHash;
use crate::sse::queue_event_stream;
use crate::types::{ConfigResponse, JoinRequest, JoinResponse, PredictRequest, PredictResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A queue-protocol client for the modeler backend.
///
/// Cheap to clone; clones share the connection pool, the connection flag and
/// the discovered API prefix.  Every call polls under its own session hash,
/// so calls may overlap freely on one client.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    base_url: String,
    default_prefix: String,
    pinned_prefix: Option<String>,
    discovered_prefix: Arc<RwLock<Option<String>>>,
    connected: Arc<AtomicBool>,
    client_id: SessionHash,
    request_timeout: Duration,
    call_timeout: Duration,
    auth_token: Option<String>,
}

/// How the positional result of a call was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPath {
    Queue,
    Legacy,
}

impl RpcClient {
    /// Build a new client from the `[backend]` config section.
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let request_timeout = Duration::from_millis(cfg.request_timeout_ms);
        // No client-wide timeout: it would also cut the long-lived poll
        // stream.  Short requests set their own.
        let http = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let auth_token = match &cfg.auth_token_env {
            Some(var) => match std::env::var(var) {
                Ok(token) => Some(token),
                Err(_) => {
                    tracing::warn!(env_var = %var, "auth token env var not set; sending no token");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            default_prefix: cfg.default_api_prefix.clone(),
            pinned_prefix: cfg.api_prefix.clone(),
            discovered_prefix: Arc::new(RwLock::new(None)),
            connected: Arc::new(AtomicBool::new(false)),
            client_id: SessionHash::random(),
            request_timeout,
            call_timeout: Duration::from_millis(cfg.call_timeout_ms),
            auth_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Identity of this client instance, used to correlate its log lines.
    pub fn client_id(&self) -> &SessionHash {
        &self.client_id
    }

    /// Best-effort liveness signal: set by any successful round-trip,
    /// cleared only by a failed [`probe_connection`](Self::probe_connection).
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Attach the bearer token, if one is configured.
    pub(crate) fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    fn endpoint(&self, prefix: &str, path: &str) -> String {
        format!("{}{}{}", self.base_url, prefix, path)
    }

    fn mark_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    // ── connectivity ─────────────────────────────────────────────────

    /// Issue `GET {base}/config` and record whether it answered 2xx.
    ///
    /// Never fails: transport errors count as "not connected".
    pub async fn probe_connection(&self) -> bool {
        let url = format!("{}/config", self.base_url);
        let result = self
            .decorate(self.http.get(&url))
            .timeout(self.request_timeout)
            .send()
            .await;

        let (status, connected) = match result {
            Ok(resp) => (resp.status().as_u16(), resp.status().is_success()),
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "config probe failed");
                (0, false)
            }
        };
        self.mark_connected(connected);

        TraceEvent::ConnectionProbed {
            base_url: self.base_url.clone(),
            status,
            connected,
        }
        .emit();

        connected
    }

    /// Resolve the API path prefix, discovering it from `/config` once.
    ///
    /// A pinned prefix from config short-circuits discovery.  A successful
    /// discovery is cached; a failed one falls back to the default prefix
    /// for this call only and is retried on the next.
    pub async fn ensure_initialized(&self) -> String {
        if let Some(prefix) = &self.pinned_prefix {
            return prefix.clone();
        }
        if let Some(prefix) = self.discovered_prefix.read().clone() {
            return prefix;
        }

        match self.fetch_config().await {
            Ok(cfg) => {
                let discovered = cfg.api_prefix.is_some();
                let prefix = cfg
                    .api_prefix
                    .unwrap_or_else(|| self.default_prefix.clone());
                *self.discovered_prefix.write() = Some(prefix.clone());
                self.mark_connected(true);

                TraceEvent::ApiPrefixResolved {
                    prefix: prefix.clone(),
                    discovered,
                }
                .emit();
                prefix
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %self.default_prefix,
                    "api prefix discovery failed; using default"
                );
                self.default_prefix.clone()
            }
        }
    }

    async fn fetch_config(&self) -> Result<ConfigResponse> {
        let url = format!("{}/config", self.base_url);
        let resp = self
            .decorate(self.http.get(&url))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !resp.status().is_success() {
            return Err(Error::Status {
                endpoint: "GET /config".into(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(Error::from)
    }

    // ── capability invocation ────────────────────────────────────────

    /// Run one capability and return its raw positional result array.
    ///
    /// The whole call, polling included, is bounded by the configured call
    /// timeout; on expiry the poll stream is dropped and the connection
    /// released.
    pub async fn call(&self, capability: Capability, args: Vec<Value>) -> Result<Vec<Value>> {
        self.call_with_path(capability, args)
            .await
            .map(|(data, _)| data)
    }

    /// Like [`call`](Self::call), also reporting which path produced the
    /// result.
    pub async fn call_with_path(
        &self,
        capability: Capability,
        args: Vec<Value>,
    ) -> Result<(Vec<Value>, CallPath)> {
        match tokio::time::timeout(self.call_timeout, self.run_call(capability, &args)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "{capability} did not complete within {}ms",
                self.call_timeout.as_millis()
            ))),
        }
    }

    async fn run_call(
        &self,
        capability: Capability,
        args: &[Value],
    ) -> Result<(Vec<Value>, CallPath)> {
        let prefix = self.ensure_initialized().await;
        let fn_index = capability.fn_index();
        let session = SessionHash::random();

        let join_url = self.endpoint(&prefix, "/queue/join");
        let body = JoinRequest {
            data: args,
            fn_index,
            session_hash: session.as_str(),
        };

        let start = Instant::now();
        let submitted = self
            .decorate(self.http.post(&join_url))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await;

        let join = match submitted {
            Ok(resp) if resp.status().is_success() => {
                let text = resp.text().await.map_err(from_reqwest)?;
                serde_json::from_str::<JoinResponse>(&text).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, body = %text, "unreadable queue/join response");
                    JoinResponse::default()
                })
            }
            Ok(resp) => {
                let reason = format!("queue/join returned {}", resp.status().as_u16());
                return self.predict(capability, args, &prefix, reason).await;
            }
            Err(e) => {
                let reason = format!("queue/join failed: {e}");
                return self.predict(capability, args, &prefix, reason).await;
            }
        };

        TraceEvent::QueueJoined {
            capability: capability.to_string(),
            fn_index,
            session_hash: session.to_string(),
            event_id: join.event_id.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        let data = self
            .poll(capability, &prefix, &session, join.event_id.as_deref(), start)
            .await?;
        self.mark_connected(true);
        Ok((data, CallPath::Queue))
    }

    /// Stream `queue/data` for `session` until this job's completion event.
    async fn poll(
        &self,
        capability: Capability,
        prefix: &str,
        session: &SessionHash,
        event_id: Option<&str>,
        start: Instant,
    ) -> Result<Vec<Value>> {
        let data_url = self.endpoint(prefix, "/queue/data");
        let resp = self
            .decorate(self.http.get(&data_url))
            .query(&[("session_hash", session.as_str())])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(from_reqwest)?;

        if !resp.status().is_success() {
            return Err(Error::Status {
                endpoint: "GET queue/data".into(),
                status: resp.status().as_u16(),
            });
        }

        let mut events = queue_event_stream(resp);
        let mut seen = 0usize;

        while let Some(event) = events.next().await {
            let event = event?;
            seen += 1;

            if event.is_foreign(event_id) {
                tracing::debug!(
                    theirs = ?event.event_id,
                    ours = ?event_id,
                    msg = %event.msg,
                    "skipping event for another job"
                );
                continue;
            }

            tracing::trace!(msg = %event.msg, session = %session, "queue event");

            if let Some(outcome) = event.outcome() {
                // Release the connection before handing the result back.
                drop(events);

                TraceEvent::QueueCompleted {
                    capability: capability.to_string(),
                    session_hash: session.to_string(),
                    events_seen: seen,
                    duration_ms: start.elapsed().as_millis() as u64,
                }
                .emit();

                return outcome;
            }
        }

        tracing::warn!(
            capability = %capability,
            session = %session,
            events_seen = seen,
            "queue stream ended without a completion event"
        );
        Err(Error::NoResult)
    }

    /// Synchronous fallback through `{prefix}/api/predict`.
    async fn predict(
        &self,
        capability: Capability,
        args: &[Value],
        prefix: &str,
        reason: String,
    ) -> Result<(Vec<Value>, CallPath)> {
        tracing::info!(
            capability = %capability,
            reason = %reason,
            "queue unavailable, falling back to legacy predict"
        );
        TraceEvent::LegacyFallback {
            capability: capability.to_string(),
            reason,
        }
        .emit();

        let url = self.endpoint(prefix, "/api/predict");
        let body = PredictRequest {
            data: args,
            fn_index: capability.fn_index(),
        };
        let resp = self
            .decorate(self.http.post(&url))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !resp.status().is_success() {
            return Err(Error::Status {
                endpoint: "POST api/predict".into(),
                status: resp.status().as_u16(),
            });
        }

        let text = resp.text().await.map_err(from_reqwest)?;
        let parsed: PredictResponse = serde_json::from_str(&text)?;
        if let Some(error) = parsed.error {
            return Err(Error::Remote(error));
        }
        let data = parsed.data.ok_or(Error::NoResult)?;

        self.mark_connected(true);
        Ok((data, CallPath::Legacy))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base: &str) -> BackendConfig {
        BackendConfig {
            base_url: base.into(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = RpcClient::new(&cfg("http://localhost:7860/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:7860");
        assert_eq!(
            client.endpoint("/gradio_api", "/queue/join"),
            "http://localhost:7860/gradio_api/queue/join"
        );
    }

    #[test]
    fn starts_disconnected() {
        let client = RpcClient::new(&cfg("http://localhost:7860")).unwrap();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn pinned_prefix_skips_discovery() {
        let mut c = cfg("http://127.0.0.1:9");
        c.api_prefix = Some(String::new());
        let client = RpcClient::new(&c).unwrap();
        assert_eq!(client.ensure_initialized().await, "");
    }

    #[tokio::test]
    async fn unreachable_backend_probes_false_and_uses_default_prefix() {
        // Port 9 (discard) is closed on test machines.
        let mut c = cfg("http://127.0.0.1:9");
        c.request_timeout_ms = 500;
        let client = RpcClient::new(&c).unwrap();
        assert!(!client.probe_connection().await);
        assert!(!client.is_connected());
        assert_eq!(client.ensure_initialized().await, "/gradio_api");
    }
}
