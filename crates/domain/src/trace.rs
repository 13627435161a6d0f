use serde::Serialize;

/// Structured trace events emitted across all type modeler crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ConnectionProbed {
        base_url: String,
        status: u16,
        connected: bool,
    },
    ApiPrefixResolved {
        prefix: String,
        discovered: bool,
    },
    QueueJoined {
        capability: String,
        fn_index: u32,
        session_hash: String,
        event_id: Option<String>,
        duration_ms: u64,
    },
    QueueCompleted {
        capability: String,
        session_hash: String,
        events_seen: usize,
        duration_ms: u64,
    },
    LegacyFallback {
        capability: String,
        reason: String,
    },
    FileDownloaded {
        url: String,
        path: String,
        bytes: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "tm_event");
    }
}
