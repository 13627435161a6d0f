use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Modeler backend connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Root URL of the compute backend (no trailing slash needed).
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Path segment used when the backend does not advertise `api_prefix`
    /// in its `/config` response.
    #[serde(default = "d_api_prefix")]
    pub default_api_prefix: String,
    /// Pin the API prefix and skip discovery entirely.
    #[serde(default)]
    pub api_prefix: Option<String>,
    /// Per-request timeout for the config probe, queue join and legacy
    /// predict requests. The poll stream is bounded only by
    /// `call_timeout_ms`.
    #[serde(default = "d_10000")]
    pub request_timeout_ms: u64,
    /// Upper bound for one whole capability call, polling included.
    #[serde(default = "d_300000")]
    pub call_timeout_ms: u64,
    /// Environment variable holding a bearer token sent with every request.
    #[serde(default)]
    pub auth_token_env: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            default_api_prefix: d_api_prefix(),
            api_prefix: None,
            request_timeout_ms: 10_000,
            call_timeout_ms: 300_000,
            auth_token_env: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://localhost:7860".into()
}
fn d_api_prefix() -> String {
    "/gradio_api".into()
}
fn d_10000() -> u64 {
    10_000
}
fn d_300000() -> u64 {
    300_000
}
