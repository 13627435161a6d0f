//! Wire DTOs for the queue protocol and the typed payloads each capability
//! unpacks its positional result into.
//!
//! Request bodies use the backend's `snake_case` field names.  Capability
//! payloads serialize as `camelCase` because they are handed to UI code as
//! JSON envelopes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use tm_domain::error::Error;

/// Parameter values sent to mesh generation, export and templates.
pub type ParamValues = BTreeMap<String, Value>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Discovery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /config — only the fields the client reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub api_prefix: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Queue submission
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST {prefix}/queue/join — request body.
#[derive(Debug, Clone, Serialize)]
pub struct JoinRequest<'a> {
    pub data: &'a [Value],
    pub fn_index: u32,
    pub session_hash: &'a str,
}

/// POST {prefix}/queue/join — response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinResponse {
    #[serde(default)]
    pub event_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Queue events
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One `data:` line of the `queue/data` event stream.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEvent {
    pub msg: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub output: Option<QueueOutput>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueOutput {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueueEvent {
    /// Whether the tag marks a finished job.  Backends spell it with an
    /// underscore on the wire; the spaced form is accepted too.
    pub fn is_completion(&self) -> bool {
        self.msg == "process_completed" || self.msg == "process completed"
    }

    /// Whether this event belongs to a different job than `event_id`.
    /// Events that carry no id cannot be attributed and are kept.
    pub fn is_foreign(&self, event_id: Option<&str>) -> bool {
        match (self.event_id.as_deref(), event_id) {
            (Some(theirs), Some(ours)) => theirs != ours,
            _ => false,
        }
    }

    /// Terminal outcome carried by this event, if any.
    ///
    /// A completion with output data yields the positional result array; a
    /// completion flagged unsuccessful, a completion carrying an output
    /// error, and the queue's own failure tags yield [`Error::Remote`].
    /// Everything else (estimation, progress, heartbeats, a completion
    /// without output) is `None` and scanning continues.
    pub fn outcome(self) -> Option<Result<Vec<Value>, Error>> {
        if self.is_completion() {
            let output = self.output.unwrap_or_default();
            if let Some(error) = output.error {
                return Some(Err(Error::Remote(error)));
            }
            if self.success == Some(false) {
                return Some(Err(Error::Remote(
                    self.message
                        .unwrap_or_else(|| "job reported failure".into()),
                )));
            }
            return output.data.map(Ok);
        }

        match self.msg.as_str() {
            "unexpected_error" | "queue_full" => Some(Err(Error::Remote(
                self.message.unwrap_or(self.msg),
            ))),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Legacy predict
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST {prefix}/api/predict — request body.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest<'a> {
    pub data: &'a [Value],
    pub fn_index: u32,
}

/// POST {prefix}/api/predict — response body.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capability payloads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// chat_to_code → `[code, status, history]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub code: String,
    pub status: String,
    /// Updated transcript exactly as the backend returned it.
    pub history: Vec<Value>,
}

/// generate_mesh → `[mesh file, status, mesh info]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMesh {
    pub mesh_url: Option<String>,
    pub status: String,
    pub mesh_info: Value,
}

/// One entry of a parsed parameter block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    /// `[default, min, max]`, numbers kept exactly as the backend sent them.
    Range(Number, Number, Number),
    Scalar(Value),
}

impl ParamSpec {
    /// The value a fresh model should start from.
    pub fn default_value(&self) -> Value {
        match self {
            ParamSpec::Range(default, _, _) => Value::Number(default.clone()),
            ParamSpec::Scalar(v) => v.clone(),
        }
    }
}

/// parse_parameters → `[params json, status]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParameters {
    pub params: BTreeMap<String, ParamSpec>,
    pub status: String,
}

impl ParsedParameters {
    pub fn defaults(&self) -> ParamValues {
        self.params
            .iter()
            .map(|(name, spec)| (name.clone(), spec.default_value()))
            .collect()
    }
}

/// validate_code → `[message, warnings json]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub message: String,
    pub warnings: Vec<Value>,
}

/// auto_fix_code → `[fixed code, status, fixes json]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFix {
    pub fixed_code: String,
    pub status: String,
    pub fixes: Vec<Value>,
}

/// export_stl → `[file, status]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_url: Option<String>,
    pub status: String,
}

/// get_component_template → `[code, description]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTemplate {
    pub code: String,
    pub description: String,
}
