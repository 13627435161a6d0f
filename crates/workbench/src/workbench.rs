use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tm_domain::collab::{ChatRole, ChatTranscript, CodeEditor, Viewport};
use tm_rpc::{
    AutoFix, ChatReply, Downloader, Envelope, GeneratedMesh, ModelerApi, ParamValues,
    ParsedParameters, Validation,
};

use crate::mesh_loader::{MeshLoad, MeshLoader};

/// Result of [`Workbench::generate`]: the capability envelope plus the mesh
/// load it started, if the backend produced a mesh.
#[derive(Debug)]
pub struct Generation {
    pub envelope: Envelope<GeneratedMesh>,
    pub load: Option<MeshLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDownload {
    pub file_url: String,
    pub path: PathBuf,
    pub status: String,
}

/// One modeling session: the current script, its parameters and the chat
/// history, wired to the UI collaborators.
pub struct Workbench {
    api: Arc<dyn ModelerApi>,
    editor: Arc<dyn CodeEditor>,
    chat: Arc<dyn ChatTranscript>,
    meshes: MeshLoader,
    history: Mutex<Vec<Value>>,
    params: Mutex<ParamValues>,
}

impl Workbench {
    pub fn new(
        api: Arc<dyn ModelerApi>,
        editor: Arc<dyn CodeEditor>,
        viewport: Arc<dyn Viewport>,
        chat: Arc<dyn ChatTranscript>,
    ) -> Self {
        Self {
            api,
            editor,
            chat,
            meshes: MeshLoader::new(viewport),
            history: Mutex::new(Vec::new()),
            params: Mutex::new(ParamValues::new()),
        }
    }

    pub fn params(&self) -> ParamValues {
        self.params.lock().clone()
    }

    pub fn set_param(&self, name: impl Into<String>, value: Value) {
        self.params.lock().insert(name.into(), value);
    }

    pub fn history(&self) -> Vec<Value> {
        self.history.lock().clone()
    }

    /// Send a chat request and adopt the generated code.
    pub async fn send_chat(&self, message: &str) -> Envelope<ChatReply> {
        self.chat.append_message(ChatRole::User, message);
        self.chat.show_typing_indicator(true);

        let code = self.editor.code();
        let history = self.history();
        let reply = self.api.chat_to_code(message, &history, &code).await;

        self.chat.show_typing_indicator(false);
        match (&reply.data, &reply.error) {
            (Some(data), _) if reply.success => {
                if !data.code.is_empty() {
                    self.editor.set_code(&data.code);
                }
                *self.history.lock() = data.history.clone();
                self.chat.append_message(ChatRole::Assistant, &data.status);
            }
            (_, error) => {
                let error = error.as_deref().unwrap_or("request failed");
                self.chat
                    .append_message(ChatRole::System, &format!("Error: {error}"));
            }
        }
        reply
    }

    /// Re-read the parameter block and reset current values to its defaults.
    pub async fn refresh_parameters(&self) -> Envelope<ParsedParameters> {
        let parsed = self.api.parse_parameters(&self.editor.code()).await;
        if let Some(data) = parsed.data.as_ref().filter(|_| parsed.success) {
            *self.params.lock() = data.defaults();
        }
        parsed
    }

    /// Generate a mesh for the current script and load it into the viewport.
    pub async fn generate(&self) -> Generation {
        let envelope = self
            .api
            .generate_mesh(&self.editor.code(), &self.params())
            .await;

        let load = envelope
            .data
            .as_ref()
            .filter(|_| envelope.success)
            .and_then(|mesh| mesh.mesh_url.as_deref())
            .map(|url| self.meshes.load(url));

        Generation { envelope, load }
    }

    /// Validate the script and mirror the findings as editor markers.
    pub async fn validate(&self) -> Envelope<Validation> {
        self.editor.clear_markers();
        let validation = self.api.validate_code(&self.editor.code()).await;

        match validation.data.as_ref().filter(|_| validation.success) {
            Some(data) => {
                for warning in &data.warnings {
                    if let Some((line, message)) = warning_marker(warning) {
                        self.editor.set_warning_marker(line, &message);
                    }
                }
            }
            None => {
                let error = validation.error.as_deref().unwrap_or("validation failed");
                self.editor.set_error_marker(1, error);
            }
        }
        validation
    }

    /// Ask the backend to repair the script and adopt the result.
    pub async fn auto_fix(&self) -> Envelope<AutoFix> {
        let fix = self.api.auto_fix_code(&self.editor.code()).await;
        if let Some(data) = fix.data.as_ref().filter(|_| fix.success) {
            if !data.fixed_code.is_empty() {
                self.editor.set_code(&data.fixed_code);
                self.editor.clear_markers();
            }
        }
        fix
    }

    /// Export the model and save the file into `dest_dir`.
    pub async fn export(
        &self,
        downloader: &dyn Downloader,
        dest_dir: &Path,
    ) -> Envelope<ExportedDownload> {
        let code = self.editor.code();
        export_file(self.api.as_ref(), downloader, &code, &self.params(), dest_dir).await
    }

    /// Cancel any mesh load in flight. Also happens on drop.
    pub fn teardown(&self) {
        self.meshes.shutdown();
    }
}

/// Export `code` as STL and download the produced file into `dest_dir`.
pub async fn export_file(
    api: &dyn ModelerApi,
    downloader: &dyn Downloader,
    code: &str,
    params: &ParamValues,
    dest_dir: &Path,
) -> Envelope<ExportedDownload> {
    let (file_url, status) = match api.export_stl(code, params).await.into_result() {
        Ok(data) => match data.file_url {
            Some(url) => (url, data.status),
            None => return Envelope::failed("export produced no file"),
        },
        Err(message) => return Envelope::failed(message),
    };

    match downloader.download(&file_url, dest_dir, None).await {
        Ok(path) => Envelope::ok(ExportedDownload {
            file_url,
            path,
            status,
        }),
        Err(e) => Envelope::failed(e.to_string()),
    }
}

/// `{"line": n, "message": "..."}` → marker; entries without a line are
/// left to the caller's status display.
fn warning_marker(warning: &Value) -> Option<(u32, String)> {
    let line = warning.get("line")?.as_u64()?;
    let line = u32::try_from(line).ok()?.max(1);
    let message = warning
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| warning.to_string());
    Some((line, message))
}
