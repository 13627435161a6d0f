//! Cancellable mesh loading into a viewport.
//!
//! Every load runs as its own tokio task holding a child of the loader's
//! shutdown token.  Starting a new load cancels the previous one, and
//! dropping the loader cancels everything still in flight, so a load never
//! outlives the viewport it targets.

use std::sync::Arc;

use parking_lot::Mutex;
use tm_domain::collab::{MeshInfo, Viewport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum MeshLoadOutcome {
    Loaded(MeshInfo),
    Cancelled,
    Failed(String),
}

/// Handle to one in-flight load.
#[derive(Debug)]
pub struct MeshLoad {
    url: String,
    cancel: CancellationToken,
    task: JoinHandle<MeshLoadOutcome>,
}

impl MeshLoad {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the load to settle.
    pub async fn outcome(self) -> MeshLoadOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => MeshLoadOutcome::Cancelled,
            Err(e) => MeshLoadOutcome::Failed(format!("mesh load task panicked: {e}")),
        }
    }
}

pub struct MeshLoader {
    viewport: Arc<dyn Viewport>,
    shutdown: CancellationToken,
    current: Mutex<Option<CancellationToken>>,
}

impl MeshLoader {
    pub fn new(viewport: Arc<dyn Viewport>) -> Self {
        Self {
            viewport,
            shutdown: CancellationToken::new(),
            current: Mutex::new(None),
        }
    }

    /// Start loading `url`, superseding any load still running.
    pub fn load(&self, url: impl Into<String>) -> MeshLoad {
        let url = url.into();
        let cancel = self.shutdown.child_token();
        if let Some(previous) = self.current.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        let viewport = self.viewport.clone();
        let token = cancel.clone();
        let target = url.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(url = %target, "mesh load cancelled");
                    MeshLoadOutcome::Cancelled
                }
                result = viewport.load_mesh_from_url(&target) => match result {
                    Ok(info) => {
                        tracing::debug!(
                            url = %target,
                            vertices = info.vertices,
                            triangles = info.triangles,
                            "mesh loaded"
                        );
                        MeshLoadOutcome::Loaded(info)
                    }
                    Err(e) => {
                        tracing::warn!(url = %target, error = %e, "mesh load failed");
                        MeshLoadOutcome::Failed(e.to_string())
                    }
                },
            }
        });

        MeshLoad { url, cancel, task }
    }

    /// Cancel every load, current and future.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for MeshLoader {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
