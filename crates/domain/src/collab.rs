//! Interfaces of the UI collaborators the workbench drives.
//!
//! Rendering, text editing and the chat transcript live outside this
//! workspace; they are reached only through these traits so the workbench
//! can run against real widgets or test doubles alike.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Summary of the mesh currently shown in a viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshInfo {
    pub vertices: usize,
    pub triangles: usize,
    /// Axis-aligned extents (x, y, z), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extents: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// The code editor holding the parametric script.
pub trait CodeEditor: Send + Sync {
    fn code(&self) -> String;
    fn set_code(&self, code: &str);
    /// Lines are 1-based.
    fn set_error_marker(&self, line: u32, message: &str);
    fn set_warning_marker(&self, line: u32, message: &str);
    fn clear_markers(&self);
}

/// The 3D viewport.
#[async_trait]
pub trait Viewport: Send + Sync {
    /// Fetch and display the mesh behind `url`, replacing the current one.
    async fn load_mesh_from_url(&self, url: &str) -> Result<MeshInfo>;
    fn reset_view(&self);
    fn toggle_wireframe(&self);
    fn toggle_grid(&self);
    fn set_position(&self, position: [f32; 3]);
    fn set_rotation(&self, rotation: [f32; 3]);
    fn mesh_info(&self) -> Option<MeshInfo>;
}

/// The chat transcript panel.
pub trait ChatTranscript: Send + Sync {
    fn append_message(&self, role: ChatRole, text: &str);
    fn show_typing_indicator(&self, visible: bool);
}
