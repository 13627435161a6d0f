//! `tm-rpc` — client for the type modeler compute backend.
//!
//! Provides [`RpcClient`], which executes named remote capabilities over
//! the backend's queue protocol (`queue/join` + streamed `queue/data`) with
//! a fallback to the synchronous `api/predict` endpoint, the
//! [`ModelerApi`] trait exposing one typed call per capability, and the
//! [`Envelope`] every call resolves to.
//!
//! | Capability               | Slot | Result                                   |
//! |--------------------------|------|------------------------------------------|
//! | `chat_to_code`           | 0    | [`ChatReply`]                            |
//! | `parse_parameters`       | 2    | [`ParsedParameters`]                     |
//! | `generate_mesh`          | 3    | [`GeneratedMesh`] (absolute mesh URL)    |
//! | `export_stl`             | 4    | [`ExportedFile`] (absolute file URL)     |
//! | `get_component_template` | 5    | [`ComponentTemplate`]                    |
//! | `validate_code`          | 6    | [`Validation`]                           |
//! | `auto_fix_code`          | 7    | [`AutoFix`]                              |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use tm_domain::config::BackendConfig;
//! use tm_rpc::{ModelerApi, ParamValues, RpcClient};
//!
//! # async fn example() -> tm_domain::error::Result<()> {
//! let client = RpcClient::new(&BackendConfig::default())?;
//!
//! let mut params = ParamValues::new();
//! params.insert("size".into(), 10.into());
//! let mesh = client.generate_mesh("box(size, size, size)", &params).await;
//!
//! match mesh.into_result() {
//!     Ok(mesh) => println!("mesh at {:?}", mesh.mesh_url),
//!     Err(message) => eprintln!("generation failed: {message}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod download;
pub mod envelope;
pub mod file_ref;
pub mod session;
pub mod types;

mod sse;
mod unpack;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use api::ModelerApi;
pub use client::{from_reqwest, CallPath, RpcClient};
pub use download::Downloader;
pub use envelope::Envelope;
pub use file_ref::{absolutize, normalize_file_ref};
pub use session::SessionHash;
pub use types::{
    AutoFix, ChatReply, ComponentTemplate, ExportedFile, GeneratedMesh, ParamSpec, ParamValues,
    ParsedParameters, Validation,
};
