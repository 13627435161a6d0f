//! `tm-workbench` — drives the editor, viewport and chat collaborators from
//! modeler capability results.
//!
//! A [`Workbench`] is built explicitly from its parts (an API client and the
//! three UI collaborators) rather than reached through globals, so each
//! piece can be swapped for a test double.

pub mod mesh_loader;
pub mod workbench;

pub use mesh_loader::{MeshLoad, MeshLoadOutcome, MeshLoader};
pub use workbench::{export_file, ExportedDownload, Generation, Workbench};
