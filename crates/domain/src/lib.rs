//! `tm-domain` — shared types for the type modeler workspace.
//!
//! Holds the error type every crate returns, the structured trace events,
//! the TOML configuration model, the closed set of remote capabilities and
//! the collaborator traits (editor, viewport, chat transcript) that the
//! workbench drives.

pub mod capability;
pub mod collab;
pub mod config;
pub mod error;
pub mod stream;
pub mod trace;
