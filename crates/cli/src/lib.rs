//! `tm-cli` — command-line front end for the type modeler backend.

pub mod cli;
