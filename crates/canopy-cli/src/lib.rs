//! # canopy-cli — Inspection CLI for the Canopy Compiler
//!
//! Compiles the bundled demo service tree and renders the resulting
//! descriptor list, giving exporter authors a quick look at what the
//! compiler hands them. A compilation failure exits non-zero, which is
//! exactly how a service binary should treat an invalid tree at startup.

pub mod demo;
pub mod describe;
pub mod routes;
