//! # canopy-core — Foundational Types for the Canopy Compiler
//!
//! This crate is the bedrock of the Canopy workspace. It defines the
//! primitives every other crate builds on: endpoint identity, response
//! type tags, route templates, and the parameter model. Every other crate
//! in the workspace depends on `canopy-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `EndpointId` and
//!    `TypeTag` are newtypes, not bare strings. You cannot pass a handler
//!    name where an endpoint identity is expected.
//!
//! 2. **Closed enums, exhaustive matches.** `PathSegment`, `Locus`,
//!    `Necessity`, and `Mutability` are closed sets. Adding a variant
//!    forces every consumer to handle it.
//!
//! 3. **Deterministic identity.** Endpoint identity is derived from the
//!    declared tree, never from randomness or wall-clock time, so repeated
//!    compilations of the same tree are byte-for-byte reproducible.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `canopy-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and implement `Serialize`.

pub mod ident;
pub mod param;
pub mod route;

// Re-export primary types for ergonomic imports.
pub use ident::{EndpointId, TypeTag};
pub use param::{Locus, Mutability, Necessity, Parameter};
pub use route::{PathSegment, RouteTemplate};
