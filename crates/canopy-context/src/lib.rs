//! # canopy-context — Scoped, Mergeable Context Metadata
//!
//! Implements the context machinery of the Canopy compiler: typed context
//! keys with per-key reduction policies, insertion-ordered stores of
//! type-erased values, and the contribution records produced by metadata
//! blocks and modifier nodes.
//!
//! ## Modules
//!
//! - **`key`**: the `ContextKey` trait and the `Reduction` policy enum.
//!   Every slot in a store is identified by a key *type*, not a string.
//!
//! - **`store`**: `ContextStore`, an insertion-ordered container keyed by
//!   `TypeId`. Contribution order is load-bearing (reduction folds in
//!   store order), so the store is a vector of entries, never a hash map.
//!
//! - **`contribution`**: `Scope` (`Local` vs `Inherited`), the origin tag
//!   distinguishing block declarations from modifier-synthesized values,
//!   and the `Contribution` record that carries one erased value into a
//!   store.
//!
//! - **`keys`**: the built-in key vocabulary exporters commonly read
//!   (memory limit, timeout, API version, tags, status override).
//!
//! ## Design
//!
//! A key contributed twice without a merge policy is a composition defect,
//! surfaced as `ContextError::DuplicateExactlyOnce` and fatal at compile
//! time. There are no recoverable runtime errors here: everything happens
//! once, at service startup, against a static tree.

pub mod contribution;
pub mod key;
pub mod keys;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use contribution::{Contribution, ContributionOrigin, Scope};
pub use key::{ContextKey, Reduction};
pub use store::{ContextError, ContextStore, ResolvedContext};
