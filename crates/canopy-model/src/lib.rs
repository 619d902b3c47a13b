//! # canopy-model — The Declarative Configuration Tree
//!
//! The author-facing side of Canopy: the nested tree of configuration
//! nodes that `canopy-compile` walks into endpoint descriptors.
//!
//! ## Modules
//!
//! - **`metadata`**: kind-restricted metadata blocks. The kind set is
//!   closed (`HandlerOnly`, `SubtreeWide`, `LeafContent`, `WholeService`)
//!   and nesting compatibility is enforced twice: statically by the
//!   typed `BlockBuilder<K>` (incompatible nesting does not compile) and
//!   at construction time for dynamically assembled blocks (fails before
//!   traversal ever begins).
//!
//! - **`node`**: the tree itself. `ConfigNode` is a closed enum of
//!   grouping nodes (path segments + children), handler leaves (the
//!   units that become endpoints), and modifier nodes (decorate a
//!   subtree with synthesized contributions).
//!
//! - **`input`**: handler input-field declarations, from which the
//!   parameter collector derives the endpoint's parameter list.
//!
//! ## Error Discipline
//!
//! Every structural defect (incompatible block nesting, attaching a block
//! kind a node does not accept) surfaces as a `ModelError` at tree
//! assembly, never mid-traversal. An invalid tree cannot reach the
//! compiler.

pub mod input;
pub mod metadata;
pub mod node;

// Re-export primary types for ergonomic imports.
pub use input::{FieldShape, InputField};
pub use metadata::{
    BlockBuilder, BlockKind, Declaration, HandlerOnlyKind, KindMarker, LeafContentKind,
    MetadataBlock, ModelError, NestsWithin, SubtreeWideKind, WholeServiceKind,
};
pub use node::{ConfigNode, GroupNode, HandlerNode, ModifierNode};
