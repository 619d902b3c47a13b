//! # canopy-compile — The Canopy Tree Compiler
//!
//! Walks a declarative configuration tree exactly once, depth-first, and
//! produces the flat, insertion-ordered list of endpoint descriptors
//! that protocol exporters consume.
//!
//! ## Guarantees
//!
//! - **Ordering:** the descriptor list order equals the pre-order
//!   depth-first order of handler leaves in the source tree.
//! - **Purity:** compilation has no side effects beyond the returned
//!   list; repeated runs over the same tree are independent and yield
//!   identical output.
//! - **Immutability:** descriptors are never mutated after construction
//!   and are `Send + Sync`, so the returned list can be shared read-only
//!   across any number of exporter threads without locking.
//!
//! ## Failure Model
//!
//! Compilation runs once, at service startup, against static input.
//! Every failure reflects a defect in the declared tree: `compile`
//! aborts on it, `try_compile` returns it as a `CompileError` so the
//! caller can exit non-zero. Nothing here is recoverable at request
//! time.
//!
//! ```
//! use canopy_compile::try_compile;
//! use canopy_model::{ConfigNode, GroupNode, HandlerNode};
//!
//! struct Health;
//!
//! let tree: ConfigNode = GroupNode::new("v1")
//!     .child(HandlerNode::new::<Health>("GetHealth"))
//!     .into();
//!
//! let endpoints = try_compile(&tree).unwrap();
//! assert_eq!(endpoints[0].route.render(), "/v1");
//! ```

pub mod descriptor;
pub mod error;
pub mod params;
pub mod path;
pub mod scope;

mod visitor;

// Re-export primary types for ergonomic imports.
pub use descriptor::EndpointDescriptor;
pub use error::CompileError;
pub use params::{collect_parameters, LocusPolicy};
pub use path::PathAccumulator;
pub use scope::ScopeArena;

use canopy_model::ConfigNode;

use crate::visitor::Traversal;

/// Options for one compiler instance.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Service name used in compilation tracing spans.
    pub service_name: String,
    /// Policy for inferring the locus of unannotated input fields.
    pub locus_policy: LocusPolicy,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            service_name: "service".to_string(),
            locus_policy: LocusPolicy::default(),
        }
    }
}

/// The tree compiler. Stateless between runs; holds only options.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    /// Compiler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler with explicit options.
    pub fn with_options(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compile `tree`, returning the error as a value.
    pub fn try_compile(
        &self,
        tree: &ConfigNode,
    ) -> Result<Vec<EndpointDescriptor>, CompileError> {
        let span = tracing::info_span!("compile", service = %self.options.service_name);
        let _guard = span.enter();

        let endpoints = Traversal::run(&self.options, tree)?;
        tracing::info!(endpoints = endpoints.len(), "tree compilation complete");
        Ok(endpoints)
    }

    /// Compile `tree`, aborting on composition errors.
    ///
    /// An invalid tree is a startup defect, not a request-time
    /// condition; callers that prefer to report the failure themselves
    /// use [`Compiler::try_compile`].
    pub fn compile(&self, tree: &ConfigNode) -> Vec<EndpointDescriptor> {
        match self.try_compile(tree) {
            Ok(endpoints) => endpoints,
            Err(err) => panic!("configuration tree is invalid: {err}"),
        }
    }
}

/// Compile with default options, aborting on composition errors.
pub fn compile(tree: &ConfigNode) -> Vec<EndpointDescriptor> {
    Compiler::new().compile(tree)
}

/// Compile with default options, returning the error as a value.
pub fn try_compile(tree: &ConfigNode) -> Result<Vec<EndpointDescriptor>, CompileError> {
    Compiler::new().try_compile(tree)
}
