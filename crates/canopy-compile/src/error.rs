//! # Compiler Errors
//!
//! Everything that can go wrong while compiling a tree reflects a defect
//! in the declared tree, detected once at startup. `try_compile` surfaces
//! these as values so callers can turn them into a non-zero exit;
//! `compile` aborts on them directly.

use thiserror::Error;

use canopy_context::ContextError;
use canopy_core::Locus;
use canopy_model::ModelError;

/// Fatal compilation error. Never recoverable at request time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Structural metadata error carried over from tree assembly.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A context key conflict while applying or resolving contributions.
    #[error("context conflict while compiling `{at}`: {source}")]
    Context {
        /// Diagnostic name of the node being compiled.
        at: String,
        /// The underlying key conflict.
        source: ContextError,
    },

    /// Two input fields of one handler resolve to the same parameter.
    #[error(
        "handler `{handler}`: input fields #{first_index} and #{second_index} \
         both resolve to {locus} parameter `{name}`"
    )]
    DuplicateParameter {
        /// The offending handler's name.
        handler: String,
        /// The shared resolved parameter name.
        name: String,
        /// The shared resolved locus.
        locus: Locus,
        /// Declaration index of the first field.
        first_index: usize,
        /// Declaration index of the second field.
        second_index: usize,
    },
}

impl CompileError {
    pub(crate) fn context_at(at: impl Into<String>) -> impl FnOnce(ContextError) -> Self {
        let at = at.into();
        move |source| Self::Context { at, source }
    }
}
