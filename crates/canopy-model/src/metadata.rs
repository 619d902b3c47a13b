//! # Metadata Blocks
//!
//! A metadata block is a nestable container of context declarations,
//! tagged with a target kind from a closed set. A block may only nest
//! blocks whose kind is compatible with its own; declaring whole-service
//! metadata inside one handler's private block is meaningless and must
//! not survive tree assembly.
//!
//! ## Compatibility Matrix
//!
//! | outer          | may nest                     |
//! |----------------|------------------------------|
//! | `HandlerOnly`  | `HandlerOnly`, `SubtreeWide` |
//! | `SubtreeWide`  | `SubtreeWide`                |
//! | `LeafContent`  | `LeafContent`                |
//! | `WholeService` | `WholeService`, `SubtreeWide`|
//!
//! ## Enforcement
//!
//! Two layers, both complete before traversal begins:
//!
//! 1. The typed `BlockBuilder<K>` encodes the matrix in the sealed
//!    `NestsWithin` marker trait. Nesting a `WholeServiceKind` builder
//!    inside a `HandlerOnlyKind` builder is a compile error; there is no
//!    `NestsWithin<HandlerOnlyKind>` impl for it.
//!
//! 2. `MetadataBlock::nest` and `MetadataBlock::declare` re-check the
//!    same matrix for blocks assembled dynamically and fail with the
//!    incompatible pair named.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use canopy_context::{ContextKey, Contribution, ContributionOrigin, Scope};

/// Structural composition error raised at tree assembly.
///
/// These reflect defects in the declared tree. They are fatal at startup
/// and never recoverable at request time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A block was nested inside a block whose kind does not accept it.
    #[error("metadata block of kind `{inner}` cannot be nested inside a block of kind `{outer}`")]
    IncompatibleNesting {
        /// Kind of the enclosing block.
        outer: BlockKind,
        /// Kind of the rejected inner block.
        inner: BlockKind,
    },

    /// A block was attached to a node that does not accept its kind.
    #[error("a {node} node does not accept metadata blocks of kind `{block}`")]
    UnsupportedAttachment {
        /// The node flavor, `"group"` or `"handler"`.
        node: &'static str,
        /// Kind of the rejected block.
        block: BlockKind,
    },
}

// ─── Block Kinds ─────────────────────────────────────────────────────

/// Target kind of a metadata block. Closed set; matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Metadata private to a single handler.
    HandlerOnly,
    /// Metadata applying to a whole subtree; nests almost everywhere.
    SubtreeWide,
    /// Metadata describing a handler's response content.
    LeafContent,
    /// Metadata describing the service as a whole.
    WholeService,
}

impl BlockKind {
    /// Canonical name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandlerOnly => "handler_only",
            Self::SubtreeWide => "subtree_wide",
            Self::LeafContent => "leaf_content",
            Self::WholeService => "whole_service",
        }
    }

    /// Whether a block of this kind may nest a block of kind `inner`.
    pub fn accepts(self, inner: BlockKind) -> bool {
        match self {
            Self::HandlerOnly => matches!(inner, Self::HandlerOnly | Self::SubtreeWide),
            Self::SubtreeWide => matches!(inner, Self::SubtreeWide),
            Self::LeafContent => matches!(inner, Self::LeafContent),
            Self::WholeService => matches!(inner, Self::WholeService | Self::SubtreeWide),
        }
    }

    /// Whether a handler leaf accepts a block of this kind.
    pub fn attaches_to_handler(self) -> bool {
        match self {
            Self::HandlerOnly | Self::SubtreeWide | Self::LeafContent => true,
            Self::WholeService => false,
        }
    }

    /// Whether a grouping node accepts a block of this kind.
    pub fn attaches_to_group(self) -> bool {
        match self {
            Self::SubtreeWide | Self::WholeService => true,
            Self::HandlerOnly | Self::LeafContent => false,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Declarations ────────────────────────────────────────────────────

/// One declaration inside a metadata block.
///
/// Collection flattens declarations depth-first: arrays flatten in
/// order, a conditional contributes exactly one branch, an absent
/// optional contributes nothing.
#[derive(Debug, Clone)]
pub enum Declaration {
    /// A single context contribution.
    Contribute(Contribution),
    /// A nested block, already kind-checked against its parent.
    Block(MetadataBlock),
    /// An ordered array of declarations.
    Many(Vec<Declaration>),
    /// A two-branch conditional; exactly one branch contributes.
    Either {
        /// Which branch contributes.
        condition: bool,
        /// Declarations used when `condition` holds.
        when_true: Vec<Declaration>,
        /// Declarations used otherwise.
        when_false: Vec<Declaration>,
    },
    /// An optional declaration; `None` contributes nothing.
    Maybe(Option<Box<Declaration>>),
}

impl Declaration {
    /// Check every block reachable through declaration containers against
    /// `outer`'s kind. A nested block's own declarations were checked
    /// when that block was assembled, so only its kind is inspected here.
    fn check_nesting(&self, outer: BlockKind) -> Result<(), ModelError> {
        match self {
            Self::Contribute(_) => Ok(()),
            Self::Block(block) => {
                if !outer.accepts(block.kind) {
                    return Err(ModelError::IncompatibleNesting {
                        outer,
                        inner: block.kind,
                    });
                }
                Ok(())
            }
            Self::Many(decls) => decls.iter().try_for_each(|d| d.check_nesting(outer)),
            Self::Either {
                when_true,
                when_false,
                ..
            } => {
                // Both branches must be valid regardless of the condition.
                when_true.iter().try_for_each(|d| d.check_nesting(outer))?;
                when_false.iter().try_for_each(|d| d.check_nesting(outer))
            }
            Self::Maybe(inner) => match inner {
                Some(decl) => decl.check_nesting(outer),
                None => Ok(()),
            },
        }
    }

    fn flatten_into(&self, out: &mut Vec<Contribution>) {
        match self {
            Self::Contribute(c) => out.push(c.clone()),
            Self::Block(block) => block.flatten_into(out),
            Self::Many(decls) => {
                for decl in decls {
                    decl.flatten_into(out);
                }
            }
            Self::Either {
                condition,
                when_true,
                when_false,
            } => {
                let branch = if *condition { when_true } else { when_false };
                for decl in branch {
                    decl.flatten_into(out);
                }
            }
            Self::Maybe(inner) => {
                if let Some(decl) = inner {
                    decl.flatten_into(out);
                }
            }
        }
    }
}

// ─── Metadata Block ──────────────────────────────────────────────────

/// A kind-tagged, nestable container of context declarations.
///
/// This is the dynamically checked representation; the typed
/// `BlockBuilder` is the preferred authoring surface and lowers into it.
#[derive(Debug, Clone)]
pub struct MetadataBlock {
    kind: BlockKind,
    decls: Vec<Declaration>,
}

impl MetadataBlock {
    /// Empty block of the given kind.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            decls: Vec::new(),
        }
    }

    /// The block's target kind.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Append a contribution of `value` under key `K` with the given
    /// scope. Declaration order is preserved through collection.
    pub fn contribute<K: ContextKey>(mut self, value: K::Value, scope: Scope) -> Self {
        self.decls.push(Declaration::Contribute(Contribution::new::<K>(
            value,
            scope,
            ContributionOrigin::Declaration,
        )));
        self
    }

    /// Nest `inner`, failing if this block's kind does not accept it.
    pub fn nest(mut self, inner: MetadataBlock) -> Result<Self, ModelError> {
        if !self.kind.accepts(inner.kind) {
            return Err(ModelError::IncompatibleNesting {
                outer: self.kind,
                inner: inner.kind,
            });
        }
        self.decls.push(Declaration::Block(inner));
        Ok(self)
    }

    /// Append a raw declaration, failing if any block nested inside it
    /// (through arrays, conditionals, or optionals) has a kind this block
    /// does not accept.
    pub fn declare(mut self, decl: Declaration) -> Result<Self, ModelError> {
        decl.check_nesting(self.kind)?;
        self.decls.push(decl);
        Ok(self)
    }

    /// Flatten this block into its ordered contribution list.
    pub fn collect(&self) -> Vec<Contribution> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Contribution>) {
        for decl in &self.decls {
            decl.flatten_into(out);
        }
    }
}

// ─── Kind Markers (static layer) ─────────────────────────────────────

mod private {
    pub trait Sealed {}
    impl Sealed for super::HandlerOnlyKind {}
    impl Sealed for super::SubtreeWideKind {}
    impl Sealed for super::LeafContentKind {}
    impl Sealed for super::WholeServiceKind {}
}

/// Marker trait binding a zero-sized kind type to its `BlockKind` value.
///
/// Sealed — only the four kinds defined in this module implement it.
pub trait KindMarker: private::Sealed {
    /// The runtime kind this marker stands for.
    const KIND: BlockKind;
}

/// Marker for `BlockKind::HandlerOnly`.
#[derive(Debug, Clone, Copy)]
pub struct HandlerOnlyKind;

/// Marker for `BlockKind::SubtreeWide`.
#[derive(Debug, Clone, Copy)]
pub struct SubtreeWideKind;

/// Marker for `BlockKind::LeafContent`.
#[derive(Debug, Clone, Copy)]
pub struct LeafContentKind;

/// Marker for `BlockKind::WholeService`.
#[derive(Debug, Clone, Copy)]
pub struct WholeServiceKind;

impl KindMarker for HandlerOnlyKind {
    const KIND: BlockKind = BlockKind::HandlerOnly;
}
impl KindMarker for SubtreeWideKind {
    const KIND: BlockKind = BlockKind::SubtreeWide;
}
impl KindMarker for LeafContentKind {
    const KIND: BlockKind = BlockKind::LeafContent;
}
impl KindMarker for WholeServiceKind {
    const KIND: BlockKind = BlockKind::WholeService;
}

/// Static form of the nesting compatibility matrix.
///
/// `Inner: NestsWithin<Outer>` holds exactly when
/// `Outer::KIND.accepts(Inner::KIND)` does. The trait and every marker
/// type live in this module, so downstream crates cannot widen the
/// matrix.
pub trait NestsWithin<Outer: KindMarker>: KindMarker {}

impl NestsWithin<HandlerOnlyKind> for HandlerOnlyKind {}
impl NestsWithin<HandlerOnlyKind> for SubtreeWideKind {}
impl NestsWithin<SubtreeWideKind> for SubtreeWideKind {}
impl NestsWithin<LeafContentKind> for LeafContentKind {}
impl NestsWithin<WholeServiceKind> for WholeServiceKind {}
impl NestsWithin<WholeServiceKind> for SubtreeWideKind {}

// ─── Typed Builder ───────────────────────────────────────────────────

/// Statically kind-checked metadata block builder.
///
/// The preferred authoring surface: nesting restrictions are enforced by
/// the type system, so `nest` is infallible.
///
/// ```
/// use canopy_model::{BlockBuilder, HandlerOnlyKind, SubtreeWideKind};
/// use canopy_context::{keys::TimeoutKey, Scope};
///
/// let block = BlockBuilder::<HandlerOnlyKind>::new()
///     .contribute::<TimeoutKey>(5_000, Scope::Local)
///     .nest(BlockBuilder::<SubtreeWideKind>::new())
///     .build();
/// ```
///
/// Nesting a whole-service builder inside a handler-only builder does
/// not compile:
///
/// ```compile_fail
/// use canopy_model::{BlockBuilder, HandlerOnlyKind, WholeServiceKind};
///
/// // ERROR: `WholeServiceKind: NestsWithin<HandlerOnlyKind>` is not satisfied
/// let _ = BlockBuilder::<HandlerOnlyKind>::new()
///     .nest(BlockBuilder::<WholeServiceKind>::new());
/// ```
#[derive(Debug, Clone)]
pub struct BlockBuilder<K: KindMarker> {
    block: MetadataBlock,
    _kind: PhantomData<K>,
}

impl<K: KindMarker> BlockBuilder<K> {
    /// Empty builder for kind `K`.
    pub fn new() -> Self {
        Self {
            block: MetadataBlock::new(K::KIND),
            _kind: PhantomData,
        }
    }

    /// Append a contribution of `value` under key `CK`.
    pub fn contribute<CK: ContextKey>(mut self, value: CK::Value, scope: Scope) -> Self {
        self.block = self.block.contribute::<CK>(value, scope);
        self
    }

    /// Nest a compatible inner builder. Statically checked; no failure
    /// path exists.
    pub fn nest<I>(mut self, inner: BlockBuilder<I>) -> Self
    where
        I: KindMarker + NestsWithin<K>,
    {
        self.block.decls.push(Declaration::Block(inner.block));
        self
    }

    /// Conditional inclusion: exactly one branch's declarations are
    /// collected, chosen by `condition`.
    pub fn when(mut self, condition: bool, when_true: Self, when_false: Self) -> Self {
        self.block.decls.push(Declaration::Either {
            condition,
            when_true: when_true.block.decls,
            when_false: when_false.block.decls,
        });
        self
    }

    /// Optional inclusion: `None` contributes nothing.
    pub fn maybe(mut self, branch: Option<Self>) -> Self {
        self.block.decls.push(Declaration::Maybe(
            branch.map(|b| Box::new(Declaration::Many(b.block.decls))),
        ));
        self
    }

    /// Lower into the dynamically represented block.
    pub fn build(self) -> MetadataBlock {
        self.block
    }
}

impl<K: KindMarker> Default for BlockBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}
