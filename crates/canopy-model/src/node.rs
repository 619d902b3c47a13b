//! # Configuration Tree Nodes
//!
//! The declarative tree service authors assemble: grouping nodes
//! contribute path segments and own children, handler leaves become
//! endpoints, and modifier nodes decorate the subtree they wrap with
//! synthesized context contributions.
//!
//! The tree owns its nodes top-down. Nothing here holds a parent
//! reference; parent chains exist only in the compiler's scope arena,
//! as plain indices.

use canopy_context::{ContextKey, Contribution, ContributionOrigin, Scope};
use canopy_core::{PathSegment, TypeTag};

use crate::input::InputField;
use crate::metadata::{
    BlockBuilder, HandlerOnlyKind, LeafContentKind, MetadataBlock, ModelError, SubtreeWideKind,
    WholeServiceKind,
};

/// A node of the configuration tree. Closed set; the compiler matches
/// exhaustively.
#[derive(Debug, Clone)]
pub enum ConfigNode {
    /// Grouping node: path segments, metadata, children.
    Group(GroupNode),
    /// Handler leaf: one addressable operation.
    Handler(HandlerNode),
    /// Modifier: wraps a subtree and synthesizes contributions for it.
    Modifier(ModifierNode),
}

impl ConfigNode {
    /// Wrap this node in a modifier contributing `value` under `K`.
    ///
    /// Chained calls stack: the last `.modifier(..)` call is the
    /// outermost wrapper, and its contribution takes final precedence
    /// during reduction.
    pub fn modifier<K: ContextKey>(self, value: K::Value, scope: Scope) -> ConfigNode {
        ConfigNode::Modifier(ModifierNode {
            contributions: vec![Contribution::new::<K>(
                value,
                scope,
                ContributionOrigin::Modifier,
            )],
            child: Box::new(self),
        })
    }

    /// Node flavor name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Handler(_) => "handler",
            Self::Modifier(_) => "modifier",
        }
    }
}

impl From<GroupNode> for ConfigNode {
    fn from(node: GroupNode) -> Self {
        Self::Group(node)
    }
}

impl From<HandlerNode> for ConfigNode {
    fn from(node: HandlerNode) -> Self {
        Self::Handler(node)
    }
}

impl From<ModifierNode> for ConfigNode {
    fn from(node: ModifierNode) -> Self {
        Self::Modifier(node)
    }
}

// ─── Grouping Nodes ──────────────────────────────────────────────────

/// A grouping node: contributes path segments to every descendant and
/// scopes metadata over its subtree.
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    /// Segments this group appends to the route, in order.
    pub segments: Vec<PathSegment>,
    /// Attached metadata blocks, collected in attachment order.
    pub metadata: Vec<MetadataBlock>,
    /// Children, in declaration order. Declaration order is externally
    /// observable through the compiled descriptor list.
    pub children: Vec<ConfigNode>,
}

impl GroupNode {
    /// Group contributing a single literal segment.
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::literal(segment)],
            ..Self::default()
        }
    }

    /// Group contributing no segments (a pure scoping node, typically
    /// the service root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a further segment.
    pub fn segment(mut self, segment: PathSegment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Append a parameterized segment bound to `name`.
    pub fn param_segment(self, name: impl Into<String>) -> Self {
        self.segment(PathSegment::parameter(name))
    }

    /// Append a child node.
    pub fn child(mut self, node: impl Into<ConfigNode>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Attach a metadata block, failing if a group does not accept its
    /// kind (handler-only and leaf-content blocks have no meaning here).
    pub fn metadata(mut self, block: MetadataBlock) -> Result<Self, ModelError> {
        if !block.kind().attaches_to_group() {
            return Err(ModelError::UnsupportedAttachment {
                node: "group",
                block: block.kind(),
            });
        }
        self.metadata.push(block);
        Ok(self)
    }

    /// Attach subtree-wide metadata. Statically acceptable; no failure
    /// path exists.
    pub fn subtree_metadata(mut self, builder: BlockBuilder<SubtreeWideKind>) -> Self {
        self.metadata.push(builder.build());
        self
    }

    /// Attach whole-service metadata, typically at the root group.
    pub fn service_metadata(mut self, builder: BlockBuilder<WholeServiceKind>) -> Self {
        self.metadata.push(builder.build());
        self
    }
}

// ─── Handler Leaves ──────────────────────────────────────────────────

/// A handler leaf: the unit that compiles into one endpoint descriptor.
#[derive(Debug, Clone)]
pub struct HandlerNode {
    /// Diagnostic handler name, e.g. `GetUser`.
    pub name: String,
    /// Explicit stable identifier; derived from the route when absent.
    pub identifier: Option<String>,
    /// Marker for the handler's response type.
    pub response: TypeTag,
    /// Attached metadata blocks, collected in attachment order.
    pub metadata: Vec<MetadataBlock>,
    /// Declared input fields, in declaration order.
    pub inputs: Vec<InputField>,
}

impl HandlerNode {
    /// Handler named `name` responding with values of type `T`.
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            response: TypeTag::of::<T>(),
            metadata: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Declare an explicit stable identifier.
    pub fn identifier(mut self, id: impl Into<String>) -> Self {
        self.identifier = Some(id.into());
        self
    }

    /// Declare an input field.
    pub fn input(mut self, field: InputField) -> Self {
        self.inputs.push(field);
        self
    }

    /// Attach a metadata block, failing if a handler does not accept its
    /// kind (whole-service metadata has no meaning on one handler).
    pub fn metadata(mut self, block: MetadataBlock) -> Result<Self, ModelError> {
        if !block.kind().attaches_to_handler() {
            return Err(ModelError::UnsupportedAttachment {
                node: "handler",
                block: block.kind(),
            });
        }
        self.metadata.push(block);
        Ok(self)
    }

    /// Attach handler-only metadata. Statically acceptable.
    pub fn handler_metadata(mut self, builder: BlockBuilder<HandlerOnlyKind>) -> Self {
        self.metadata.push(builder.build());
        self
    }

    /// Attach leaf-content metadata. Statically acceptable.
    pub fn content_metadata(mut self, builder: BlockBuilder<LeafContentKind>) -> Self {
        self.metadata.push(builder.build());
        self
    }
}

// ─── Modifier Nodes ──────────────────────────────────────────────────

/// A modifier node: wraps exactly one subtree and synthesizes context
/// contributions for it.
///
/// Modifier contributions are buffered by the traversal and applied to
/// the wrapped node's scope after all of its declaration-origin
/// contributions, ordered so the outermost modifier reduces last.
#[derive(Debug, Clone)]
pub struct ModifierNode {
    /// Contributions this modifier synthesizes, in declaration order.
    pub contributions: Vec<Contribution>,
    /// The wrapped subtree.
    pub child: Box<ConfigNode>,
}

impl ModifierNode {
    /// Wrap `child` with a single synthesized contribution.
    pub fn wrap<K: ContextKey>(
        child: impl Into<ConfigNode>,
        value: K::Value,
        scope: Scope,
    ) -> Self {
        Self {
            contributions: vec![Contribution::new::<K>(
                value,
                scope,
                ContributionOrigin::Modifier,
            )],
            child: Box::new(child.into()),
        }
    }

    /// Synthesize a further contribution from the same modifier.
    pub fn contribute<K: ContextKey>(mut self, value: K::Value, scope: Scope) -> Self {
        self.contributions.push(Contribution::new::<K>(
            value,
            scope,
            ContributionOrigin::Modifier,
        ));
        self
    }
}
