//! # Tree Visitor
//!
//! The single depth-first traversal of the configuration tree. Each
//! visited group or handler allocates a scope node; metadata blocks are
//! collected on entry; handler leaves mint descriptors on leave.
//!
//! ## Ordering Invariants
//!
//! - The descriptor list order equals the pre-order depth-first order of
//!   handler leaves in the source tree.
//! - At one node, declaration-origin contributions apply in declaration
//!   order; modifier-synthesized contributions are buffered during
//!   descent and flushed afterwards, innermost modifier first, so the
//!   outermost modifier reduces last and takes final precedence.
//!
//! The traversal threads an explicit accumulator through the call chain.
//! There is no process-wide registry: compiling the same tree twice
//! yields two independent, identical descriptor lists.

use tracing::debug;

use canopy_context::Contribution;
use canopy_core::EndpointId;
use canopy_model::{ConfigNode, GroupNode, HandlerNode, MetadataBlock};

use crate::descriptor::EndpointDescriptor;
use crate::error::CompileError;
use crate::params::collect_parameters;
use crate::path::PathAccumulator;
use crate::scope::ScopeArena;
use crate::CompilerOptions;

/// Traversal state for one compilation run.
pub(crate) struct Traversal<'a> {
    options: &'a CompilerOptions,
    arena: ScopeArena,
    path: PathAccumulator,
    endpoints: Vec<EndpointDescriptor>,
}

/// Modifier contributions buffered while descending through a modifier
/// chain, one group per modifier, outermost first.
type ModifierBuffer = Vec<Vec<Contribution>>;

impl<'a> Traversal<'a> {
    /// Walk `tree` once and return the ordered descriptor list.
    pub(crate) fn run(
        options: &'a CompilerOptions,
        tree: &ConfigNode,
    ) -> Result<Vec<EndpointDescriptor>, CompileError> {
        let mut traversal = Self {
            options,
            arena: ScopeArena::new(),
            path: PathAccumulator::new(),
            endpoints: Vec::new(),
        };
        traversal.walk(tree, None, &mut ModifierBuffer::new())?;
        Ok(traversal.endpoints)
    }

    fn walk(
        &mut self,
        node: &ConfigNode,
        parent: Option<usize>,
        pending: &mut ModifierBuffer,
    ) -> Result<(), CompileError> {
        match node {
            ConfigNode::Modifier(modifier) => {
                // Outermost modifiers are encountered first on the way
                // down; the wrapped node flushes the buffer.
                pending.push(modifier.contributions.clone());
                self.walk(&modifier.child, parent, pending)
            }
            ConfigNode::Group(group) => self.enter_group(group, parent, pending),
            ConfigNode::Handler(handler) => self.enter_handler(handler, parent, pending),
        }
    }

    fn enter_group(
        &mut self,
        group: &GroupNode,
        parent: Option<usize>,
        pending: &mut ModifierBuffer,
    ) -> Result<(), CompileError> {
        let scope = self.arena.push(parent);
        let at = group
            .segments
            .first()
            .map(|s| s.render())
            .unwrap_or_else(|| "<root>".to_string());
        debug!(node = %at, scope, "entering group");

        self.apply_metadata(scope, &group.metadata, pending, &at)?;
        let pushed = self.path.push_segments(&group.segments);

        for child in &group.children {
            self.walk(child, Some(scope), &mut ModifierBuffer::new())?;
        }

        self.path.pop_segments(pushed);
        Ok(())
    }

    fn enter_handler(
        &mut self,
        handler: &HandlerNode,
        parent: Option<usize>,
        pending: &mut ModifierBuffer,
    ) -> Result<(), CompileError> {
        let scope = self.arena.push(parent);
        debug!(handler = %handler.name, scope, "visiting handler leaf");

        self.apply_metadata(scope, &handler.metadata, pending, &handler.name)?;

        let route = self.path.snapshot();
        let context = self
            .arena
            .resolve(scope)
            .map_err(CompileError::context_at(handler.name.clone()))?;
        let parameters = collect_parameters(handler, &self.options.locus_policy)?;
        let id = match &handler.identifier {
            Some(explicit) => EndpointId::explicit(explicit),
            None => EndpointId::derived(&route, &handler.name),
        };

        self.endpoints.push(EndpointDescriptor {
            id,
            handler_name: handler.name.clone(),
            route,
            parameters,
            context,
            response: handler.response,
        });
        Ok(())
    }

    /// Apply a node's metadata: declaration contributions in declaration
    /// order, then the buffered modifier groups innermost-first so the
    /// outermost modifier's contribution is reduced last.
    fn apply_metadata(
        &mut self,
        scope: usize,
        blocks: &[MetadataBlock],
        pending: &mut ModifierBuffer,
        at: &str,
    ) -> Result<(), CompileError> {
        for block in blocks {
            for contribution in block.collect() {
                self.arena
                    .apply(scope, &contribution)
                    .map_err(CompileError::context_at(at.to_string()))?;
            }
        }
        for group in pending.drain(..).rev() {
            for contribution in group {
                self.arena
                    .apply(scope, &contribution)
                    .map_err(CompileError::context_at(at.to_string()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{try_compile, Compiler, CompilerOptions};
    use canopy_context::keys::{
        ApiVersionKey, MemoryLimitKey, StatusOverrideKey, TagsKey, TimeoutKey,
    };
    use canopy_context::Scope;
    use canopy_model::{
        BlockBuilder, ConfigNode, FieldShape, GroupNode, HandlerNode, HandlerOnlyKind,
        InputField, SubtreeWideKind,
    };
    use canopy_core::Locus;

    struct User;
    struct Ping;

    fn handler(name: &str) -> HandlerNode {
        HandlerNode::new::<Ping>(name)
    }

    #[test]
    fn test_round_trip_single_handler() {
        let tree: ConfigNode = GroupNode::new("v1")
            .child(GroupNode::new("users").child(HandlerNode::new::<User>("GetUsers")))
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints.len(), 1);
        let e = &endpoints[0];
        assert_eq!(e.route.render(), "/v1/users");
        assert!(e.parameters.is_empty());
        assert_eq!(e.id.as_str(), "v1.users.GetUsers");
        assert_eq!(e.response.short_name(), "User");
    }

    #[test]
    fn test_descriptor_order_is_preorder_dfs() {
        let tree: ConfigNode = GroupNode::root()
            .child(handler("A"))
            .child(
                GroupNode::new("nested")
                    .child(handler("B"))
                    .child(GroupNode::new("deeper").child(handler("C")))
                    .child(handler("D")),
            )
            .child(handler("E"))
            .into();

        let names: Vec<String> = try_compile(&tree)
            .unwrap()
            .into_iter()
            .map(|e| e.handler_name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_sibling_handlers_may_share_route() {
        let tree: ConfigNode = GroupNode::new("users")
            .child(handler("ListUsers"))
            .child(handler("CreateUser"))
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].route, endpoints[1].route);
    }

    #[test]
    fn test_local_scope_is_isolated() {
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                handler("Special").handler_metadata(
                    BlockBuilder::<HandlerOnlyKind>::new()
                        .contribute::<TimeoutKey>(60_000, Scope::Local),
                ),
            )
            .child(handler("Plain"))
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].context.get::<TimeoutKey>(), 60_000);
        // The sibling sees the default.
        assert_eq!(endpoints[1].context.get::<TimeoutKey>(), 30_000);
    }

    #[test]
    fn test_inherited_scope_covers_subtree_only() {
        let tree: ConfigNode = GroupNode::root()
            .child(
                GroupNode::new("covered")
                    .subtree_metadata(
                        BlockBuilder::<SubtreeWideKind>::new()
                            .contribute::<ApiVersionKey>("v9".into(), Scope::Inherited),
                    )
                    .child(handler("Inside"))
                    .child(GroupNode::new("deep").child(handler("DeepInside"))),
            )
            .child(handler("Outside"))
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].context.get::<ApiVersionKey>(), "v9");
        assert_eq!(endpoints[1].context.get::<ApiVersionKey>(), "v9");
        assert_eq!(endpoints[2].context.get::<ApiVersionKey>(), "v1");
    }

    #[test]
    fn test_memory_conflict_reduces_via_max() {
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                handler("Heavy").handler_metadata(
                    BlockBuilder::<HandlerOnlyKind>::new()
                        .contribute::<MemoryLimitKey>(128, Scope::Local)
                        .contribute::<MemoryLimitKey>(256, Scope::Local),
                ),
            )
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].context.get::<MemoryLimitKey>(), 256);
    }

    #[test]
    fn test_max_reduction_is_order_insensitive() {
        let declare = |first: u64, second: u64| -> u64 {
            let tree: ConfigNode = GroupNode::new("api")
                .child(
                    handler("H").handler_metadata(
                        BlockBuilder::<HandlerOnlyKind>::new()
                            .contribute::<MemoryLimitKey>(first, Scope::Local)
                            .contribute::<MemoryLimitKey>(second, Scope::Local),
                    ),
                )
                .into();
            try_compile(&tree).unwrap()[0].context.get::<MemoryLimitKey>()
        };
        assert_eq!(declare(128, 256), declare(256, 128));
    }

    #[test]
    fn test_outermost_modifier_takes_final_precedence() {
        // Chained calls stack outward: the second .modifier call wraps
        // the first, so "outer" is the outermost-applied modifier.
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                ConfigNode::from(handler("H"))
                    .modifier::<ApiVersionKey>("inner".into(), Scope::Inherited)
                    .modifier::<ApiVersionKey>("outer".into(), Scope::Inherited),
            )
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].context.get::<ApiVersionKey>(), "outer");
    }

    #[test]
    fn test_stacked_modifiers_accumulate_innermost_first() {
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                ConfigNode::from(
                    handler("H").handler_metadata(
                        BlockBuilder::<HandlerOnlyKind>::new()
                            .contribute::<TagsKey>(vec!["declared".into()], Scope::Local),
                    ),
                )
                .modifier::<TagsKey>(vec!["m1".into()], Scope::Local)
                .modifier::<TagsKey>(vec!["m2".into()], Scope::Local),
            )
            .into();

        let endpoints = try_compile(&tree).unwrap();
        // Declarations first, then modifiers innermost-first.
        assert_eq!(
            endpoints[0].context.get::<TagsKey>(),
            vec!["declared".to_string(), "m1".to_string(), "m2".to_string()]
        );
    }

    #[test]
    fn test_modifier_on_group_covers_subtree() {
        let tree: ConfigNode = GroupNode::root()
            .child(
                ConfigNode::from(
                    GroupNode::new("admin")
                        .child(handler("Inside"))
                        .child(GroupNode::new("deep").child(handler("DeepInside"))),
                )
                .modifier::<MemoryLimitKey>(2048, Scope::Inherited),
            )
            .child(handler("Outside"))
            .into();

        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].context.get::<MemoryLimitKey>(), 2048);
        assert_eq!(endpoints[1].context.get::<MemoryLimitKey>(), 2048);
        assert_eq!(endpoints[2].context.get::<MemoryLimitKey>(), 64);
    }

    #[test]
    fn test_parameterized_route_and_path_parameter() {
        let tree: ConfigNode = GroupNode::new("users")
            .child(
                GroupNode::root().param_segment("user_id").child(
                    handler("GetUser")
                        .input(InputField::new("user_id", FieldShape::Primitive).locus(Locus::Path)),
                ),
            )
            .into();

        let endpoints = try_compile(&tree).unwrap();
        let e = &endpoints[0];
        assert_eq!(e.route.render(), "/users/{user_id}");
        assert_eq!(e.parameters[0].locus, Locus::Path);
        let names: Vec<&str> = e.route.parameter_names().collect();
        assert_eq!(names, vec!["user_id"]);
    }

    #[test]
    fn test_duplicate_exactly_once_key_fails_compilation() {
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                handler("H").handler_metadata(
                    BlockBuilder::<HandlerOnlyKind>::new()
                        .contribute::<StatusOverrideKey>(201, Scope::Local)
                        .contribute::<StatusOverrideKey>(204, Scope::Local),
                ),
            )
            .into();

        let err = try_compile(&tree).unwrap_err();
        assert!(err.to_string().contains("StatusOverride"));
        assert!(err.to_string().contains("`H`"));
    }

    #[test]
    #[should_panic(expected = "configuration tree is invalid")]
    fn test_compile_panics_on_composition_error() {
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                handler("H").handler_metadata(
                    BlockBuilder::<HandlerOnlyKind>::new()
                        .contribute::<StatusOverrideKey>(201, Scope::Local)
                        .contribute::<StatusOverrideKey>(204, Scope::Local),
                ),
            )
            .into();
        let _ = Compiler::new().compile(&tree);
    }

    #[test]
    fn test_explicit_identifier_wins_over_derivation() {
        let tree: ConfigNode = GroupNode::new("v1")
            .child(handler("GetHealth").identifier("health.check"))
            .into();
        let endpoints = try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].id.as_str(), "health.check");
    }

    #[test]
    fn test_repeated_compilation_is_independent() {
        let tree: ConfigNode = GroupNode::new("api")
            .child(
                handler("H").handler_metadata(
                    BlockBuilder::<HandlerOnlyKind>::new()
                        .contribute::<TagsKey>(vec!["once".into()], Scope::Local),
                ),
            )
            .into();

        let first = try_compile(&tree).unwrap();
        let second = try_compile(&tree).unwrap();
        // No accumulation across runs: the tag list is identical, not doubled.
        assert_eq!(first[0].context.get::<TagsKey>(), second[0].context.get::<TagsKey>());
        assert_eq!(first[0].context.get::<TagsKey>(), vec!["once".to_string()]);
    }

    #[test]
    fn test_custom_options_service_name_and_policy() {
        let options = CompilerOptions {
            service_name: "demo".into(),
            locus_policy: crate::LocusPolicy::new(|_| Locus::Header),
        };
        let tree: ConfigNode = GroupNode::new("api")
            .child(handler("H").input(InputField::new("x", FieldShape::Primitive)))
            .into();
        let endpoints = Compiler::with_options(options).try_compile(&tree).unwrap();
        assert_eq!(endpoints[0].parameters[0].locus, Locus::Header);
    }
}
