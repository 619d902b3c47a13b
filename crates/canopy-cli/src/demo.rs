//! # Demo Service Tree
//!
//! A small versioned user service exercising every node flavor: nested
//! groups, parameterized segments, stacked modifiers, metadata blocks of
//! each attachable kind, and parameters of every locus.

use canopy_compile::{Compiler, CompilerOptions, EndpointDescriptor};
use canopy_context::keys::{
    ApiVersionKey, MemoryLimitKey, ServiceDescriptionKey, StatusOverrideKey, TagsKey, TimeoutKey,
};
use canopy_context::Scope;
use canopy_core::Locus;
use canopy_model::{
    BlockBuilder, ConfigNode, FieldShape, GroupNode, HandlerNode, HandlerOnlyKind, InputField,
    SubtreeWideKind, WholeServiceKind,
};

/// Health probe response.
pub struct Health;
/// A single user record.
pub struct User;
/// A page of user records.
pub struct UserList;
/// Creation acknowledgement.
pub struct Created;

/// Build the demo configuration tree.
pub fn demo_tree() -> ConfigNode {
    let users = GroupNode::new("users")
        .child(
            HandlerNode::new::<UserList>("ListUsers")
                .input(InputField::new("page", FieldShape::Primitive).with_default())
                .input(
                    InputField::new("authorization", FieldShape::Primitive)
                        .locus(Locus::Header)
                        .connection_constant(),
                ),
        )
        .child(
            HandlerNode::new::<Created>("CreateUser")
                .input(InputField::new("payload", FieldShape::Complex))
                .handler_metadata(
                    BlockBuilder::<HandlerOnlyKind>::new()
                        .contribute::<StatusOverrideKey>(201, Scope::Local)
                        .contribute::<TimeoutKey>(10_000, Scope::Local),
                ),
        )
        .child(
            GroupNode::root().param_segment("user_id").child(
                HandlerNode::new::<User>("GetUser")
                    .input(InputField::new("user_id", FieldShape::Primitive).locus(Locus::Path)),
            ),
        );

    GroupNode::root()
        .service_metadata(
            BlockBuilder::<WholeServiceKind>::new().contribute::<ServiceDescriptionKey>(
                "Canopy demo user service".to_string(),
                Scope::Inherited,
            ),
        )
        .child(HandlerNode::new::<Health>("GetHealth").identifier("health"))
        .child(
            GroupNode::new("v1")
                .subtree_metadata(
                    BlockBuilder::<SubtreeWideKind>::new()
                        .contribute::<ApiVersionKey>("v1".to_string(), Scope::Inherited)
                        .contribute::<TagsKey>(vec!["stable".to_string()], Scope::Inherited),
                )
                // Stacked modifiers: the outer 256 MiB request dominates
                // the inner 128 under max-reduction.
                .child(
                    ConfigNode::from(users)
                        .modifier::<MemoryLimitKey>(128, Scope::Inherited)
                        .modifier::<MemoryLimitKey>(256, Scope::Inherited),
                ),
        )
        .into()
}

/// Compile the demo tree.
pub fn compile_demo() -> anyhow::Result<Vec<EndpointDescriptor>> {
    let compiler = Compiler::with_options(CompilerOptions {
        service_name: "canopy-demo".to_string(),
        ..CompilerOptions::default()
    });
    Ok(compiler.try_compile(&demo_tree())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_tree_compiles() {
        let endpoints = compile_demo().unwrap();
        let ids: Vec<&str> = endpoints.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "health",
                "v1.users.ListUsers",
                "v1.users.CreateUser",
                "v1.users.user_id.GetUser",
            ]
        );
    }

    #[test]
    fn test_demo_modifier_stack_resolves_to_outer_value() {
        let endpoints = compile_demo().unwrap();
        let list = &endpoints[1];
        assert_eq!(list.context.get::<MemoryLimitKey>(), 256);
    }

    #[test]
    fn test_demo_routes() {
        let endpoints = compile_demo().unwrap();
        let routes: Vec<String> = endpoints.iter().map(|e| e.route.render()).collect();
        assert_eq!(
            routes,
            vec!["/", "/v1/users", "/v1/users", "/v1/users/{user_id}"]
        );
    }

    #[test]
    fn test_demo_status_override_is_local_to_create() {
        let endpoints = compile_demo().unwrap();
        assert_eq!(endpoints[2].context.get::<StatusOverrideKey>(), 201);
        assert_eq!(endpoints[1].context.get::<StatusOverrideKey>(), 200);
    }
}
