//! # Scope Node Arena
//!
//! Traversal-time mirror of the configuration tree. Every visited node
//! gets a scope node holding two stores: `local` for contributions that
//! die with the node, `subtree` for contributions its descendants
//! inherit.
//!
//! Scope nodes live in a flat vector and refer to their parents by plain
//! index, so the arena owns everything and no reference cycles exist.
//! Siblings never share a scope node; only the ancestors a node actually
//! descends from participate in its resolution.

use canopy_context::{ContextError, ContextStore, Contribution, ResolvedContext, Scope};

/// One traversal-time scope node.
#[derive(Debug, Default)]
struct ScopeNode {
    /// Arena index of the parent, `None` at the root.
    parent: Option<usize>,
    /// Contributions visible only at this exact node.
    local: ContextStore,
    /// Contributions inherited by this node and its subtree.
    subtree: ContextStore,
}

/// Flat arena of scope nodes, indexed by allocation order.
#[derive(Debug, Default)]
pub struct ScopeArena {
    nodes: Vec<ScopeNode>,
}

impl ScopeArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a scope node under `parent`; returns its index.
    pub fn push(&mut self, parent: Option<usize>) -> usize {
        self.nodes.push(ScopeNode {
            parent,
            ..ScopeNode::default()
        });
        self.nodes.len() - 1
    }

    /// Apply one contribution at node `idx`, routed by its scope.
    pub fn apply(&mut self, idx: usize, contribution: &Contribution) -> Result<(), ContextError> {
        let node = &mut self.nodes[idx];
        let store = match contribution.scope {
            Scope::Local => &mut node.local,
            Scope::Inherited => &mut node.subtree,
        };
        contribution.apply_to(store)
    }

    /// Resolve the effective context at node `idx`.
    ///
    /// Inherited values fold root-first along the ancestor chain, so a
    /// contribution nearer to `idx` reduces later and wins under
    /// last-wins and custom policies. The node's own local store then
    /// shadows the fold outright; local values never merge with
    /// inherited ones and never escape their node.
    pub fn resolve(&self, idx: usize) -> Result<ResolvedContext, ContextError> {
        let mut chain = Vec::new();
        let mut cursor = Some(idx);
        while let Some(i) = cursor {
            chain.push(i);
            cursor = self.nodes[i].parent;
        }

        let mut resolved = ContextStore::new();
        for &i in chain.iter().rev() {
            resolved.merge_from(&self.nodes[i].subtree)?;
        }
        resolved.overlay_from(&self.nodes[idx].local);
        Ok(ResolvedContext::from_store(resolved))
    }

    /// Number of allocated scope nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no scope node was allocated yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
