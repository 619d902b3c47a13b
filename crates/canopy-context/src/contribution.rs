//! # Contributions
//!
//! A contribution is one (key, value, scope, origin) record on its way
//! into a scope node's stores. Metadata blocks produce declaration-origin
//! contributions; modifier nodes synthesize modifier-origin ones. The
//! traversal applies them in a fixed order: declarations first, in
//! declaration order, then buffered modifier contributions such that the
//! outermost-applied modifier reduces last and takes final precedence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::ContextKey;
use crate::store::{ContextError, ContextStore, Entry};

/// Visibility of a contributed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Applies only to the exact node it was contributed to and is
    /// discarded once traversal leaves that node.
    Local,
    /// Applies to the node and every node in its subtree via the parent
    /// chain.
    Inherited,
}

impl Scope {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Inherited => "inherited",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who synthesized a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionOrigin {
    /// Written directly inside a metadata block.
    Declaration,
    /// Synthesized by a modifier node wrapping the subtree.
    Modifier,
}

/// One typed value bound for a scope node's stores.
///
/// The value is type-erased; the key's reduction and clone behavior
/// travel with it. Contributions are cloneable because the configuration
/// tree owns them and a tree may be compiled more than once.
pub struct Contribution {
    /// Visibility of the value.
    pub scope: Scope,
    /// Whether a block declaration or a modifier produced it.
    pub origin: ContributionOrigin,
    entry: Entry,
    key_name: &'static str,
}

impl Contribution {
    /// A contribution of `value` under key `K`.
    pub fn new<K: ContextKey>(value: K::Value, scope: Scope, origin: ContributionOrigin) -> Self {
        Self {
            scope,
            origin,
            entry: Entry::of::<K>(value),
            key_name: K::NAME,
        }
    }

    /// Diagnostic name of the targeted key.
    pub fn key_name(&self) -> &'static str {
        self.key_name
    }

    /// Apply this contribution to `store`, reducing on collision.
    pub fn apply_to(&self, store: &mut ContextStore) -> Result<(), ContextError> {
        store.put_entry(self.entry.clone_entry())
    }
}

impl Clone for Contribution {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope,
            origin: self.origin,
            entry: self.entry.clone_entry(),
            key_name: self.key_name,
        }
    }
}

impl fmt::Debug for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contribution")
            .field("key", &self.key_name)
            .field("scope", &self.scope)
            .field("origin", &self.origin)
            .finish()
    }
}
