//! # Context Stores
//!
//! An insertion-ordered container of type-erased values keyed by the
//! `TypeId` of their context key. Order matters: reduction folds in
//! contribution order, and the modifier-precedence rules depend on the
//! store seeing contributions in exactly the order the traversal applied
//! them. A hash map would destroy that ordering, so the store is a plain
//! vector of entries.
//!
//! Each entry carries a small vtable of monomorphized function pointers
//! (merge, clone, debug-render) so the store itself stays object-safe and
//! free of generic parameters.

use std::any::{Any, TypeId};
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::key::{ContextKey, Reduction};

/// Error raised while putting contributions into a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// A key that permits exactly one contribution received a second.
    ///
    /// This is a composition defect in the declared tree, fatal at
    /// compile time; it is never a request-time condition.
    #[error("context key `{key}` permits exactly one contribution, but received a second")]
    DuplicateExactlyOnce {
        /// Diagnostic name of the offending key.
        key: &'static str,
    },
}

type ErasedValue = Box<dyn Any + Send + Sync>;

/// One stored slot: the erased value plus its per-key vtable.
pub(crate) struct Entry {
    type_id: TypeId,
    key_name: &'static str,
    value: ErasedValue,
    merge: fn(&mut ErasedValue, ErasedValue) -> Result<(), ContextError>,
    clone_value: fn(&(dyn Any + Send + Sync)) -> ErasedValue,
    debug_value: fn(&(dyn Any + Send + Sync)) -> String,
}

impl Entry {
    pub(crate) fn of<K: ContextKey>(value: K::Value) -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            key_name: K::NAME,
            value: Box::new(value),
            merge: merge_erased::<K>,
            clone_value: clone_erased::<K>,
            debug_value: debug_erased::<K>,
        }
    }

    pub(crate) fn clone_entry(&self) -> Self {
        Self {
            type_id: self.type_id,
            key_name: self.key_name,
            value: (self.clone_value)(self.value.as_ref()),
            merge: self.merge,
            clone_value: self.clone_value,
            debug_value: self.debug_value,
        }
    }
}

fn unwrap_value<K: ContextKey>(value: ErasedValue) -> K::Value {
    match value.downcast::<K::Value>() {
        Ok(v) => *v,
        // Entries are only reachable through a TypeId match on K.
        Err(_) => unreachable!("store entry for `{}` holds a foreign type", K::NAME),
    }
}

/// Merge `next` into `existing` in place. A rejected merge leaves
/// `existing` untouched.
fn merge_erased<K: ContextKey>(
    existing: &mut ErasedValue,
    next: ErasedValue,
) -> Result<(), ContextError> {
    match K::reduction() {
        Reduction::ExactlyOnce => Err(ContextError::DuplicateExactlyOnce { key: K::NAME }),
        Reduction::FirstWins => Ok(()),
        Reduction::LastWins => {
            *existing = next;
            Ok(())
        }
        Reduction::Custom(reduce) => {
            let current = std::mem::replace(existing, Box::new(()));
            let merged = reduce(unwrap_value::<K>(current), unwrap_value::<K>(next));
            *existing = Box::new(merged);
            Ok(())
        }
    }
}

fn clone_erased<K: ContextKey>(value: &(dyn Any + Send + Sync)) -> ErasedValue {
    match value.downcast_ref::<K::Value>() {
        Some(v) => Box::new(v.clone()),
        None => unreachable!("store entry for `{}` holds a foreign type", K::NAME),
    }
}

fn debug_erased<K: ContextKey>(value: &(dyn Any + Send + Sync)) -> String {
    match value.downcast_ref::<K::Value>() {
        Some(v) => format!("{v:?}"),
        None => unreachable!("store entry for `{}` holds a foreign type", K::NAME),
    }
}

/// Insertion-ordered key-value container for context metadata.
///
/// `put` applies the key's reduction policy on collision; `get` falls
/// back to the key's default value when nothing was contributed.
#[derive(Default)]
pub struct ContextStore {
    entries: Vec<Entry>,
}

impl ContextStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contribute a value under key `K`, reducing on collision per
    /// `K::reduction()`.
    pub fn put<K: ContextKey>(&mut self, value: K::Value) -> Result<(), ContextError> {
        self.put_entry(Entry::of::<K>(value))
    }

    pub(crate) fn put_entry(&mut self, entry: Entry) -> Result<(), ContextError> {
        match self.position(entry.type_id) {
            Some(idx) => {
                let slot = &mut self.entries[idx];
                (slot.merge)(&mut slot.value, entry.value)
            }
            None => {
                self.entries.push(entry);
                Ok(())
            }
        }
    }

    /// The stored value for `K`, if any node contributed one.
    pub fn peek<K: ContextKey>(&self) -> Option<&K::Value> {
        self.position(TypeId::of::<K>())
            .and_then(|idx| self.entries[idx].value.downcast_ref::<K::Value>())
    }

    /// The resolved value for `K`: the stored value, or the key's default.
    pub fn get<K: ContextKey>(&self) -> K::Value {
        self.peek::<K>().cloned().unwrap_or_else(K::default_value)
    }

    /// Whether any contribution targeted `K`.
    pub fn contains<K: ContextKey>(&self) -> bool {
        self.position(TypeId::of::<K>()).is_some()
    }

    /// Number of distinct keys contributed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no contributions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostic names of all contributed keys, in insertion order.
    pub fn key_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key_name)
    }

    /// Fold every entry of `other` into this store via each key's
    /// reduction policy, preserving `other`'s insertion order.
    ///
    /// Used by context resolution to fold ancestor subtree stores
    /// root-first, so entries from stores folded later reduce later and
    /// win under `LastWins`/custom policies.
    pub fn merge_from(&mut self, other: &ContextStore) -> Result<(), ContextError> {
        for entry in &other.entries {
            self.put_entry(entry.clone_entry())?;
        }
        Ok(())
    }

    /// Replace this store's slots wholesale with `other`'s entries,
    /// bypassing reduction.
    ///
    /// Used to overlay a node's `Local` store on top of the inherited
    /// fold: a local value shadows the inherited one outright rather
    /// than merging with it.
    pub fn overlay_from(&mut self, other: &ContextStore) {
        for entry in &other.entries {
            match self.position(entry.type_id) {
                Some(idx) => self.entries[idx] = entry.clone_entry(),
                None => self.entries.push(entry.clone_entry()),
            }
        }
    }

    fn position(&self, type_id: TypeId) -> Option<usize> {
        self.entries.iter().position(|e| e.type_id == type_id)
    }
}

impl Clone for ContextStore {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.iter().map(Entry::clone_entry).collect(),
        }
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for entry in &self.entries {
            map.entry(&entry.key_name, &(entry.debug_value)(entry.value.as_ref()));
        }
        map.finish()
    }
}

/// Read-only context snapshot owned by a compiled endpoint descriptor.
///
/// Immutable after construction and safe to read from any number of
/// threads: every stored value is `Send + Sync` and there is no interior
/// mutability.
#[derive(Clone)]
pub struct ResolvedContext(ContextStore);

impl ResolvedContext {
    /// Freeze a store into a read-only snapshot.
    pub fn from_store(store: ContextStore) -> Self {
        Self(store)
    }

    /// Snapshot with no contributions; every `get` yields the default.
    pub fn empty() -> Self {
        Self(ContextStore::new())
    }

    /// The resolved value for `K`, or the key's default.
    pub fn get<K: ContextKey>(&self) -> K::Value {
        self.0.get::<K>()
    }

    /// The contributed value for `K`, if any.
    pub fn peek<K: ContextKey>(&self) -> Option<&K::Value> {
        self.0.peek::<K>()
    }

    /// Whether any contribution targeted `K`.
    pub fn contains<K: ContextKey>(&self) -> bool {
        self.0.contains::<K>()
    }

    /// Number of distinct contributed keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key was contributed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Diagnostic names of contributed keys, in insertion order.
    pub fn key_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.key_names()
    }
}

impl fmt::Debug for ResolvedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Serializes as a map of key name to debug-rendered value. Values are
/// type-erased, so this surface is diagnostic; typed access goes through
/// `get::<K>()`.
impl Serialize for ResolvedContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.entries.len()))?;
        for entry in &self.0.entries {
            map.serialize_entry(entry.key_name, &(entry.debug_value)(entry.value.as_ref()))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Reduction;

    struct OnceKey;
    impl ContextKey for OnceKey {
        type Value = u32;
        const NAME: &'static str = "Once";
        fn default_value() -> u32 {
            0
        }
    }

    struct LastKey;
    impl ContextKey for LastKey {
        type Value = String;
        const NAME: &'static str = "Last";
        fn default_value() -> String {
            String::new()
        }
        fn reduction() -> Reduction<String> {
            Reduction::LastWins
        }
    }

    struct FirstKey;
    impl ContextKey for FirstKey {
        type Value = u32;
        const NAME: &'static str = "First";
        fn default_value() -> u32 {
            0
        }
        fn reduction() -> Reduction<u32> {
            Reduction::FirstWins
        }
    }

    struct MaxKey;
    impl ContextKey for MaxKey {
        type Value = u64;
        const NAME: &'static str = "Max";
        fn default_value() -> u64 {
            0
        }
        fn reduction() -> Reduction<u64> {
            Reduction::Custom(u64::max)
        }
    }

    #[test]
    fn test_get_returns_default_when_absent() {
        let store = ContextStore::new();
        assert_eq!(store.get::<OnceKey>(), 0);
        assert!(!store.contains::<OnceKey>());
        assert!(store.peek::<OnceKey>().is_none());
    }

    #[test]
    fn test_exactly_once_rejects_second_contribution() {
        let mut store = ContextStore::new();
        store.put::<OnceKey>(7).unwrap();
        let err = store.put::<OnceKey>(8).unwrap_err();
        assert_eq!(err, ContextError::DuplicateExactlyOnce { key: "Once" });
        // The first value survives the failed put.
        assert_eq!(store.get::<OnceKey>(), 7);
    }

    #[test]
    fn test_last_wins() {
        let mut store = ContextStore::new();
        store.put::<LastKey>("a".into()).unwrap();
        store.put::<LastKey>("b".into()).unwrap();
        assert_eq!(store.get::<LastKey>(), "b");
    }

    #[test]
    fn test_first_wins() {
        let mut store = ContextStore::new();
        store.put::<FirstKey>(1).unwrap();
        store.put::<FirstKey>(2).unwrap();
        assert_eq!(store.get::<FirstKey>(), 1);
    }

    #[test]
    fn test_custom_reduction_max() {
        let mut store = ContextStore::new();
        store.put::<MaxKey>(128).unwrap();
        store.put::<MaxKey>(256).unwrap();
        store.put::<MaxKey>(64).unwrap();
        assert_eq!(store.get::<MaxKey>(), 256);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = ContextStore::new();
        store.put::<MaxKey>(1).unwrap();
        store.put::<LastKey>("x".into()).unwrap();
        store.put::<OnceKey>(3).unwrap();
        let names: Vec<&str> = store.key_names().collect();
        assert_eq!(names, vec!["Max", "Last", "Once"]);
    }

    #[test]
    fn test_merge_from_reduces_in_order() {
        let mut base = ContextStore::new();
        base.put::<MaxKey>(128).unwrap();
        let mut nearer = ContextStore::new();
        nearer.put::<MaxKey>(256).unwrap();
        nearer.put::<LastKey>("near".into()).unwrap();

        base.merge_from(&nearer).unwrap();
        assert_eq!(base.get::<MaxKey>(), 256);
        assert_eq!(base.get::<LastKey>(), "near");
    }

    #[test]
    fn test_overlay_shadows_without_reduction() {
        let mut base = ContextStore::new();
        base.put::<OnceKey>(1).unwrap();
        let mut local = ContextStore::new();
        local.put::<OnceKey>(9).unwrap();

        // ExactlyOnce would reject a merge; overlay replaces outright.
        base.overlay_from(&local);
        assert_eq!(base.get::<OnceKey>(), 9);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut store = ContextStore::new();
        store.put::<LastKey>("orig".into()).unwrap();
        let snapshot = store.clone();
        store.put::<LastKey>("changed".into()).unwrap();
        assert_eq!(snapshot.get::<LastKey>(), "orig");
        assert_eq!(store.get::<LastKey>(), "changed");
    }

    #[test]
    fn test_resolved_context_serializes_key_names() {
        let mut store = ContextStore::new();
        store.put::<MaxKey>(256).unwrap();
        let resolved = ResolvedContext::from_store(store);
        let json = serde_json::to_string(&resolved).unwrap();
        assert_eq!(json, r#"{"Max":"256"}"#);
    }
}
