//! # Built-In Context Key Vocabulary
//!
//! The keys exporters and deployment planners commonly register interest
//! in. Each key demonstrates one reduction class; service authors define
//! further keys by implementing `ContextKey` on their own tag types.

use crate::key::{ContextKey, Reduction};

/// Memory limit for the endpoint's deployment unit, in MiB.
///
/// Multiple contributions reduce via `max`: an endpoint asking for 128
/// and 256 MiB gets 256.
pub struct MemoryLimitKey;

impl ContextKey for MemoryLimitKey {
    type Value = u64;
    const NAME: &'static str = "MemoryLimit";

    fn default_value() -> u64 {
        64
    }

    fn reduction() -> Reduction<u64> {
        Reduction::Custom(u64::max)
    }
}

/// Request timeout budget in milliseconds, reduced via `max`.
pub struct TimeoutKey;

impl ContextKey for TimeoutKey {
    type Value = u64;
    const NAME: &'static str = "Timeout";

    fn default_value() -> u64 {
        30_000
    }

    fn reduction() -> Reduction<u64> {
        Reduction::Custom(u64::max)
    }
}

/// API version label; the nearest contribution wins.
pub struct ApiVersionKey;

impl ContextKey for ApiVersionKey {
    type Value = String;
    const NAME: &'static str = "ApiVersion";

    fn default_value() -> String {
        "v1".to_string()
    }

    fn reduction() -> Reduction<String> {
        Reduction::LastWins
    }
}

/// Accumulating tag list; contributions concatenate in order.
pub struct TagsKey;

impl ContextKey for TagsKey {
    type Value = Vec<String>;
    const NAME: &'static str = "Tags";

    fn default_value() -> Vec<String> {
        Vec::new()
    }

    fn reduction() -> Reduction<Vec<String>> {
        Reduction::Custom(|mut current, next| {
            current.extend(next);
            current
        })
    }
}

/// HTTP status override for successful responses.
///
/// Exactly one contribution permitted: two different overrides for the
/// same endpoint are a contradiction, not something to reconcile, so a
/// duplicate aborts compilation.
pub struct StatusOverrideKey;

impl ContextKey for StatusOverrideKey {
    type Value = u16;
    const NAME: &'static str = "StatusOverride";

    fn default_value() -> u16 {
        200
    }
}

/// Deprecation flag; the nearest contribution wins.
pub struct DeprecatedKey;

impl ContextKey for DeprecatedKey {
    type Value = bool;
    const NAME: &'static str = "Deprecated";

    fn default_value() -> bool {
        false
    }

    fn reduction() -> Reduction<bool> {
        Reduction::LastWins
    }
}

/// Whole-service description text, contributed once at the root.
pub struct ServiceDescriptionKey;

impl ContextKey for ServiceDescriptionKey {
    type Value = String;
    const NAME: &'static str = "ServiceDescription";

    fn default_value() -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ContextError, ContextStore};

    #[test]
    fn test_memory_limit_reduces_via_max() {
        let mut store = ContextStore::new();
        store.put::<MemoryLimitKey>(128).unwrap();
        store.put::<MemoryLimitKey>(256).unwrap();
        assert_eq!(store.get::<MemoryLimitKey>(), 256);
    }

    #[test]
    fn test_tags_accumulate_in_order() {
        let mut store = ContextStore::new();
        store.put::<TagsKey>(vec!["users".into()]).unwrap();
        store.put::<TagsKey>(vec!["admin".into(), "v1".into()]).unwrap();
        assert_eq!(
            store.get::<TagsKey>(),
            vec!["users".to_string(), "admin".to_string(), "v1".to_string()]
        );
    }

    #[test]
    fn test_status_override_is_exactly_once() {
        let mut store = ContextStore::new();
        store.put::<StatusOverrideKey>(201).unwrap();
        assert_eq!(
            store.put::<StatusOverrideKey>(204),
            Err(ContextError::DuplicateExactlyOnce {
                key: "StatusOverride"
            })
        );
    }

    #[test]
    fn test_defaults() {
        let store = ContextStore::new();
        assert_eq!(store.get::<MemoryLimitKey>(), 64);
        assert_eq!(store.get::<TimeoutKey>(), 30_000);
        assert_eq!(store.get::<ApiVersionKey>(), "v1");
        assert!(store.get::<TagsKey>().is_empty());
        assert_eq!(store.get::<StatusOverrideKey>(), 200);
        assert!(!store.get::<DeprecatedKey>());
    }
}
