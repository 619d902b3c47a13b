//! # Context Keys and Reduction Policies
//!
//! A context key is a compile-time type tag naming one slot in a
//! `ContextStore`. The key type itself is never instantiated; it carries
//! the value type, the default, and the policy for combining multiple
//! contributions to the same slot.

use std::fmt;

/// A typed slot in a context store.
///
/// Implementors are zero-sized tag types. The associated `Value` must be
/// `Clone + Send + Sync` so resolved context snapshots can be shared
/// across exporter threads without locking.
///
/// ```
/// use canopy_context::{ContextKey, Reduction};
///
/// struct RetryBudgetKey;
///
/// impl ContextKey for RetryBudgetKey {
///     type Value = u32;
///     const NAME: &'static str = "RetryBudget";
///
///     fn default_value() -> u32 {
///         0
///     }
///
///     fn reduction() -> Reduction<u32> {
///         Reduction::Custom(u32::max)
///     }
/// }
/// ```
pub trait ContextKey: 'static {
    /// The value type stored under this key.
    type Value: Clone + fmt::Debug + Send + Sync + 'static;

    /// Diagnostic name, unique across the key vocabulary. Appears in
    /// error messages and serialized descriptor dumps.
    const NAME: &'static str;

    /// The value resolved when no node contributed this key.
    fn default_value() -> Self::Value;

    /// How a second contribution to this key combines with the first.
    ///
    /// Defaults to `ExactlyOnce`: a duplicate contribution is a fatal
    /// composition error, mirroring keys that permit exactly one value.
    fn reduction() -> Reduction<Self::Value> {
        Reduction::ExactlyOnce
    }
}

/// Policy for combining multiple contributions to the same key.
///
/// Reduction folds in contribution order: the store holds the merged
/// value and each later contribution is reduced into it as
/// `(existing, next)`.
#[derive(Clone, Copy)]
pub enum Reduction<V> {
    /// Exactly one contribution permitted; a second one aborts
    /// compilation.
    ExactlyOnce,
    /// The first contribution sticks; later ones are discarded.
    FirstWins,
    /// The latest contribution replaces the current value.
    LastWins,
    /// Custom merge function `(existing, next) -> merged`. Numeric and
    /// flag-like keys typically use `max`; collection keys concatenate.
    Custom(fn(V, V) -> V),
}

impl<V> fmt::Debug for Reduction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExactlyOnce => "ExactlyOnce",
            Self::FirstWins => "FirstWins",
            Self::LastWins => "LastWins",
            Self::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}
