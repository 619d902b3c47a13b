//! # Endpoint Identity and Type Tags
//!
//! Newtype wrappers for the two identity-like primitives of the compiled
//! model. `EndpointId` names one addressable operation; `TypeTag` names a
//! Rust type without carrying its value, which is how descriptors record
//! their response type for schema-writing exporters.
//!
//! ## Identity Invariant
//!
//! Identity is deterministic. A derived `EndpointId` is a pure function of
//! the route template and the handler name, so compiling the same tree
//! twice yields identical identifiers.

use std::fmt;

use serde::Serialize;

use crate::route::{PathSegment, RouteTemplate};

/// Stable identity of one compiled endpoint.
///
/// Either declared explicitly on the handler node, or derived from the
/// route template and handler name (e.g. `v1.users.GetUser`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EndpointId(pub String);

impl EndpointId {
    /// An explicitly declared identifier, taken verbatim.
    pub fn explicit(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier from the route template and handler name.
    ///
    /// Literal segments contribute their text, parameter segments their
    /// parameter name; parts are joined with `.` and the handler name is
    /// appended last. A root-mounted handler's id is just its name.
    pub fn derived(route: &RouteTemplate, handler_name: &str) -> Self {
        let mut parts: Vec<&str> = route
            .segments()
            .iter()
            .map(|seg| match seg {
                PathSegment::Literal(s) => s.as_str(),
                PathSegment::Parameter(name) => name.as_str(),
            })
            .collect();
        parts.push(handler_name);
        Self(parts.join("."))
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "endpoint:{}", self.0)
    }
}

/// A marker naming a Rust type without carrying a value of it.
///
/// Descriptors use this to record the handler's response type. The tag is
/// the compiler-provided type name; it is diagnostic, not a stable wire
/// identifier across rustc versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// Tag for the type `T`.
    pub fn of<T: 'static>() -> Self {
        Self(std::any::type_name::<T>())
    }

    /// The full type name, e.g. `alloc::string::String`.
    pub fn name(&self) -> &'static str {
        self.0
    }

    /// The last path component of the type name, e.g. `String`.
    pub fn short_name(&self) -> &'static str {
        self.0.rsplit("::").next().unwrap_or(self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
