//! # Endpoint Descriptors
//!
//! The immutable output record of compilation: one descriptor per
//! handler leaf, minted during traversal and never mutated afterwards.
//! The descriptor list is returned by value to the compiler's caller and
//! is safe to share read-only across any number of exporter threads.

use std::fmt;

use serde::Serialize;

use canopy_context::ResolvedContext;
use canopy_core::{EndpointId, Parameter, RouteTemplate, TypeTag};

/// One fully compiled, addressable operation.
///
/// All fields are assigned exactly once during traversal. Exporters read
/// context keys through `context.get::<K>()` and must not assume any
/// wire or file format; those belong to the exporters themselves.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDescriptor {
    /// Stable identity of this endpoint.
    pub id: EndpointId,
    /// Diagnostic name of the handler leaf (e.g. `GetUser`).
    pub handler_name: String,
    /// The root-to-leaf route template.
    pub route: RouteTemplate,
    /// Collected parameters, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Resolved context snapshot (read-only keyed lookup).
    pub context: ResolvedContext,
    /// Marker for the handler's response type.
    pub response: TypeTag,
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({} parameter{})",
            self.id,
            self.route,
            self.response,
            self.parameters.len(),
            if self.parameters.len() == 1 { "" } else { "s" },
        )
    }
}
